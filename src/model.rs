use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

pub const SELECT_QUT_YOU_UNIT: &str = "Select one QUT You unit";
pub const COMPLEMENTARY_STUDIES_UNIT: &str = "Complementary Studies unit";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMode {
    pub entry_time: String,
    pub mode: String,
}

impl EntryMode {
    pub fn is_unlabelled(&self) -> bool {
        self.entry_time.is_empty() && self.mode.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SemesterBlock {
    pub mode_entry: EntryMode,
    pub semesters: IndexMap<String, Vec<UnitToken>>,
}

impl SemesterBlock {
    pub fn unit_count(&self) -> usize {
        self.semesters.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitToken {
    Code(String),
    QutYouElective,
    ComplementaryStudies,
}

impl UnitToken {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Code(code) => code,
            Self::QutYouElective => SELECT_QUT_YOU_UNIT,
            Self::ComplementaryStudies => COMPLEMENTARY_STUDIES_UNIT,
        }
    }
}

impl Serialize for UnitToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableUnit {
    #[serde(rename = "code")]
    pub token: UnitToken,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub course_code: String,
    pub pdf_path: String,
    pub pdf_sha256: String,
    pub page_count: usize,
    pub empty_pages: Vec<usize>,
    pub mode: String,
    pub stop_heading: Option<String>,
    pub semester_blocks: Vec<SemesterBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_units: Option<IndexMap<String, Vec<TableUnit>>>,
    pub pre_header_fallback_applied: bool,
}
