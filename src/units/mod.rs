use std::collections::HashSet;

use anyhow::Context;
use indexmap::IndexMap;
use regex::Regex;

use crate::model::{TableUnit, UnitToken};
use crate::segment::Segmenter;

#[cfg(test)]
mod tests;

pub const FIRST_SEMESTER_KEY: &str = "year1semester1";

#[derive(Debug, Default)]
struct FirstSeen {
    codes: HashSet<String>,
    complementary: bool,
}

impl FirstSeen {
    fn admit(&mut self, token: &UnitToken) -> bool {
        match token {
            UnitToken::Code(code) => self.codes.insert(code.to_lowercase()),
            UnitToken::QutYouElective => true,
            UnitToken::ComplementaryStudies => !std::mem::replace(&mut self.complementary, true),
        }
    }
}

pub fn append_tokens(existing: &mut Vec<UnitToken>, more: Vec<UnitToken>) {
    let mut seen = FirstSeen::default();
    for token in existing.iter() {
        seen.admit(token);
    }
    existing.extend(more.into_iter().filter(|token| seen.admit(token)));
}

#[derive(Debug, Default)]
struct UnitList {
    units: Vec<TableUnit>,
    seen: FirstSeen,
}

impl UnitList {
    fn push(&mut self, unit: TableUnit) {
        if self.seen.admit(&unit.token) {
            self.units.push(unit);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreHeaderAttribution {
    NotNeeded,
    /// Guess: the table's first semester is year 1 semester 1 and had no rows of its own,
    /// so the header most likely sat below its units. Not correct for every layout.
    FirstSemesterFallback { units: usize },
    Unattributed { units: usize },
}

#[derive(Debug, Clone)]
pub struct TableExtraction {
    pub semesters: IndexMap<String, Vec<TableUnit>>,
    pub pre_header: Vec<TableUnit>,
    pub attribution: PreHeaderAttribution,
}

impl TableExtraction {
    pub fn tokens_for(&self, key: &str) -> Vec<UnitToken> {
        self.semesters
            .get(key)
            .map(|units| units.iter().map(|unit| unit.token.clone()).collect())
            .unwrap_or_default()
    }
}

pub struct UnitExtractor {
    token: Regex,
    code_cell: Regex,
    qut_you: Regex,
    complementary: Regex,
}

impl UnitExtractor {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            token: Regex::new(
                r"(?i:(?P<qut>select\s+one\s+qut\s+you\s+unit)|(?P<comp>complementary\s+studies\s+unit))|\b(?P<code>[A-Z]{3}\d{3})\b",
            )
            .context("failed to compile unit token regex")?,
            code_cell: Regex::new(r"^[A-Z]{3}\d{3}$")
                .context("failed to compile unit code cell regex")?,
            qut_you: Regex::new(r"(?i)qut\s+you\s+unit")
                .context("failed to compile QUT You placeholder regex")?,
            complementary: Regex::new(r"(?i)complementary\s+studies\s+unit")
                .context("failed to compile complementary studies regex")?,
        })
    }

    pub fn extract_text(&self, text: &str) -> Vec<UnitToken> {
        let mut seen = FirstSeen::default();
        let mut tokens = Vec::new();

        for captures in self.token.captures_iter(text) {
            let token = if let Some(code) = captures.name("code") {
                UnitToken::Code(code.as_str().to_string())
            } else if captures.name("qut").is_some() {
                UnitToken::QutYouElective
            } else {
                UnitToken::ComplementaryStudies
            };

            if seen.admit(&token) {
                tokens.push(token);
            }
        }

        tokens
    }

    pub fn unit_codes(&self, text: &str) -> Vec<String> {
        self.extract_text(text)
            .into_iter()
            .filter_map(|token| match token {
                UnitToken::Code(code) => Some(code),
                _ => None,
            })
            .collect()
    }

    pub fn extract_rows(&self, segmenter: &Segmenter, rows: &[Vec<String>]) -> TableExtraction {
        let mut semesters = IndexMap::<String, UnitList>::new();
        let mut pre_header = UnitList::default();
        let mut cursor: Option<String> = None;

        for row in rows {
            let mut cells = row
                .iter()
                .map(|cell| cell.trim())
                .filter(|cell| !cell.is_empty());
            let Some(first) = cells.next() else {
                continue;
            };

            if let Some(key) = segmenter.semester_label_key(first) {
                semesters.entry(key.clone()).or_default();
                cursor = Some(key);
                continue;
            }

            let Some(token) = self.cell_token(first) else {
                continue;
            };
            let title = match token {
                UnitToken::Code(_) => cells.next().unwrap_or_default().to_string(),
                _ => String::new(),
            };
            let unit = TableUnit { token, title };

            match cursor.as_ref().and_then(|key| semesters.get_mut(key)) {
                Some(list) => list.push(unit),
                None => pre_header.push(unit),
            }
        }

        let attribution = attribute_pre_header(&mut semesters, &mut pre_header);

        TableExtraction {
            semesters: semesters
                .into_iter()
                .map(|(key, list)| (key, list.units))
                .collect(),
            pre_header: pre_header.units,
            attribution,
        }
    }

    fn cell_token(&self, cell: &str) -> Option<UnitToken> {
        if self.code_cell.is_match(cell) {
            Some(UnitToken::Code(cell.to_string()))
        } else if self.qut_you.is_match(cell) {
            Some(UnitToken::QutYouElective)
        } else if self.complementary.is_match(cell) {
            Some(UnitToken::ComplementaryStudies)
        } else {
            None
        }
    }
}

fn attribute_pre_header(
    semesters: &mut IndexMap<String, UnitList>,
    pre_header: &mut UnitList,
) -> PreHeaderAttribution {
    let units = pre_header.units.len();
    if units == 0 {
        return PreHeaderAttribution::NotNeeded;
    }

    match semesters.first_mut() {
        Some((key, list)) if key == FIRST_SEMESTER_KEY && list.units.is_empty() => {
            *list = std::mem::take(pre_header);
            PreHeaderAttribution::FirstSemesterFallback { units }
        }
        _ => PreHeaderAttribution::Unattributed { units },
    }
}
