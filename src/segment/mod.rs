use anyhow::Context;
use regex::{Captures, Regex};

use crate::model::EntryMode;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLabel {
    EntryMode(EntryMode),
    Semester {
        year: u32,
        semester: u32,
        qualifier: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMatch {
    pub start: usize,
    pub end: usize,
    pub raw: String,
    pub label: HeaderLabel,
}

impl HeaderMatch {
    pub fn key(&self) -> String {
        match &self.label {
            HeaderLabel::Semester { .. } => semester_key(&self.raw),
            HeaderLabel::EntryMode(mode) => format!("{} {}", mode.entry_time, mode.mode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBlock {
    pub header: Option<HeaderMatch>,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TextBlock {
    pub fn key(&self) -> String {
        self.header.as_ref().map(HeaderMatch::key).unwrap_or_default()
    }

    pub fn entry_mode(&self) -> EntryMode {
        match self.header.as_ref().map(|header| &header.label) {
            Some(HeaderLabel::EntryMode(mode)) => mode.clone(),
            _ => EntryMode::default(),
        }
    }
}

pub struct Segmenter {
    entry_mode: Regex,
    semester: Regex,
}

impl Segmenter {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            entry_mode: Regex::new(
                r"(?i)\b(february|july)\s+entry\s*[-–—:,|]\s*(full|part)[\s-]*time\b",
            )
            .context("failed to compile entry mode header regex")?,
            semester: Regex::new(
                r"(?i)\byear\s+(\d{1,2}),?\s+semester\s+(\d{1,2})\b(?:[^\S\n]*\(([^()\n]{1,40})\))?",
            )
            .context("failed to compile semester header regex")?,
        })
    }

    pub fn entry_mode_headers(&self, text: &str) -> Vec<HeaderMatch> {
        self.entry_mode
            .captures_iter(text)
            .filter_map(|captures| {
                let whole = captures.get(0)?;
                let entry_time = title_case(captures.get(1)?.as_str());
                let mode = format!("{} Time", title_case(captures.get(2)?.as_str()));
                Some(HeaderMatch {
                    start: whole.start(),
                    end: whole.end(),
                    raw: whole.as_str().to_string(),
                    label: HeaderLabel::EntryMode(EntryMode { entry_time, mode }),
                })
            })
            .collect()
    }

    pub fn semester_headers(&self, text: &str) -> Vec<HeaderMatch> {
        self.semester
            .captures_iter(text)
            .filter_map(|captures| semester_header(&captures))
            .collect()
    }

    pub fn entry_mode_blocks(&self, text: &str) -> Vec<TextBlock> {
        blocks_from_headers(text, self.entry_mode_headers(text))
    }

    pub fn semester_blocks(&self, text: &str) -> Vec<TextBlock> {
        blocks_from_headers(text, self.semester_headers(text))
    }

    pub fn semester_label_key(&self, cell: &str) -> Option<String> {
        self.semester
            .find(cell.trim_start())
            .filter(|found| found.start() == 0)
            .map(|found| semester_key(found.as_str()))
    }
}

fn semester_header(captures: &Captures<'_>) -> Option<HeaderMatch> {
    let whole = captures.get(0)?;
    let year = captures.get(1)?.as_str().parse().ok()?;
    let semester = captures.get(2)?.as_str().parse().ok()?;
    let qualifier = captures
        .get(3)
        .map(|value| value.as_str().trim().to_string())
        .filter(|value| !value.is_empty());

    Some(HeaderMatch {
        start: whole.start(),
        end: whole.end(),
        raw: whole.as_str().to_string(),
        label: HeaderLabel::Semester {
            year,
            semester,
            qualifier,
        },
    })
}

fn blocks_from_headers(text: &str, headers: Vec<HeaderMatch>) -> Vec<TextBlock> {
    if headers.is_empty() {
        return vec![TextBlock {
            header: None,
            start: 0,
            end: text.len(),
            text: text.to_string(),
        }];
    }

    let ends = headers
        .iter()
        .skip(1)
        .map(|next| next.start)
        .chain(std::iter::once(text.len()))
        .collect::<Vec<usize>>();

    headers
        .into_iter()
        .zip(ends)
        .map(|(header, end)| TextBlock {
            start: header.end,
            end,
            text: text[header.end..end].to_string(),
            header: Some(header),
        })
        .collect()
}

pub fn semester_key(label: &str) -> String {
    let mut depth = 0usize;
    let mut key = String::with_capacity(label.len());

    for character in label.chars() {
        match character {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth > 0 => {}
            ',' => {}
            _ if character.is_whitespace() => {}
            _ => key.extend(character.to_lowercase()),
        }
    }

    key
}

pub fn stop_heading_offset<'h>(
    text: &str,
    headings: &'h [String],
    after: usize,
) -> Option<(usize, &'h str)> {
    let mut offset = 0usize;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        if line_start < after {
            continue;
        }

        let trimmed = line.trim();
        if let Some(heading) = headings
            .iter()
            .find(|heading| trimmed.eq_ignore_ascii_case(heading.trim()))
        {
            return Some((line_start, heading.as_str()));
        }
    }

    None
}

fn title_case(value: &str) -> String {
    let mut characters = value.chars();
    match characters.next() {
        Some(first) => first
            .to_uppercase()
            .chain(characters.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
