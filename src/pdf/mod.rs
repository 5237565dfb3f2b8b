use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::process::Command;

use anyhow::Context;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{PipelineError, Result};

const PDFTOTEXT: &str = "pdftotext";
const PDF_MAGIC: &[u8] = b"%PDF-";
const HEADER_SCAN_BYTES: usize = 1024;
const PAGE_SEPARATOR: &str = "\n\n";


#[derive(Debug, Default, Clone)]
pub struct ExtractedPages {
    pub pages: Vec<String>,
    pub empty_pages: Vec<usize>,
}

impl ExtractedPages {
    pub fn from_pages(pages: Vec<String>) -> Self {
        let empty_pages = pages
            .iter()
            .enumerate()
            .filter(|(_, page)| non_whitespace_char_count(page) == 0)
            .map(|(index, _)| index + 1)
            .collect();
        Self { pages, empty_pages }
    }
}

pub struct TextNormalizer {
    split_code: Regex,
    cell_split: Regex,
}

impl TextNormalizer {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            split_code: Regex::new(r"\b([A-Z]{3})[^\S\n]*(?:\n[^\S\n]*)+(\d{3})\b")
                .context("failed to compile split unit code regex")?,
            cell_split: Regex::new(r"\t+|\s{2,}")
                .context("failed to compile table cell split regex")?,
        })
    }

    pub fn normalize(&self, pages: &ExtractedPages) -> String {
        let joined = pages.pages.join(PAGE_SEPARATOR);
        self.repair_split_codes(&joined)
    }

    pub fn repair_split_codes(&self, text: &str) -> String {
        self.split_code.replace_all(text, "${1}${2}").into_owned()
    }

    pub fn table_rows(&self, text: &str) -> Vec<Vec<String>> {
        text.lines()
            .map(|line| self.split_table_cells(line))
            .filter(|cells| !cells.is_empty())
            .collect()
    }

    fn split_table_cells(&self, line: &str) -> Vec<String> {
        self.cell_split
            .split(line)
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

pub fn read_pages(pdf_path: &Path, max_pages: Option<usize>, layout: bool) -> Result<ExtractedPages> {
    check_container(pdf_path)?;

    let raw = run_pdftotext(pdf_path, max_pages, layout)?;
    let extracted = ExtractedPages::from_pages(split_pages(&raw));

    for &page in &extracted.empty_pages {
        let notice = PipelineError::DocumentEmpty {
            path: pdf_path.to_path_buf(),
            page,
        };
        warn!(%notice, "skipping page without text");
    }

    debug!(
        path = %pdf_path.display(),
        pages = extracted.pages.len(),
        empty = extracted.empty_pages.len(),
        layout,
        "read pdf text layer"
    );

    Ok(extracted)
}

pub fn check_container(pdf_path: &Path) -> Result<()> {
    let open_error = |reason: String| PipelineError::DocumentOpen {
        path: pdf_path.to_path_buf(),
        reason,
    };

    let file = File::open(pdf_path).map_err(|err| open_error(err.to_string()))?;
    let mut head = Vec::with_capacity(HEADER_SCAN_BYTES);
    file.take(HEADER_SCAN_BYTES as u64)
        .read_to_end(&mut head)
        .map_err(|err| open_error(err.to_string()))?;

    if head.is_empty() {
        return Err(open_error("file is empty".to_string()));
    }
    if !head.windows(PDF_MAGIC.len()).any(|window| window == PDF_MAGIC) {
        return Err(open_error("missing %PDF- header".to_string()));
    }

    Ok(())
}

fn run_pdftotext(pdf_path: &Path, max_pages: Option<usize>, layout: bool) -> Result<String> {
    let mut command = Command::new(PDFTOTEXT);
    command.arg("-enc").arg("UTF-8").arg("-f").arg("1");
    if layout {
        command.arg("-layout");
    }
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .map_err(|source| PipelineError::ExtractorUnavailable {
            program: PDFTOTEXT,
            source,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::DocumentOpen {
            path: pdf_path.to_path_buf(),
            reason: format!("{PDFTOTEXT} exited with {}: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Splits `pdftotext` output into pages. Every page is terminated by a form feed, so the
/// chunk after the final one is dropped.
fn split_pages(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }

    let mut pages: Vec<String> = raw
        .split('\u{000C}')
        .map(|chunk| chunk.replace('\u{0000}', ""))
        .collect();

    if raw.ends_with('\u{000C}') {
        pages.pop();
    }

    pages
}

fn non_whitespace_char_count(text: &str) -> usize {
    text.chars()
        .filter(|character| !character.is_whitespace())
        .count()
}
