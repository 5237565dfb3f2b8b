use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::cli::ExtractMode;
use crate::error::Result;
use crate::model::{SemesterBlock, UnitToken};
use crate::pdf::{self, TextNormalizer};
use crate::segment::{HeaderLabel, Segmenter, TextBlock, stop_heading_offset};
use crate::units::{PreHeaderAttribution, TableExtraction, UnitExtractor, append_tokens};


#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions<'a> {
    pub mode: ExtractMode,
    pub max_pages: Option<usize>,
    pub stop_headings: &'a [String],
}

#[derive(Debug, Clone)]
pub struct CourseStructure {
    pub page_count: usize,
    pub empty_pages: Vec<usize>,
    pub stop_heading: Option<String>,
    pub blocks: Vec<SemesterBlock>,
    pub table: Option<TableExtraction>,
}

pub struct Pipeline {
    normalizer: TextNormalizer,
    segmenter: Segmenter,
    extractor: UnitExtractor,
}

impl Pipeline {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new()?,
            segmenter: Segmenter::new()?,
            extractor: UnitExtractor::new()?,
        })
    }

    pub fn run(&self, pdf_path: &Path, options: PipelineOptions<'_>) -> Result<CourseStructure> {
        let pages = pdf::read_pages(pdf_path, options.max_pages, false)?;
        let text = self.normalizer.normalize(&pages);
        let (text, stop_heading) = self.truncate_at_stop_heading(&text, options.stop_headings);

        let (blocks, table) = match options.mode {
            ExtractMode::Text => (self.blocks_from_text(text), None),
            ExtractMode::Table => {
                let layout_pages = pdf::read_pages(pdf_path, options.max_pages, true)?;
                let layout_text = self.normalizer.normalize(&layout_pages);
                let (layout_text, _) =
                    self.truncate_at_stop_heading(&layout_text, options.stop_headings);
                let table = self.table_units(layout_text);
                (self.blocks_from_table(text, &table), Some(table))
            }
        };

        if blocks.iter().any(|block| block.mode_entry.is_unlabelled()) {
            warn!(
                path = %pdf_path.display(),
                "no entry-mode headers found, structure recorded without entry mode"
            );
        }

        info!(
            path = %pdf_path.display(),
            mode = options.mode.as_str(),
            pages = pages.pages.len(),
            blocks = blocks.len(),
            units = blocks.iter().map(SemesterBlock::unit_count).sum::<usize>(),
            "extracted course structure"
        );

        Ok(CourseStructure {
            page_count: pages.pages.len(),
            empty_pages: pages.empty_pages,
            stop_heading: stop_heading.map(ToOwned::to_owned),
            blocks,
            table,
        })
    }

    pub fn unit_codes(&self, pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<String>> {
        let pages = pdf::read_pages(pdf_path, max_pages, false)?;
        let text = self.normalizer.normalize(&pages);
        Ok(self.extractor.unit_codes(&text))
    }

    // Stop headings before the first semester header belong to the contents page.
    fn truncate_at_stop_heading<'t, 'h>(
        &self,
        text: &'t str,
        stop_headings: &'h [String],
    ) -> (&'t str, Option<&'h str>) {
        let after = self
            .segmenter
            .semester_headers(text)
            .first()
            .map(|header| header.end)
            .unwrap_or_default();

        match stop_heading_offset(text, stop_headings, after) {
            Some((offset, heading)) => (&text[..offset], Some(heading)),
            None => (text, None),
        }
    }

    pub fn blocks_from_text(&self, text: &str) -> Vec<SemesterBlock> {
        let blocks = self
            .segmenter
            .entry_mode_blocks(text)
            .into_iter()
            .map(|entry| {
                let mut semesters = IndexMap::<String, Vec<UnitToken>>::new();
                for block in self.segmenter.semester_blocks(&entry.text) {
                    let tokens = self.extractor.extract_text(&block.text);
                    if let Some(HeaderLabel::Semester {
                        year,
                        semester,
                        qualifier,
                    }) = block.header.as_ref().map(|header| &header.label)
                    {
                        debug!(
                            year,
                            semester,
                            qualifier = qualifier.as_deref().unwrap_or_default(),
                            span = ?(block.start..block.end),
                            units = tokens.len(),
                            "semester block"
                        );
                    }
                    if block.header.is_none() && tokens.is_empty() {
                        continue;
                    }
                    append_tokens(semesters.entry(block.key()).or_default(), tokens);
                }

                SemesterBlock {
                    mode_entry: entry.entry_mode(),
                    semesters,
                }
            })
            .collect();

        drop_empty_blocks(blocks)
    }

    fn table_units(&self, layout_text: &str) -> TableExtraction {
        let rows = self.normalizer.table_rows(layout_text);
        let table = self.extractor.extract_rows(&self.segmenter, &rows);

        match &table.attribution {
            PreHeaderAttribution::NotNeeded => {}
            PreHeaderAttribution::FirstSemesterFallback { units } => warn!(
                units,
                "attributed rows before the first semester header to year 1 semester 1"
            ),
            PreHeaderAttribution::Unattributed { units } => warn!(
                units,
                codes = ?table
                    .pre_header
                    .iter()
                    .map(|unit| unit.token.as_str())
                    .collect::<Vec<&str>>(),
                "dropped table rows found before any semester header"
            ),
        }

        table
    }

    pub fn blocks_from_table(&self, text: &str, table: &TableExtraction) -> Vec<SemesterBlock> {
        let blocks = self
            .segmenter
            .entry_mode_blocks(text)
            .into_iter()
            .map(|entry| SemesterBlock {
                mode_entry: entry.entry_mode(),
                semesters: self.table_semesters(&entry, table),
            })
            .collect();

        drop_empty_blocks(blocks)
    }

    fn table_semesters(
        &self,
        entry: &TextBlock,
        table: &TableExtraction,
    ) -> IndexMap<String, Vec<UnitToken>> {
        let headers = self.segmenter.semester_headers(&entry.text);
        if headers.is_empty() {
            return table
                .semesters
                .keys()
                .map(|key| (key.clone(), table.tokens_for(key)))
                .collect();
        }

        let mut semesters = IndexMap::new();
        for header in headers {
            let key = header.key();
            if !semesters.contains_key(&key) {
                let tokens = table.tokens_for(&key);
                semesters.insert(key, tokens);
            }
        }
        semesters
    }
}

fn drop_empty_blocks(mut blocks: Vec<SemesterBlock>) -> Vec<SemesterBlock> {
    if blocks.iter().any(|block| !block.semesters.is_empty()) {
        blocks.retain(|block| !block.semesters.is_empty());
    }
    blocks
}
