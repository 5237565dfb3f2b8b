use std::io::Write;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InspectArgs;
use crate::commands::{normalize_course_code, pdf_path};
use crate::model::InspectReport;
use crate::pipeline::{Pipeline, PipelineOptions};
use crate::units::PreHeaderAttribution;
use crate::util::sha256_file;

pub fn run(args: InspectArgs) -> Result<()> {
    let course_code = normalize_course_code(&args.source.course_code)?;
    let pdf_path = pdf_path(&args.source.pdf_dir, &course_code);

    let pipeline = Pipeline::new()?;
    let structure = pipeline
        .run(
            &pdf_path,
            PipelineOptions {
                mode: args.structure.mode,
                max_pages: args.source.max_pages,
                stop_headings: &args.structure.stop_headings,
            },
        )
        .with_context(|| format!("failed to extract course structure for {course_code}"))?;

    let pdf_sha256 = sha256_file(&pdf_path)?;
    let pre_header_fallback_applied = structure.table.as_ref().is_some_and(|table| {
        matches!(
            table.attribution,
            PreHeaderAttribution::FirstSemesterFallback { .. }
        )
    });

    let report = InspectReport {
        course_code: course_code.clone(),
        pdf_path: pdf_path.display().to_string(),
        pdf_sha256,
        page_count: structure.page_count,
        empty_pages: structure.empty_pages,
        mode: args.structure.mode.as_str().to_string(),
        stop_heading: structure.stop_heading,
        semester_blocks: structure.blocks,
        table_units: structure.table.map(|table| table.semesters),
        pre_header_fallback_applied,
    };

    let rendered =
        serde_json::to_string_pretty(&report).context("failed to render inspect report")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}").context("failed to write inspect report")?;

    info!(course_code = %course_code, "inspect completed");
    Ok(())
}
