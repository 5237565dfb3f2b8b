use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "course-guide",
    version,
    about = "Extract course structures from downloaded course guide PDFs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Inspect(InspectArgs),
    Units(UnitsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    pub course_code: String,

    #[arg(long, default_value = "pdf")]
    pub pdf_dir: PathBuf,

    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    pub max_pages: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct StructureArgs {
    #[arg(long, value_enum, default_value_t = ExtractMode::Text)]
    pub mode: ExtractMode,

    #[arg(
        long = "stop-heading",
        default_values_t = [String::from("Unit Synopses"), String::from("Unit Lists")]
    )]
    pub stop_headings: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub structure: StructureArgs,

    #[arg(long, default_value = "courses")]
    pub courses_dir: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub structure: StructureArgs,
}

#[derive(Args, Debug, Clone)]
pub struct UnitsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(long, default_value = "units.json")]
    pub catalog: PathBuf,

    #[arg(long, default_value = "course_to_unit")]
    pub relationship_dir: PathBuf,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ExtractMode {
    Text,
    Table,
}

impl ExtractMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
        }
    }
}
