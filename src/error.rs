use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to open PDF {}: {reason}", path.display())]
    DocumentOpen { path: PathBuf, reason: String },

    /// A page yielded no extractable text, usually a scanned image.
    #[error("page {page} of {} has no extractable text", path.display())]
    DocumentEmpty { path: PathBuf, page: usize },

    #[error("text extractor `{program}` is not available: {source}")]
    ExtractorUnavailable {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("course record not found: {}", path.display())]
    RecordNotFound { path: PathBuf },

    #[error("course record is not valid JSON: {}", path.display())]
    MalformedRecord {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("course record is not a JSON object: {}", path.display())]
    RecordNotObject { path: PathBuf },

    #[error("failed to encode JSON for {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
