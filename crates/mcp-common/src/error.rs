/// Error types shared across MCP server crates.
///
/// These errors represent failures while loading external data (files, JSON
/// documents) that any server in the workspace may hit. Application-specific
/// errors should be defined in each server crate and wrap `CommonError` via
/// `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CommonError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
