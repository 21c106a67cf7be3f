use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or calling into the lookup asset.
///
/// These stay inside the host; lookups that hit one are logged and answer
/// "no result".
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read lookup asset '{}'", path.display())]
    AssetRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("interpreter error: {0}")]
    Interpreter(#[from] rquickjs::Error),

    #[error("script exception: {message}")]
    Exception { message: String },

    #[error("global function '{name}' is not defined")]
    MissingFunction { name: String },

    #[error("lookup result is not valid JSON: {0}")]
    ResultEncoding(#[from] serde_json::Error),
}
