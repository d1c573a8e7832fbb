use thiserror::Error;

/// Failures raised by call targets and by script loading.
///
/// Decorators (`ConditionalProxy`, `OptionsMerger`) never build one of these;
/// they hand back whatever the target returned.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("unknown call: {0}")]
    UnknownCall(String),

    #[error("call `{name}` rejected: {reason}")]
    Rejected { name: String, reason: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, InvokeError>;
