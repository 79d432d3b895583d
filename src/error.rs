use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Browser launch failed: {0}")]
    LaunchError(String),

    #[error("Source form not found: {0}")]
    FormNotFound(String),

    #[error("JavaScript error: {0}")]
    JsError(String),

    #[error("CDP error: {0}")]
    CdpError(#[from] chromiumoxide::error::CdpError),
}

pub type Result<T> = std::result::Result<T, Error>;
