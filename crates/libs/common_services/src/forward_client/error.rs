use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForwardError {
    #[error("No external webhook URL is configured")]
    NotConfigured,

    #[error("Invalid external webhook URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("External webhook responded with {status}: {body}")]
    Rejected { status: u16, body: String },
}
