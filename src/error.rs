use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnnouncerError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unable to deserialize response. Body was: \"{body}\"")]
    Decode {
        body: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),

    #[error("Unable to run speech command `{program}`: {source}")]
    Speech {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to write reading: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnnouncerError>;
