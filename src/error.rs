//! Error taxonomy for everything that talks to the congress API.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("expected JSON but got `{content_type}`: {preview}")]
    NonJsonResponse {
        content_type: String,
        preview: String,
    },

    #[error("malformed JSON body: {0}")]
    MalformedJson(#[source] serde_json::Error),

    #[error("anti-forgery token rejected again after one refresh")]
    CsrfRejected,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("API error: {0}")]
    Api(String),
}
