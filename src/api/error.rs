use thiserror::Error;

/// Longest response body kept in an error message.
const MAX_MESSAGE_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Session expired (HTTP 401)")]
    AuthExpired,

    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

impl RequestError {
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            RequestError::AuthExpired => Some(401),
            _ => None,
        }
    }

    pub(crate) fn http(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            "no response body".to_string()
        } else {
            truncate(body.trim(), MAX_MESSAGE_LEN)
        };
        RequestError::Http { status, message }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
