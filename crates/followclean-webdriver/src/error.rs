use followclean_core::PageError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WebDriverError>;

#[derive(Debug, Error)]
pub enum WebDriverError {
    #[error("Network error: {0}")]
    Network(String),

    /// An error response from the remote end. `error` is the W3C error code
    /// such as `no such element`.
    #[error("WebDriver error (status {status}) {error}: {message}")]
    Api {
        status: u16,
        error: String,
        message: String,
    },

    #[error("Unexpected response: {0}")]
    Protocol(String),
}

impl WebDriverError {
    /// The element reference no longer points into the live document.
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            WebDriverError::Api { error, .. }
                if error == "stale element reference" || error == "no such element"
        )
    }
}

impl From<reqwest::Error> for WebDriverError {
    fn from(err: reqwest::Error) -> Self {
        WebDriverError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for WebDriverError {
    fn from(err: serde_json::Error) -> Self {
        WebDriverError::Protocol(err.to_string())
    }
}

impl From<WebDriverError> for PageError {
    fn from(err: WebDriverError) -> Self {
        if err.is_stale() {
            return PageError::StaleElement;
        }
        match err {
            WebDriverError::Network(msg) => PageError::Transport(msg),
            WebDriverError::Api { error, message, .. } if error == "javascript error" => {
                PageError::Script(message)
            }
            other => PageError::Other(other.to_string()),
        }
    }
}
