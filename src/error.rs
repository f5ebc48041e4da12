use thiserror::Error;

/// Generic message shown in the recommendations region when the
/// recommendation call fails without a backend-supplied message.
pub const RECOMMENDATIONS_FETCH_ERROR: &str =
    "An error occurred while fetching recommendations.";

/// Generic message shown in the insights region when the insights call fails
/// without a backend-supplied message.
pub const INSIGHTS_FETCH_ERROR: &str = "An error occurred while loading insights.";

/// Failure of a backend call before a payload could be interpreted.
///
/// Backend-reported failures (`status != "success"`) are not errors at this
/// level; they come back as parsed responses and are folded into a region
/// message by the controller.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("transport failure: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
