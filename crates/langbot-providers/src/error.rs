//! Errors raised by provider calls.

use thiserror::Error;

/// Any failure of a single chat completion call.
///
/// The `Display` text is what callers surface to end users, so each variant
/// carries the provider's own message where one exists.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure: DNS, connect, TLS, timeout.
    #[error("Error calling LLM: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("Error calling LLM: {status}: {body}")]
    Api { status: u16, body: String },

    /// The response body was not a valid chat completion.
    #[error("Error parsing LLM response: {0}")]
    Parse(String),

    /// The response parsed but carried no choices.
    #[error("No choices in response")]
    EmptyResponse,

    /// The provider could not be constructed from the given configuration.
    #[error("{0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_includes_status_and_body() {
        let err = ProviderError::Api {
            status: 401,
            body: "invalid api key".into(),
        };
        assert_eq!(err.to_string(), "Error calling LLM: 401: invalid api key");
    }

    #[test]
    fn test_empty_response_display() {
        assert_eq!(ProviderError::EmptyResponse.to_string(), "No choices in response");
    }
}
