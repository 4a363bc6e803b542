/// Failure talking to the DataSetIQ API
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Transport failure: DNS, connect, timeout
    #[error("Network error: {0}")]
    Network(String),
    /// Non-2xx response; `message` is the server's own text when it sent one
    #[error("{message}")]
    Http { status: u16, message: String },
    /// 2xx response whose body did not match the expected schema
    #[error("Unexpected response: {0}")]
    Malformed(String),
}

impl ApiError {
    /// Text worth showing to the user, if any. Malformed bodies carry
    /// parser detail only, so callers substitute their own fallback.
    pub fn user_message(&self) -> Option<String> {
        match self {
            ApiError::Malformed(_) => None,
            other => Some(other.to_string()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let http = ApiError::Http { status: 401, message: "Invalid API key".to_string() };
        assert_eq!(http.user_message().as_deref(), Some("Invalid API key"));
        assert_eq!(http.status(), Some(401));

        let network = ApiError::Network("connection refused".to_string());
        assert_eq!(network.user_message().as_deref(), Some("Network error: connection refused"));

        assert_eq!(ApiError::Malformed("missing field".to_string()).user_message(), None);
    }
}
