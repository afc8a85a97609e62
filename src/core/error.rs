use thiserror::Error;

/// Maximum length for response bodies carried in error messages
const MAX_ERROR_BODY_LENGTH: usize = 300;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP error! status: {status}")]
    Http { status: u16, body: String },

    #[error("Invalid response: {0}")]
    Parse(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(&'static str),
}

impl FetchError {
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        FetchError::Http {
            status: status.as_u16(),
            body: truncate_body(body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }

    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message() {
        let err = FetchError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert_eq!(err.to_string(), "HTTP error! status: 500");
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "é".repeat(400);
        let err = FetchError::from_status(reqwest::StatusCode::BAD_GATEWAY, &body);
        let FetchError::Http { body, .. } = err else {
            panic!("expected http error");
        };
        assert!(body.contains("truncated, 800 total bytes"));
    }

    #[test]
    fn test_parse_error_has_no_status() {
        assert_eq!(FetchError::Parse("bad".into()).status(), None);
    }
}
