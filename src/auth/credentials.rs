use axum::http::HeaderMap;
use std::fmt;

/// Header marking a request as coming from the scheduler (`ReqFromCron`)
pub const SCHEDULER_HEADER: &str = "reqfromcron";

/// Header carrying the shared secret or the user token
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Credentials presented by whoever triggers a run
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Scheduler call, authenticated by the shared secret
    Scheduler { secret: String },
    /// Interactive call, authenticated by a user token
    User { token: String },
    /// No usable credentials
    Anonymous,
}

impl Credentials {
    /// Classify an inbound request by its headers.
    ///
    /// A non-empty scheduler header selects the shared-secret path; otherwise
    /// the authorization header is treated as a user token.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        let authorization = header(AUTHORIZATION_HEADER);
        let from_scheduler = header(SCHEDULER_HEADER).is_some_and(|value| !value.is_empty());

        if from_scheduler {
            return Self::Scheduler {
                secret: authorization.unwrap_or_default(),
            };
        }

        match authorization {
            Some(token) if !token.is_empty() => Self::User { token },
            _ => Self::Anonymous,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Scheduler { .. } => "scheduler",
            Self::User { .. } => "user",
            Self::Anonymous => "anonymous",
        }
    }
}

// Secrets never reach the logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduler { .. } => f.write_str("Credentials::Scheduler { secret: *** }"),
            Self::User { .. } => f.write_str("Credentials::User { token: *** }"),
            Self::Anonymous => f.write_str("Credentials::Anonymous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_scheduler_header_selects_shared_secret() {
        let mut headers = HeaderMap::new();
        headers.insert(SCHEDULER_HEADER, HeaderValue::from_static("true"));
        headers.insert(AUTHORIZATION_HEADER, HeaderValue::from_static("s3cret"));

        assert_eq!(
            Credentials::from_headers(&headers),
            Credentials::Scheduler {
                secret: "s3cret".to_string()
            }
        );
    }

    #[test]
    fn test_scheduler_without_secret_keeps_scheduler_path() {
        let mut headers = HeaderMap::new();
        headers.insert(SCHEDULER_HEADER, HeaderValue::from_static("1"));

        assert_eq!(
            Credentials::from_headers(&headers),
            Credentials::Scheduler {
                secret: String::new()
            }
        );
    }

    #[test]
    fn test_user_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION_HEADER, HeaderValue::from_static("token-123"));

        let credentials = Credentials::from_headers(&headers);
        assert_eq!(credentials.kind(), "user");
        assert_eq!(
            credentials,
            Credentials::User {
                token: "token-123".to_string()
            }
        );
    }

    #[test]
    fn test_missing_headers_are_anonymous() {
        assert_eq!(
            Credentials::from_headers(&HeaderMap::new()),
            Credentials::Anonymous
        );

        let mut headers = HeaderMap::new();
        headers.insert(SCHEDULER_HEADER, HeaderValue::from_static(""));
        assert_eq!(Credentials::from_headers(&headers), Credentials::Anonymous);
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::User {
            token: "token-123".to_string(),
        };
        assert!(!format!("{credentials:?}").contains("token-123"));
    }
}
