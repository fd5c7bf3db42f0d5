//! Views of a prior HTTP response.

use crate::error::RetryAfterError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use std::time::Duration;

/// The parts of a response needed to choose a retry delay.
pub trait RetryResponse {
    /// Numeric HTTP status code.
    fn status(&self) -> u16;

    /// First value of a header, looked up case-insensitively.
    ///
    /// Returns `None` when the header is missing or not valid visible ASCII.
    fn header(&self, name: &str) -> Option<&str>;

    /// Server-requested delay from the first `Retry-After` value, if it is a
    /// whole number of seconds.
    fn retry_after(&self) -> Option<Duration> {
        self.header(RETRY_AFTER.as_str())
            .and_then(|s| parse_retry_after(s).ok())
    }

    /// Whether the response is a 429 Too Many Requests.
    fn is_rate_limited(&self) -> bool {
        self.status() == StatusCode::TOO_MANY_REQUESTS.as_u16()
    }
}

impl RetryResponse for Response {
    fn status(&self) -> u16 {
        Response::status(self).as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        first_header(self.headers(), name)
    }
}

/// Owned response descriptor.
///
/// Useful when the response body has already been consumed, or when the
/// response did not come from `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ResponseInfo {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
}

impl ResponseInfo {
    /// Create a descriptor with no headers.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
        }
    }

    /// Create a 429 descriptor carrying a `Retry-After` value.
    pub fn rate_limited(retry_after: &str) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS.as_u16()).with_header("retry-after", retry_after)
    }

    /// Append a header value.
    ///
    /// Names or values that are not valid HTTP tokens are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Snapshot the status and headers of a `reqwest` response.
    pub fn from_response(response: &Response) -> Self {
        Self {
            status: response.status().as_u16(),
            headers: response.headers().clone(),
        }
    }
}

impl RetryResponse for ResponseInfo {
    fn status(&self) -> u16 {
        self.status
    }

    fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, name)
    }
}

fn first_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Parse a `Retry-After` value expressed in seconds.
///
/// Only base-10 non-negative integers are accepted. HTTP-date values are
/// rejected.
pub fn parse_retry_after(value: &str) -> Result<Duration, RetryAfterError> {
    if value.is_empty() {
        return Err(RetryAfterError::Empty);
    }
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| RetryAfterError::invalid(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[rstest]
    #[case("0", Duration::ZERO)]
    #[case("7", Duration::from_secs(7))]
    #[case("+3", Duration::from_secs(3))]
    #[case("86400", Duration::from_secs(86_400))]
    fn test_parse_retry_after_valid(#[case] input: &str, #[case] expected: Duration) {
        assert_eq!(parse_retry_after(input), Ok(expected));
    }

    #[rstest]
    #[case("abc")]
    #[case("-1")]
    #[case("1.5")]
    #[case(" 3")]
    #[case("Wed, 21 Oct 2015 07:28:00 GMT")]
    #[case("99999999999999999999999")]
    fn test_parse_retry_after_invalid(#[case] input: &str) {
        assert_eq!(
            parse_retry_after(input),
            Err(RetryAfterError::invalid(input))
        );
    }

    #[test]
    fn test_parse_retry_after_empty() {
        assert_eq!(parse_retry_after(""), Err(RetryAfterError::Empty));
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let info = ResponseInfo::new(429).with_header("RETRY-AFTER", "4");
        assert_eq!(info.header("Retry-After"), Some("4"));
        assert_eq!(info.retry_after(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn test_first_value_wins() {
        let info = ResponseInfo::new(429)
            .with_header("Retry-After", "2")
            .with_header("Retry-After", "9");
        assert_eq!(info.headers.get_all("retry-after").iter().count(), 2);
        assert_eq!(info.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_rate_limited_helper() {
        let info = ResponseInfo::rate_limited("5");
        assert!(info.is_rate_limited());
        assert_eq!(info.retry_after(), Some(Duration::from_secs(5)));
        assert!(!ResponseInfo::new(503).is_rate_limited());
    }

    #[test]
    fn test_missing_header() {
        let info = ResponseInfo::new(429);
        assert_eq!(info.header("retry-after"), None);
        assert_eq!(info.retry_after(), None);
    }

    #[test]
    fn test_invalid_header_name_ignored() {
        let info = ResponseInfo::new(200).with_header("bad header", "1");
        assert!(info.headers.is_empty());
    }

    #[tokio::test]
    async fn test_from_reqwest_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(
                ResponseTemplate::new(429)
                    .insert_header("Retry-After", "12")
                    .set_body_string("slow down"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/limited", server.uri());
        let http = reqwest::get(url).await.unwrap();
        assert_eq!(RetryResponse::status(&http), 429);
        assert!(http.is_rate_limited());
        assert_eq!(http.retry_after(), Some(Duration::from_secs(12)));

        let info = ResponseInfo::from_response(&http);
        assert_eq!(info.status, 429);
        assert_eq!(info.retry_after(), Some(Duration::from_secs(12)));
    }
}
