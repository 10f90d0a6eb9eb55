//! reqwest transport for paste requests.

use crate::error::ClientError;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use rspb_core::error::AppError;
use rspb_core::forms::{FormField, Method, PasteRequest};
use rspb_core::models::{interpret_response, Outcome};
use rspb_core::KEY_HEADER;
use std::time::Duration;

/// Join path segments onto the service base URL.
///
/// Segments are percent-encoded, so an id containing `/` or `?` stays a
/// single segment.
///
/// # Errors
/// Returns [`AppError::InvalidUrl`] when `server` is not a usable base URL.
pub fn api_url<S: AsRef<str>>(server: &str, segments: &[S]) -> Result<Url, AppError> {
    let invalid = |reason: String| AppError::InvalidUrl {
        url: server.to_string(),
        reason,
    };
    let mut url = Url::parse(server).map_err(|err| invalid(err.to_string()))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| invalid("cannot be used as a base".to_string()))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment.as_ref());
        }
    }
    if segments.is_empty() && !url.path().ends_with('/') {
        let with_slash = format!("{}/", url.path());
        url.set_path(&with_slash);
    }
    Ok(url)
}

/// Trim trailing slashes and pin plain-http `localhost` to `127.0.0.1`.
pub fn normalize_server(server: String) -> String {
    let Ok(mut url) = Url::parse(&server) else {
        return server;
    };
    let is_plain_localhost =
        url.scheme().eq_ignore_ascii_case("http") && url.host_str() == Some("localhost");
    if is_plain_localhost && url.set_host(Some("127.0.0.1")).is_err() {
        return server;
    }
    let mut normalized = url.to_string();
    while normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

fn multipart_form(fields: &[FormField]) -> Form {
    fields.iter().fold(Form::new(), |form, field| match field {
        FormField::Text { name, value } => form.text(*name, value.clone()),
        FormField::File {
            name,
            file_name,
            bytes,
        } => form.part(*name, Part::bytes(bytes.clone()).file_name(file_name.clone())),
    })
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Paste service endpoint with a shared HTTP connection pool.
#[derive(Debug, Clone)]
pub struct PasteClient {
    http: reqwest::Client,
    server: String,
}

impl PasteClient {
    /// Build a client for `server` with a per-request timeout.
    ///
    /// # Errors
    /// Fails when the base URL is invalid or the HTTP client cannot be built.
    pub fn new(server: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_http(http, server)
    }

    /// Wrap an existing HTTP client.
    ///
    /// # Errors
    /// Fails when the base URL is invalid.
    pub fn with_http(http: reqwest::Client, server: &str) -> Result<Self, ClientError> {
        let server = normalize_server(server.trim().to_string());
        api_url::<&str>(&server, &[])?;
        Ok(Self { http, server })
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Absolute URL for path segments below the service root.
    ///
    /// # Errors
    /// Propagates [`api_url`] failures.
    pub fn url_for<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, AppError> {
        api_url(&self.server, segments)
    }

    /// Transmit a request and interpret whatever comes back.
    ///
    /// Never fails: transport and decoding problems become
    /// [`Outcome::TransportFailed`].
    pub async fn send(&self, request: &PasteRequest) -> Outcome {
        let url = match self.url_for(&request.path) {
            Ok(url) => url,
            Err(err) => {
                return Outcome::TransportFailed {
                    error: err.to_string(),
                }
            }
        };

        tracing::debug!("{} ({} field(s))", request, request.fields.len());
        let mut builder = self.http.request(http_method(request.method), url);
        if let Some(key) = &request.key {
            builder = builder.header(KEY_HEADER, key.as_str());
        }
        if !request.fields.is_empty() {
            builder = builder.multipart(multipart_form(&request.fields));
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("{} failed: {}", request, err);
                return Outcome::TransportFailed {
                    error: err.to_string(),
                };
            }
        };
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                return Outcome::TransportFailed {
                    error: format!("failed to read response body: {}", err),
                }
            }
        };
        tracing::debug!("{} answered {}", request, status);
        interpret_response(status.as_u16(), status.canonical_reason(), &body)
    }

    /// Download raw paste content.
    ///
    /// # Errors
    /// Transport failures and non-success statuses.
    pub async fn fetch(&self, url: Url) -> Result<Vec<u8>, ClientError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                code: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::{api_url, normalize_server, PasteClient};
    use std::time::Duration;

    #[test]
    fn normalize_server_matrix() {
        let cases = [
            ("http://localhost:8000", "http://127.0.0.1:8000"),
            ("https://localhost:8000", "https://localhost:8000"),
            ("http://127.0.0.1:8000/", "http://127.0.0.1:8000"),
            ("https://paste.example.org/sub/", "https://paste.example.org/sub"),
            ("not a url", "not a url"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_server(input.to_string()), expected);
        }
    }

    #[test]
    fn api_url_encodes_path_segments() {
        let url = api_url("http://127.0.0.1:8000", &["id/with?reserved#chars"])
            .expect("api_url should build");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8000/id%2Fwith%3Freserved%23chars"
        );
    }

    #[test]
    fn api_url_keeps_base_path_and_root() {
        let url = api_url("http://127.0.0.1:8000/paste", &["abc123", "rs"]).expect("build");
        assert_eq!(url.as_str(), "http://127.0.0.1:8000/paste/abc123/rs");

        let root = api_url::<&str>("http://127.0.0.1:8000/paste", &[]).expect("build");
        assert_eq!(root.as_str(), "http://127.0.0.1:8000/paste/");

        let bare = api_url::<&str>("http://127.0.0.1:8000", &[]).expect("build");
        assert_eq!(bare.as_str(), "http://127.0.0.1:8000/");
    }

    #[test]
    fn api_url_rejects_non_base_urls() {
        assert!(api_url("mailto:someone@example.org", &["x"]).is_err());
        assert!(api_url("::nope::", &["x"]).is_err());
    }

    #[test]
    fn client_rejects_invalid_server() {
        assert!(PasteClient::new("not a url", Duration::from_secs(1)).is_err());
        let client = PasteClient::new("http://localhost:9/", Duration::from_secs(1))
            .expect("valid server");
        assert_eq!(client.server(), "http://127.0.0.1:9");
    }
}
