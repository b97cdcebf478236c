// Async HTTP client for the trip planning API.
//
// Base path: {API_BASE_URL}/api/v1/
// Auth: Authorization: Bearer <token>, fetched from the TokenProvider per request

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::Error;
use crate::transport::TransportConfig;

const API_PREFIX: &str = "api/v1";

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the trip planning backend.
///
/// Holds a shared `reqwest::Client` and the token provider. Cloning is cheap;
/// every operation is a single request with no retry and no local state.
#[derive(Clone)]
pub struct TripClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenProvider>,
}

impl fmt::Debug for TripClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TripClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TripClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client with its own `reqwest::Client` from `transport`.
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenProvider>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http, tokens)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(
        base_url: &str,
        http: reqwest::Client,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    /// Ensure the base ends in `/api/v1/`.
    ///
    /// `https://host` and `https://host/api/v1` both become
    /// `https://host/api/v1/`.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw.trim())?;
        if url.cannot_be_a_base() {
            return Err(Error::validation("api_url", format!("not a base URL: {raw}")));
        }

        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with(&format!("/{API_PREFIX}")) {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/{API_PREFIX}/"));
        }
        url.set_query(None);
        url.set_fragment(None);

        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append path segments to the base URL. Each segment is percent-encoded,
    /// so ids containing `/` or `?` stay inside their segment.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::validation("api_url", "not a base URL"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // ── Auth ─────────────────────────────────────────────────────────

    async fn authorize(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let token = self.tokens.token().await.ok_or(Error::NotAuthenticated)?;
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| Error::validation("token", "contains characters not allowed in a header"))?;
        value.set_sensitive(true);
        Ok(builder.header(AUTHORIZATION, value))
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");
        let req = self.authorize(self.http.get(url)).await?;
        let resp = req.send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("GET {url} params={params:?}");
        let req = self.authorize(self.http.get(url).query(params)).await?;
        let resp = req.send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");
        let req = self.authorize(self.http.post(url).json(body)).await?;
        let resp = req.send().await?;
        Self::handle_response(resp).await
    }

    /// POST with no request body.
    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {url}");
        let req = self.authorize(self.http.post(url)).await?;
        let resp = req.send().await?;
        Self::handle_response(resp).await
    }

    pub(crate) async fn post_with_params<T: DeserializeOwned>(
        &self,
        url: Url,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        debug!("POST {url} params={params:?}");
        let req = self.authorize(self.http.post(url).query(params)).await?;
        let resp = req.send().await?;
        Self::handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let detail = error_detail(status, &raw);
        debug!(status = status.as_u16(), %detail, "request rejected");
        Error::Request {
            status: status.as_u16(),
            detail,
        }
    }
}

/// Extract a human-readable detail from an error body.
///
/// `{"detail": "..."}` yields the string; a structured `detail` (validation
/// errors) is rendered as compact JSON. Anything else falls back to the raw
/// body, then to the canonical reason phrase.
fn error_detail(status: reqwest::StatusCode, raw: &str) -> String {
    if let Ok(err) = serde_json::from_str::<ErrorResponse>(raw) {
        match err.detail {
            Some(Value::String(s)) if !s.is_empty() => return s,
            Some(Value::String(_) | Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
        // A JSON error body with nothing to say.
        return err
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| canonical_reason(status));
    }

    let raw = raw.trim();
    if raw.is_empty() {
        canonical_reason(status)
    } else {
        raw.to_owned()
    }
}

fn canonical_reason(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_owned(), str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::auth::NoToken;

    fn client(base: &str) -> TripClient {
        TripClient::from_reqwest(base, reqwest::Client::new(), Arc::new(NoToken)).unwrap()
    }

    #[test]
    fn base_url_gets_api_prefix() {
        assert_eq!(
            client("http://localhost:8000").base_url().as_str(),
            "http://localhost:8000/api/v1/"
        );
        assert_eq!(
            client("https://api.example.com/api/v1").base_url().as_str(),
            "https://api.example.com/api/v1/"
        );
        assert_eq!(
            client("https://example.com/travel/").base_url().as_str(),
            "https://example.com/travel/api/v1/"
        );
    }

    #[test]
    fn rejects_non_base_urls() {
        let err = TripClient::from_reqwest("mailto:someone", reqwest::Client::new(), Arc::new(NoToken))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(matches!(
            TripClient::from_reqwest("not a url", reqwest::Client::new(), Arc::new(NoToken)),
            Err(Error::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoint_encodes_segments() {
        let c = client("http://localhost:8000");
        assert_eq!(
            c.endpoint(&["trips", "trip 1/x", "reserve"]).unwrap().as_str(),
            "http://localhost:8000/api/v1/trips/trip%201%2Fx/reserve"
        );
    }

    #[test]
    fn detail_extraction() {
        let bad = StatusCode::BAD_REQUEST;
        assert_eq!(error_detail(bad, r#"{"detail":"Trip not found"}"#), "Trip not found");
        assert_eq!(
            error_detail(bad, r#"{"detail":[{"loc":["body","items"],"msg":"field required"}]}"#),
            r#"[{"loc":["body","items"],"msg":"field required"}]"#
        );
        assert_eq!(error_detail(bad, r#"{"message":"nope"}"#), "nope");
        assert_eq!(error_detail(bad, "upstream exploded"), "upstream exploded");
        assert_eq!(error_detail(StatusCode::CONFLICT, ""), "Conflict");
    }

    #[test]
    fn empty_detail_falls_back() {
        let bad = StatusCode::BAD_REQUEST;
        assert_eq!(
            error_detail(bad, r#"{"detail":"","message":"Quote expired"}"#),
            "Quote expired"
        );
        assert_eq!(error_detail(StatusCode::CONFLICT, r#"{"detail":""}"#), "Conflict");
        assert_eq!(error_detail(bad, r#"{"detail":null}"#), "Bad Request");
    }
}
