//! Gong REST API client.

use reqwest::{Method, Response, Url};
use serde::de::DeserializeOwned;

use crate::signer::Signer;
use crate::types::{ErrorResponse, TranscriptFilter, TranscriptRequest, TranscriptsResponse};
use crate::{CallList, Credentials, Error, Result, Transcripts};

/// Default Gong API base URL.
pub const GONG_API_URL: &str = "https://api.gong.io/v2";

const CALLS_PATH: &str = "calls";
const TRANSCRIPT_PATH: &str = "calls/transcript";

/// Builder for creating a Gong client.
#[derive(Debug, Clone)]
pub struct GongClientBuilder {
    credentials: Credentials,
    base_url: String,
}

impl GongClientBuilder {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            base_url: GONG_API_URL.to_string(),
        }
    }

    /// Override the API base URL (tenant-specific hosts, tests).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<GongClient> {
        let mut base_url = Url::parse(&self.base_url)
            .map_err(|e| Error::Configuration(format!("invalid base URL {}: {e}", self.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "invalid base URL {}: cannot be a base",
                self.base_url
            )));
        }
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(GongClient {
            http: reqwest::Client::new(),
            signer: Signer::new(self.credentials),
            base_url,
        })
    }
}

/// A fully prepared request: the signed bytes are exactly the bytes sent.
#[derive(Debug)]
pub(crate) struct PreparedRequest {
    method: Method,
    url: Url,
    body: Option<String>,
    headers: crate::SignedHeaders,
}

/// Client for the Gong API.
///
/// Each public operation issues exactly one signed HTTP request.
#[derive(Debug)]
pub struct GongClient {
    http: reqwest::Client,
    signer: Signer,
    base_url: Url,
}

impl GongClient {
    /// Create a builder for the Gong client.
    pub fn builder(credentials: Credentials) -> GongClientBuilder {
        GongClientBuilder::new(credentials)
    }

    /// List calls, optionally restricted to a date range.
    ///
    /// Both bounds are ISO-8601 strings, form-encoded into the query. Empty
    /// bounds are ignored. Calls are returned in the order Gong sends them.
    pub async fn list_calls(
        &self,
        from_date_time: Option<&str>,
        to_date_time: Option<&str>,
    ) -> Result<CallList> {
        let request = self.prepare_list_calls(from_date_time, to_date_time)?;
        self.execute(request).await
    }

    /// Fetch transcripts for the given calls.
    ///
    /// Ids Gong does not know are absent from the result.
    pub async fn retrieve_transcripts(&self, call_ids: &[String]) -> Result<Transcripts> {
        let request = self.prepare_retrieve_transcripts(call_ids)?;
        let response: TranscriptsResponse = self.execute(request).await?;

        Ok(response
            .call_transcripts
            .into_iter()
            .map(|t| (t.call_id, t.transcript))
            .collect())
    }

    fn prepare_list_calls(
        &self,
        from_date_time: Option<&str>,
        to_date_time: Option<&str>,
    ) -> Result<PreparedRequest> {
        // An empty bound means no bound.
        fn bound(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|v| !v.is_empty())
        }
        let pairs: Vec<_> = [
            ("fromDateTime", bound(from_date_time)),
            ("toDateTime", bound(to_date_time)),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect();

        let mut url = self.endpoint(CALLS_PATH)?;
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        Ok(self.prepare(Method::GET, url, None))
    }

    fn prepare_retrieve_transcripts(&self, call_ids: &[String]) -> Result<PreparedRequest> {
        if call_ids.is_empty() {
            return Err(Error::Validation("call_ids must not be empty".into()));
        }
        if call_ids.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::Validation("call_ids must not contain empty ids".into()));
        }

        let body = serde_json::to_string(&TranscriptRequest {
            filter: TranscriptFilter { call_ids },
        })
        .map_err(|e| Error::Validation(format!("failed to encode request: {e}")))?;

        let url = self.endpoint(TRANSCRIPT_PATH)?;
        Ok(self.prepare(Method::POST, url, Some(body)))
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Configuration(format!("invalid endpoint {path}: {e}")))
    }

    fn prepare(&self, method: Method, url: Url, body: Option<String>) -> PreparedRequest {
        let payload = match &body {
            Some(body) => body.as_str(),
            None => url.query().unwrap_or(""),
        };
        let headers = self.signer.headers(method.as_str(), url.path(), payload);

        PreparedRequest {
            method,
            url,
            body,
            headers,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, request: PreparedRequest) -> Result<T> {
        let PreparedRequest {
            method,
            url,
            body,
            headers,
        } = request;

        tracing::debug!(%method, path = url.path(), "sending Gong request");

        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        req = headers.apply(req);
        if let Some(body) = body {
            req = req.body(body);
        }

        let response = req
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        tracing::debug!(%method, path = url.path(), %status, "Gong response");

        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        serde_json::from_str(&text)
            .map_err(|e| Error::Upstream(format!("malformed response from Gong: {e}")))
    }
}

/// Turn a non-2xx response into an `Upstream` error, preferring Gong's own
/// error messages over the raw body.
async fn upstream_error(response: Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let detail = match serde_json::from_str::<ErrorResponse>(&body) {
        Ok(parsed) if !parsed.errors.is_empty() => {
            let mut detail = parsed.errors.join("; ");
            if let Some(id) = parsed.request_id {
                detail.push_str(&format!(" (request id {id})"));
            }
            detail
        }
        _ => body,
    };

    if detail.is_empty() {
        Error::Upstream(status.to_string())
    } else {
        Error::Upstream(format!("{status}: {detail}"))
    }
}
