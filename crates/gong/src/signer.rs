//! Gong request signing.
//!
//! Every request carries Basic auth plus three Gong headers. The signature is
//! an HMAC-SHA256, keyed by the access secret, over
//! `METHOD\nPATH\nTIMESTAMP\nPAYLOAD`, encoded as standard base64. `PAYLOAD`
//! is the exact query string for GET requests and the exact JSON body for
//! POST requests, so the signed bytes are the bytes on the wire.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use reqwest::RequestBuilder;
use sha2::Sha256;

use crate::Credentials;

pub const ACCESS_KEY_HEADER: &str = "X-Gong-AccessKey";
pub const TIMESTAMP_HEADER: &str = "X-Gong-Timestamp";
pub const SIGNATURE_HEADER: &str = "X-Gong-Signature";

type HmacSha256 = Hmac<Sha256>;

/// Format a timestamp the way it is sent in `X-Gong-Timestamp`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Headers attached to one signed request.
#[derive(Clone)]
pub struct SignedHeaders {
    pub authorization: String,
    pub access_key: String,
    pub timestamp: String,
    pub signature: String,
}

impl std::fmt::Debug for SignedHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedHeaders")
            .field("authorization", &"Basic [REDACTED]")
            .field("access_key", &self.access_key)
            .field("timestamp", &self.timestamp)
            .field("signature", &self.signature)
            .finish()
    }
}

impl SignedHeaders {
    /// Attach the headers to a request.
    pub fn apply(self, req: RequestBuilder) -> RequestBuilder {
        req.header(reqwest::header::AUTHORIZATION, self.authorization)
            .header(ACCESS_KEY_HEADER, self.access_key)
            .header(TIMESTAMP_HEADER, self.timestamp)
            .header(SIGNATURE_HEADER, self.signature)
    }
}

/// Produces signed headers from a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Compute the base64 signature for one request.
    pub fn sign(&self, method: &str, path: &str, timestamp: &str, payload: &str) -> String {
        // HMAC takes keys of any length.
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret().as_bytes())
            .expect("HMAC accepts any key length");

        mac.update(method.as_bytes());
        mac.update(b"\n");
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(timestamp.as_bytes());
        mac.update(b"\n");
        mac.update(payload.as_bytes());

        BASE64.encode(mac.finalize().into_bytes())
    }

    /// Sign a request using the current time.
    pub fn headers(&self, method: &str, path: &str, payload: &str) -> SignedHeaders {
        self.headers_at(method, path, &format_timestamp(Utc::now()), payload)
    }

    /// Sign a request with an explicit timestamp.
    pub fn headers_at(
        &self,
        method: &str,
        path: &str,
        timestamp: &str,
        payload: &str,
    ) -> SignedHeaders {
        let signature = self.sign(method, path, timestamp, payload);
        SignedHeaders {
            authorization: self.basic_auth(),
            access_key: self.credentials.access_key().to_string(),
            timestamp: timestamp.to_string(),
            signature,
        }
    }

    fn basic_auth(&self) -> String {
        let pair = format!(
            "{}:{}",
            self.credentials.access_key(),
            self.credentials.secret()
        );
        format!("Basic {}", BASE64.encode(pair))
    }
}
