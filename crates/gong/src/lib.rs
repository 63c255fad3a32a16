//! Gong API client.
//!
//! A small client for the two read-only Gong endpoints exposed by the
//! `gong-mcp` server: listing calls and retrieving call transcripts.
//!
//! # Overview
//!
//! - **Credentials**: the access key and secret, validated once at startup.
//! - **Signer**: builds the Basic auth and `X-Gong-*` headers for a request.
//!   The HMAC signature covers exactly the query string or body that is sent.
//! - **GongClient**: one signed HTTP request per operation, decoded into
//!   typed records.
//!
//! # Example
//!
//! ```no_run
//! use gong::{Credentials, GongClient};
//!
//! # async fn example() -> gong::Result<()> {
//! let credentials = Credentials::new("access-key", "access-secret")?;
//! let client = GongClient::builder(credentials).build()?;
//!
//! let page = client
//!     .list_calls(Some("2024-03-01T00:00:00Z"), Some("2024-03-31T23:59:59Z"))
//!     .await?;
//! let ids: Vec<String> = page.calls.iter().map(|c| c.id.clone()).collect();
//!
//! let transcripts = client.retrieve_transcripts(&ids).await?;
//! for (call_id, turns) in &transcripts {
//!     println!("{call_id}: {} speaker turns", turns.len());
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod credentials;
mod error;
pub mod signer;
mod types;

pub use client::{GONG_API_URL, GongClient, GongClientBuilder};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use signer::{SignedHeaders, Signer};
pub use types::{Call, CallList, Monologue, Party, Records, Sentence, Transcripts};
