//! The Gong tools served over MCP.
//!
//! Both tools return pretty-printed JSON text. Any Gong failure is caught
//! here and returned as `{"error": "..."}` with `isError` set, so the client
//! always receives a well-formed tool result.

use std::sync::Arc;

use gong::GongClient;
use mcp::{CallToolResult, ToolRegistry};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const LIST_CALLS_DESCRIPTION: &str = "List Gong calls with optional date range filtering. \
Returns JSON with call details including ID, title, start/end times, participants, and duration.";

const RETRIEVE_TRANSCRIPTS_DESCRIPTION: &str = "Retrieve transcripts for specified call IDs. \
Returns JSON with detailed transcripts including speaker IDs, topics, and timestamped sentences.";

/// Arguments for `list_calls`.
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ListCallsParams {
    /// Start date/time in ISO format (e.g. 2024-03-01T00:00:00Z)
    #[serde(default)]
    pub from_date_time: Option<String>,
    /// End date/time in ISO format (e.g. 2024-03-31T23:59:59Z)
    #[serde(default)]
    pub to_date_time: Option<String>,
}

/// Arguments for `retrieve_transcripts`.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct RetrieveTranscriptsParams {
    /// Array of Gong call IDs to retrieve transcripts for
    pub call_ids: Vec<String>,
}

#[derive(Serialize)]
struct TranscriptsOutput {
    transcripts: gong::Transcripts,
}

/// Build the registry holding both Gong tools.
pub fn registry(client: Arc<GongClient>) -> mcp::Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();

    let list_client = Arc::clone(&client);
    registry.register("list_calls", LIST_CALLS_DESCRIPTION, move |p: ListCallsParams| {
        let client = Arc::clone(&list_client);
        async move { list_calls(&client, p).await }
    })?;

    registry.register(
        "retrieve_transcripts",
        RETRIEVE_TRANSCRIPTS_DESCRIPTION,
        move |p: RetrieveTranscriptsParams| {
            let client = Arc::clone(&client);
            async move { retrieve_transcripts(&client, p).await }
        },
    )?;

    Ok(registry)
}

pub async fn list_calls(client: &GongClient, params: ListCallsParams) -> CallToolResult {
    let result = client
        .list_calls(
            params.from_date_time.as_deref(),
            params.to_date_time.as_deref(),
        )
        .await;

    if let Ok(list) = &result {
        tracing::info!(calls = list.calls.len(), "list_calls succeeded");
    }
    render("list_calls", result)
}

pub async fn retrieve_transcripts(
    client: &GongClient,
    params: RetrieveTranscriptsParams,
) -> CallToolResult {
    let requested = params.call_ids.len();
    let result = client
        .retrieve_transcripts(&params.call_ids)
        .await
        .map(|transcripts| {
            tracing::info!(requested, found = transcripts.len(), "retrieve_transcripts succeeded");
            TranscriptsOutput { transcripts }
        });

    render("retrieve_transcripts", result)
}

fn render<T: Serialize>(tool: &str, result: gong::Result<T>) -> CallToolResult {
    let value = result.map_err(|e| e.to_string()).and_then(|output| {
        serde_json::to_value(output).map_err(|e| format!("failed to encode result: {e}"))
    });

    match value {
        Ok(value) => CallToolResult::text(pretty(&value)),
        Err(message) => {
            tracing::warn!(tool, error = %message, "tool failed");
            CallToolResult::error(error_payload(&message))
        }
    }
}

/// The JSON error document returned in place of a result.
pub fn error_payload(message: &str) -> String {
    pretty(&json!({ "error": message }))
}

fn pretty(value: &Value) -> String {
    format!("{value:#}")
}
