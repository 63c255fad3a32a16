//! Records returned by the Gong API.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Metadata for one recorded call.
///
/// `ended` is not sent by Gong; it is derived from `started + duration`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "CallRecord")]
pub struct Call {
    pub id: String,
    pub title: Option<String>,
    pub url: Option<String>,
    pub scheduled: Option<String>,
    pub started: Option<String>,
    pub ended: Option<String>,
    /// Duration in seconds.
    pub duration: Option<u64>,
    pub direction: Option<String>,
    pub system: Option<String>,
    pub scope: Option<String>,
    pub media: Option<String>,
    pub language: Option<String>,
    pub parties: Vec<Party>,
}

/// Wire shape of a call, before `ended` is derived.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CallRecord {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    scheduled: Option<String>,
    #[serde(default)]
    started: Option<String>,
    #[serde(default)]
    duration: Option<u64>,
    #[serde(default)]
    direction: Option<String>,
    #[serde(default)]
    system: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    media: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    parties: Vec<Party>,
}

impl From<CallRecord> for Call {
    fn from(r: CallRecord) -> Self {
        let ended = ended_at(r.started.as_deref(), r.duration);
        Self {
            id: r.id,
            title: r.title,
            url: r.url,
            scheduled: r.scheduled,
            started: r.started,
            ended,
            duration: r.duration,
            direction: r.direction,
            system: r.system,
            scope: r.scope,
            media: r.media,
            language: r.language,
            parties: r.parties,
        }
    }
}

fn ended_at(started: Option<&str>, duration: Option<u64>) -> Option<String> {
    let started = DateTime::parse_from_rfc3339(started?).ok()?;
    let duration = TimeDelta::try_seconds(i64::try_from(duration?).ok()?)?;
    Some((started + duration).to_rfc3339())
}

/// A participant in a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub speaker_id: Option<String>,
    #[serde(default)]
    pub affiliation: Option<String>,
}

/// Paging information attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Records {
    #[serde(default)]
    pub total_records: Option<u64>,
    #[serde(default)]
    pub current_page_size: Option<u64>,
    #[serde(default)]
    pub current_page_number: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

/// One page of calls, in the order Gong returned them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallList {
    #[serde(default)]
    pub calls: Vec<Call>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Records>,
}

/// A timestamped fragment of a monologue. Offsets are milliseconds from the
/// start of the call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub start: u64,
    pub end: u64,
    pub text: String,
}

/// One speaker turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monologue {
    #[serde(default)]
    pub speaker_id: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

/// Transcripts keyed by call id.
pub type Transcripts = BTreeMap<String, Vec<Monologue>>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CallTranscript {
    pub call_id: String,
    #[serde(default)]
    pub transcript: Vec<Monologue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptsResponse {
    #[serde(default)]
    pub call_transcripts: Vec<CallTranscript>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptRequest<'a> {
    pub filter: TranscriptFilter<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TranscriptFilter<'a> {
    pub call_ids: &'a [String],
}

/// Error body returned by Gong on failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_call_derives_end() {
        let json = r#"{
            "id": "7782342274025937895",
            "title": "Weekly sync",
            "started": "2024-03-01T10:00:00-08:00",
            "duration": 1800,
            "direction": "Conference",
            "primaryUserId": "234599484848423"
        }"#;
        let call: Call = serde_json::from_str(json).unwrap();
        assert_eq!(call.title.as_deref(), Some("Weekly sync"));
        assert_eq!(call.ended.as_deref(), Some("2024-03-01T10:30:00-08:00"));
        assert!(call.parties.is_empty());
    }

    #[test]
    fn call_without_start_has_no_end() {
        let call: Call = serde_json::from_str(r#"{"id": "1", "duration": 60}"#).unwrap();
        assert_eq!(call.ended, None);
    }

    #[test]
    fn serialized_call_includes_end() {
        let call: Call = serde_json::from_str(
            r#"{"id": "1", "started": "2024-03-01T10:00:00Z", "duration": 90}"#,
        )
        .unwrap();
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(value["ended"], "2024-03-01T10:01:30+00:00");
    }

    #[test]
    fn deserialize_transcripts() {
        let json = r#"{
            "requestId": "abc",
            "records": {"totalRecords": 1, "currentPageSize": 1, "currentPageNumber": 0},
            "callTranscripts": [{
                "callId": "1",
                "transcript": [{
                    "speakerId": "s1",
                    "topic": "Intro",
                    "sentences": [{"start": 0, "end": 1500, "text": "Hello."}]
                }]
            }]
        }"#;
        let resp: TranscriptsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.call_transcripts.len(), 1);
        let turn = &resp.call_transcripts[0].transcript[0];
        assert_eq!(turn.speaker_id.as_deref(), Some("s1"));
        assert_eq!(turn.sentences[0].text, "Hello.");
    }

    #[test]
    fn transcript_request_shape() {
        let ids = vec!["1".to_string(), "2".to_string()];
        let body = serde_json::to_string(&TranscriptRequest {
            filter: TranscriptFilter { call_ids: &ids },
        })
        .unwrap();
        assert_eq!(body, r#"{"filter":{"callIds":["1","2"]}}"#);
    }
}
