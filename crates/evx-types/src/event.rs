//! Events and their typed entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_as_default;
use crate::exception::ExceptionData;
use crate::thread::{Thread, ThreadsData};

/// One reported error occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entries: Vec<Entry>,
}

impl Event {
    /// The first exception entry, if any.
    pub fn exception(&self) -> Option<&ExceptionData> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Exception(data) => Some(data),
            _ => None,
        })
    }

    /// Threads from the first threads entry (empty when absent).
    pub fn threads(&self) -> &[Thread] {
        self.entries
            .iter()
            .find_map(|entry| match entry {
                Entry::Threads(data) => Some(data.values.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn platform(&self) -> &str {
        self.platform.as_deref().unwrap_or("other")
    }
}

/// A typed event entry, discriminated by its `type` string.
///
/// Entry types this crate doesn't model, and `exception`/`threads` entries
/// whose payload fails to decode, are kept as [`Entry::Other`] so one bad
/// entry never rejects the whole event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEntry", into = "RawEntry")]
pub enum Entry {
    Exception(ExceptionData),
    Threads(ThreadsData),
    Other { kind: String, data: Value },
}

impl Entry {
    pub fn kind(&self) -> &str {
        match self {
            Entry::Exception(_) => Entry::EXCEPTION,
            Entry::Threads(_) => Entry::THREADS,
            Entry::Other { kind, .. } => kind,
        }
    }

    const EXCEPTION: &str = "exception";
    const THREADS: &str = "threads";
}

/// Wire form of an entry: `{"type": "...", "data": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

impl From<RawEntry> for Entry {
    fn from(raw: RawEntry) -> Self {
        let RawEntry { kind, data } = raw;
        match kind.as_str() {
            Entry::EXCEPTION => match serde_json::from_value::<ExceptionData>(data.clone()) {
                Ok(exception) => Entry::Exception(exception),
                Err(_) => Entry::Other { kind, data },
            },
            Entry::THREADS => match serde_json::from_value::<ThreadsData>(data.clone()) {
                Ok(threads) => Entry::Threads(threads),
                Err(_) => Entry::Other { kind, data },
            },
            _ => Entry::Other { kind, data },
        }
    }
}

impl From<Entry> for RawEntry {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Exception(data) => RawEntry {
                kind: Entry::EXCEPTION.to_string(),
                data: serde_json::to_value(data).unwrap_or(Value::Null),
            },
            Entry::Threads(data) => RawEntry {
                kind: Entry::THREADS.to_string(),
                data: serde_json::to_value(data).unwrap_or(Value::Null),
            },
            Entry::Other { kind, data } => RawEntry { kind, data },
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::thread::ThreadId;

    #[test]
    fn test_event_decodes_known_and_unknown_entries() {
        let event: Event = serde_json::from_value(json!({
            "id": "abc",
            "platform": "cocoa",
            "entries": [
                {"type": "breadcrumbs", "data": {"values": []}},
                {"type": "exception", "data": {"values": [{"type": "SIGSEGV", "threadId": 2}]}},
                {"type": "threads", "data": {"values": [{"id": 1}, {"id": 2, "crashed": true}]}}
            ]
        }))
        .unwrap();

        assert_eq!(event.entries.len(), 3);
        assert_eq!(event.entries[0].kind(), "breadcrumbs");
        let exception = event.exception().unwrap();
        assert_eq!(exception.values[0].thread_id, Some(ThreadId::Number(2)));
        assert_eq!(event.threads().len(), 2);
        assert!(event.threads()[1].crashed);
    }

    #[test]
    fn test_one_undecodable_thread_keeps_the_others() {
        let event: Event = serde_json::from_value(json!({
            "entries": [{"type": "threads", "data": {"values": [
                {"id": 1, "crashed": true, "stacktrace": {"frames": []}},
                {"id": 18_446_744_073_709_551_615_u64},
                {"id": null}
            ]}}]
        }))
        .unwrap();

        assert_eq!(event.threads().len(), 2);
        assert!(event.threads()[0].crashed);
        assert_eq!(event.threads()[1].id, ThreadId::Unsigned(u64::MAX));
    }

    #[test]
    fn test_malformed_exception_entry_is_kept_as_other() {
        let event: Event = serde_json::from_value(json!({
            "entries": [{"type": "exception", "data": {"values": "not-a-list"}}]
        }))
        .unwrap();

        assert!(event.exception().is_none());
        assert!(matches!(&event.entries[0], Entry::Other { kind, .. } if kind == "exception"));
    }

    #[test]
    fn test_event_without_entries() {
        let event: Event = serde_json::from_value(json!({"entries": null})).unwrap();
        assert!(event.threads().is_empty());
        assert_eq!(event.platform(), "other");
    }

    #[test]
    fn test_entry_serializes_back_to_wire_form() {
        let entry = Entry::Threads(ThreadsData {
            values: vec![Thread::new(1)],
        });
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "threads");
        assert_eq!(value["data"]["values"][0]["id"], 1);
    }
}
