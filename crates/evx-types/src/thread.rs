//! Threads captured alongside an event.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::de::{null_as_default, skip_invalid};
use crate::stacktrace::StackTrace;

/// Thread identifier, unique within one event.
///
/// Platforms report either a numeric id or a name. Equality is strict:
/// `1` and `"1"` are different ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ThreadId {
    Number(i64),
    /// Numeric ids above `i64::MAX` (native thread handles).
    Unsigned(u64),
    Name(String),
}

impl<'de> Deserialize<'de> for ThreadId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(n
                .as_i64()
                .map(ThreadId::Number)
                .or_else(|| n.as_u64().map(ThreadId::Unsigned))
                .unwrap_or_else(|| ThreadId::Name(n.to_string()))),
            Value::String(name) => Ok(ThreadId::Name(name)),
            other => Err(serde::de::Error::custom(format!(
                "thread id must be a number or a string, got {other}"
            ))),
        }
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThreadId::Number(n) => write!(f, "{n}"),
            ThreadId::Unsigned(n) => write!(f, "{n}"),
            ThreadId::Name(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for ThreadId {
    fn from(id: i64) -> Self {
        ThreadId::Number(id)
    }
}

impl From<i32> for ThreadId {
    fn from(id: i32) -> Self {
        ThreadId::Number(i64::from(id))
    }
}

impl From<&str> for ThreadId {
    fn from(id: &str) -> Self {
        ThreadId::Name(id.to_string())
    }
}

impl ThreadId {
    /// Parses user input: integers become numeric ids, anything else a name.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if let Ok(n) = trimmed.parse::<i64>() {
            ThreadId::Number(n)
        } else if let Ok(n) = trimmed.parse::<u64>() {
            ThreadId::Unsigned(n)
        } else {
            ThreadId::Name(trimmed.to_string())
        }
    }

    /// Whether user input names this id, ignoring whether the platform
    /// reported it as a number or a string: `"1"` matches both `1` and `"1"`.
    pub fn matches_input(&self, input: &str) -> bool {
        self.to_string() == input.trim()
    }
}

/// One execution thread captured at event time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: ThreadId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// This thread caused the crash.
    #[serde(default, deserialize_with = "null_as_default")]
    pub crashed: bool,
    /// This thread was running when the event was captured.
    #[serde(default, deserialize_with = "null_as_default")]
    pub current: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<StackTrace>,
    /// Unsymbolicated (minified) variant of `stacktrace`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_stacktrace: Option<StackTrace>,
}

impl Thread {
    pub fn new(id: impl Into<ThreadId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            crashed: false,
            current: false,
            stacktrace: None,
            raw_stacktrace: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn crashed(mut self) -> Self {
        self.crashed = true;
        self
    }

    pub fn with_stacktrace(mut self, stacktrace: StackTrace) -> Self {
        self.stacktrace = Some(stacktrace);
        self
    }

    pub fn with_raw_stacktrace(mut self, stacktrace: StackTrace) -> Self {
        self.raw_stacktrace = Some(stacktrace);
        self
    }

    /// Thread has neither a symbolicated nor a raw stack trace.
    pub fn is_missing_stacktrace(&self) -> bool {
        self.stacktrace.is_none() && self.raw_stacktrace.is_none()
    }

    /// Display name, if the platform reported a non-empty one.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Payload of a `threads` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThreadsData {
    /// Threads that fail to decode are dropped; the rest are kept.
    #[serde(default, deserialize_with = "skip_invalid")]
    pub values: Vec<Thread>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_thread_id_accepts_numbers_and_strings() {
        let numeric: ThreadId = serde_json::from_value(json!(7)).unwrap();
        let named: ThreadId = serde_json::from_value(json!("main")).unwrap();
        assert_eq!(numeric, ThreadId::Number(7));
        assert_eq!(named, ThreadId::Name("main".to_string()));
        assert_ne!(ThreadId::Number(1), ThreadId::Name("1".to_string()));
    }

    #[test]
    fn test_thread_id_parse() {
        assert_eq!(ThreadId::parse(" 42 "), ThreadId::Number(42));
        assert_eq!(ThreadId::parse("worker-1"), ThreadId::from("worker-1"));
        assert_eq!(
            ThreadId::parse("18446744073709551615"),
            ThreadId::Unsigned(u64::MAX)
        );
    }

    #[test]
    fn test_thread_id_decodes_wide_and_fractional_numbers() {
        let wide: ThreadId = serde_json::from_value(json!(u64::MAX)).unwrap();
        let fractional: ThreadId = serde_json::from_value(json!(1.5)).unwrap();
        assert_eq!(wide, ThreadId::Unsigned(u64::MAX));
        assert_eq!(wide.to_string(), "18446744073709551615");
        assert_eq!(fractional, ThreadId::Name("1.5".to_string()));
        assert!(serde_json::from_value::<ThreadId>(json!(null)).is_err());
        assert_eq!(serde_json::to_value(&wide).unwrap(), json!(u64::MAX));
    }

    #[test]
    fn test_thread_id_matches_input() {
        assert!(ThreadId::Number(1).matches_input("1"));
        assert!(ThreadId::from("1").matches_input(" 1 "));
        assert!(!ThreadId::from("main").matches_input("1"));
    }

    #[test]
    fn test_bad_thread_does_not_drop_its_siblings() {
        let data: ThreadsData = serde_json::from_value(json!({
            "values": [
                {"id": 1, "crashed": true},
                {"id": 18_446_744_073_709_551_615_u64},
                {"id": null, "name": "ghost"},
                {"name": "no-id"},
                {"id": "main"}
            ]
        }))
        .unwrap();

        let ids: Vec<_> = data.values.iter().map(|thread| thread.id.clone()).collect();
        assert_eq!(
            ids,
            [
                ThreadId::Number(1),
                ThreadId::Unsigned(u64::MAX),
                ThreadId::from("main")
            ]
        );
        assert!(data.values[0].crashed);

        let empty: ThreadsData = serde_json::from_value(json!({"values": null})).unwrap();
        assert!(empty.values.is_empty());
    }

    #[test]
    fn test_thread_defaults_missing_flags() {
        let thread: Thread = serde_json::from_value(json!({
            "id": 3,
            "name": "",
            "crashed": null,
            "rawStacktrace": {"frames": []}
        }))
        .unwrap();

        assert!(!thread.crashed);
        assert!(!thread.current);
        assert_eq!(thread.display_name(), None);
        assert!(thread.stacktrace.is_none());
        assert!(!thread.is_missing_stacktrace());
    }
}
