//! Exception entry payload.

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;
use crate::stacktrace::StackTrace;
use crate::thread::ThreadId;

/// Payload of an `exception` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<ExceptionValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_system_frames: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exc_omitted: Option<(u32, u32)>,
}

/// One exception in a (possibly chained) exception entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionValue {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    /// Thread that raised this exception, when the platform records it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<ThreadId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<StackTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_stacktrace: Option<StackTrace>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<serde_json::Value>,
}

impl ExceptionValue {
    /// `Type: value` summary used in headers and raw stack output.
    pub fn summary(&self) -> String {
        match (self.ty.as_deref(), self.value.as_deref()) {
            (Some(ty), Some(value)) => format!("{ty}: {value}"),
            (Some(ty), None) => ty.to_string(),
            (None, Some(value)) => value.to_string(),
            (None, None) => "<unknown exception>".to_string(),
        }
    }
}
