//! Stack traces and frames.

use serde::{Deserialize, Serialize};

use crate::de::null_as_default;

/// A captured stack trace.
///
/// Frames are ordered oldest call first: the last frame is the innermost
/// (most recent) one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTrace {
    #[serde(default, deserialize_with = "null_as_default")]
    pub frames: Vec<Frame>,
    /// Whether the frames mix application code with system/library code.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_system_frames: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frames_omitted: Option<(u32, u32)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registers: Option<serde_json::Map<String, serde_json::Value>>,
}

impl StackTrace {
    pub fn from_frames(frames: Vec<Frame>, has_system_frames: bool) -> Self {
        Self {
            frames,
            has_system_frames,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Number of frames that belong to application code.
    pub fn in_app_count(&self) -> usize {
        self.frames.iter().filter(|frame| frame.in_app).count()
    }
}

/// A single stack frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_function: Option<String>,
    /// Binary or shared object the frame lives in (native platforms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abs_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_no: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_addr: Option<String>,
    /// Source lines around the frame as `(line number, text)` pairs.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub context: Vec<(i64, Option<String>)>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub in_app: bool,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the field value only when it is present and non-empty.
    fn non_empty(value: Option<&String>) -> Option<&str> {
        value.map(String::as_str).filter(|s| !s.is_empty())
    }

    pub fn function_name(&self) -> Option<&str> {
        Self::non_empty(self.function.as_ref())
    }

    pub fn package_name(&self) -> Option<&str> {
        Self::non_empty(self.package.as_ref())
    }

    pub fn module_name(&self) -> Option<&str> {
        Self::non_empty(self.module.as_ref())
    }

    pub fn file_name(&self) -> Option<&str> {
        Self::non_empty(self.filename.as_ref())
    }

    /// The source text recorded for the frame's own line, if any.
    pub fn context_line(&self) -> Option<&str> {
        let line_no = self.line_no?;
        self.context
            .iter()
            .find(|(line, _)| *line == line_no)
            .and_then(|(_, text)| text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_frame_decodes_camel_case_fields() {
        let frame: Frame = serde_json::from_value(json!({
            "function": "main",
            "filename": "src/main.rs",
            "absPath": "/app/src/main.rs",
            "lineNo": 12,
            "colNo": 4,
            "inApp": true,
            "context": [[11, "fn main() {"], [12, "    run();"]]
        }))
        .unwrap();

        assert_eq!(frame.function_name(), Some("main"));
        assert_eq!(frame.abs_path.as_deref(), Some("/app/src/main.rs"));
        assert!(frame.in_app);
        assert_eq!(frame.context_line(), Some("    run();"));
    }

    #[test]
    fn test_empty_strings_are_treated_as_missing() {
        let frame = Frame {
            function: Some(String::new()),
            module: Some("app.views".to_string()),
            ..Frame::default()
        };
        assert_eq!(frame.function_name(), None);
        assert_eq!(frame.module_name(), Some("app.views"));
    }

    #[test]
    fn test_null_collections_decode_as_empty() {
        let stacktrace: StackTrace = serde_json::from_value(json!({
            "frames": null,
            "hasSystemFrames": null
        }))
        .unwrap();
        assert!(stacktrace.is_empty());
        assert!(!stacktrace.has_system_frames);
    }
}
