use std::sync::LazyLock;

use evx_types::{Event, StackTrace, Thread};
use regex::Regex;

use super::frame::select_relevant_frame;

/// Label used when nothing better is known about a thread.
pub const UNKNOWN_LABEL: &str = "<unknown>";

static WINDOWS_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]:\\|\\\\)").expect("windows path prefix regex is a valid pattern")
});

static BINARY_SUFFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(dylib|so|a|dll|exe)$").expect("binary suffix regex is a valid pattern")
});

/// Short summary of a thread for selectors and headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub label: String,
    pub filename: Option<String>,
}

impl Default for ThreadInfo {
    fn default() -> Self {
        Self {
            label: UNKNOWN_LABEL.to_string(),
            filename: None,
        }
    }
}

/// Resolves which stack trace to show for a thread.
///
/// The raw (unsymbolicated) trace is used only when requested and present.
pub fn get_thread_stacktrace(thread: Option<&Thread>, prefer_raw: bool) -> Option<&StackTrace> {
    let thread = thread?;
    if prefer_raw && let Some(raw) = thread.raw_stacktrace.as_ref() {
        return Some(raw);
    }
    thread.stacktrace.as_ref()
}

/// Derives the label and filename shown for a thread.
///
/// Label priority for the relevant frame: function, trimmed package, module,
/// then [`UNKNOWN_LABEL`].
pub fn build_thread_info(thread: &Thread, _event: &Event) -> ThreadInfo {
    let mut info = ThreadInfo::default();

    let Some(frame) = get_thread_stacktrace(Some(thread), false).and_then(select_relevant_frame)
    else {
        return info;
    };

    info.filename = frame.file_name().map(trim_filename);

    if let Some(function) = frame.function_name() {
        info.label = function.to_string();
    } else if let Some(package) = frame.package_name() {
        info.label = trim_package(package);
    } else if let Some(module) = frame.module_name() {
        info.label = module.to_string();
    }

    info
}

/// Strips directories from a path, keeping the last `/`-separated segment.
pub fn trim_filename(filename: &str) -> String {
    filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .to_string()
}

/// Shortens a package (binary image) path to its file name without the
/// shared-library or executable extension.
///
/// Windows drive (`C:\`) and UNC (`\\`) paths split on backslashes.
pub fn trim_package(package: &str) -> String {
    let separator = if WINDOWS_PATH_RE.is_match(package) {
        '\\'
    } else {
        '/'
    };
    let pieces: Vec<&str> = package.split(separator).collect();
    let len = pieces.len();
    let filename = [pieces.get(len.wrapping_sub(1)), pieces.get(len.wrapping_sub(2))]
        .into_iter()
        .flatten()
        .find(|piece| !piece.is_empty())
        .copied()
        .unwrap_or(package);

    BINARY_SUFFIX_RE.replace(filename, "").into_owned()
}
