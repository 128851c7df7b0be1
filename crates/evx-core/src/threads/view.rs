use std::fmt;

use evx_types::{Event, ExceptionData, ExceptionValue, Frame, StackTrace, Thread};

use super::exception::find_thread_exception;
use super::label::{ThreadInfo, build_thread_info, get_thread_stacktrace};

/// Which frames of a stack trace are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackView {
    /// In-app frames only.
    App,
    Full,
    /// Platform-native text rendering.
    Raw,
}

impl StackView {
    pub fn as_str(self) -> &'static str {
        match self {
            StackView::App => "app",
            StackView::Full => "full",
            StackView::Raw => "raw",
        }
    }
}

impl fmt::Display for StackView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the symbolicated or the minified (raw) trace is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StackType {
    #[default]
    Original,
    Minified,
}

impl StackType {
    pub fn toggled(self) -> Self {
        match self {
            StackType::Original => StackType::Minified,
            StackType::Minified => StackType::Original,
        }
    }

    pub fn prefers_raw(self) -> bool {
        self != StackType::Original
    }
}

/// Default stack view for a thread: app frames when the trace mixes in
/// system frames, the full trace otherwise.
pub fn derive_stack_view(thread: Option<&Thread>) -> StackView {
    match get_thread_stacktrace(thread, false) {
        Some(stacktrace) if stacktrace.has_system_frames => StackView::App,
        _ => StackView::Full,
    }
}

/// Everything needed to display one thread of an event.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadView<'a> {
    pub thread: &'a Thread,
    pub info: ThreadInfo,
    pub exception: Option<&'a ExceptionData>,
    pub stacktrace: Option<&'a StackTrace>,
    pub stack_view: StackView,
    pub stack_type: StackType,
}

impl<'a> ThreadView<'a> {
    pub fn new(
        event: &'a Event,
        thread: &'a Thread,
        stack_view: StackView,
        stack_type: StackType,
    ) -> Self {
        Self {
            thread,
            info: build_thread_info(thread, event),
            exception: find_thread_exception(thread, event),
            stacktrace: get_thread_stacktrace(Some(thread), stack_type.prefers_raw()),
            stack_view,
            stack_type,
        }
    }

    /// The exception value raised by this thread, if the matched entry has
    /// one. Falls back to the last (outermost) value of the entry.
    pub fn exception_value(&self) -> Option<&'a ExceptionValue> {
        let values = &self.exception?.values;
        values
            .iter()
            .rev()
            .find(|value| value.thread_id.as_ref() == Some(&self.thread.id))
            .or_else(|| values.last())
    }

    /// Frames to list for the current view, innermost first when
    /// `newest_first` is set.
    ///
    /// The app view keeps in-app frames only, unless none are in-app.
    pub fn visible_frames(&self, newest_first: bool) -> Vec<&'a Frame> {
        let Some(stacktrace) = self.stacktrace else {
            return Vec::new();
        };

        let app_only = self.stack_view == StackView::App && stacktrace.in_app_count() > 0;
        let mut frames: Vec<&Frame> = stacktrace
            .frames
            .iter()
            .filter(|frame| !app_only || frame.in_app)
            .collect();

        if newest_first {
            frames.reverse();
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use evx_types::Entry;

    use super::*;

    fn frame(function: &str, in_app: bool) -> Frame {
        Frame {
            function: Some(function.to_string()),
            in_app,
            ..Frame::default()
        }
    }

    #[test]
    fn test_derive_stack_view() {
        let mixed = Thread::new(1).with_stacktrace(StackTrace::from_frames(vec![], true));
        let plain = Thread::new(2).with_stacktrace(StackTrace::from_frames(vec![], false));
        assert_eq!(derive_stack_view(Some(&mixed)), StackView::App);
        assert_eq!(derive_stack_view(Some(&plain)), StackView::Full);
        assert_eq!(derive_stack_view(Some(&Thread::new(3))), StackView::Full);
        assert_eq!(derive_stack_view(None), StackView::Full);
    }

    #[test]
    fn test_minified_uses_raw_stacktrace() {
        let original = StackTrace::from_frames(vec![frame("handle_request", true)], false);
        let raw = StackTrace::from_frames(vec![frame("a.b", true)], false);
        let thread = Thread::new(1)
            .with_stacktrace(original.clone())
            .with_raw_stacktrace(raw.clone());
        let event = Event {
            entries: vec![Entry::Threads(evx_types::ThreadsData {
                values: vec![thread.clone()],
            })],
            ..Event::default()
        };

        let view = ThreadView::new(&event, &thread, StackView::Full, StackType::Minified);
        assert_eq!(view.stacktrace, Some(&raw));
        // The label always comes from the symbolicated trace.
        assert_eq!(view.info.label, "handle_request");

        let view = ThreadView::new(&event, &thread, StackView::Full, StackType::Original);
        assert_eq!(view.stacktrace, Some(&original));
    }

    #[test]
    fn test_visible_frames_filters_and_orders() {
        let thread = Thread::new(1).with_stacktrace(StackTrace::from_frames(
            vec![frame("main", true), frame("lib", false), frame("run", true)],
            true,
        ));
        let event = Event::default();

        let view = ThreadView::new(&event, &thread, StackView::App, StackType::Original);
        let names: Vec<_> = view
            .visible_frames(true)
            .into_iter()
            .filter_map(Frame::function_name)
            .collect();
        assert_eq!(names, ["run", "main"]);

        let view = ThreadView::new(&event, &thread, StackView::Full, StackType::Original);
        let names: Vec<_> = view
            .visible_frames(false)
            .into_iter()
            .filter_map(Frame::function_name)
            .collect();
        assert_eq!(names, ["main", "lib", "run"]);
    }

    #[test]
    fn test_exception_value_for_thread() {
        let thread = Thread::new(2);
        let event = Event {
            entries: vec![Entry::Exception(ExceptionData {
                values: vec![
                    ExceptionValue {
                        ty: Some("Cause".to_string()),
                        thread_id: Some(2.into()),
                        ..ExceptionValue::default()
                    },
                    ExceptionValue {
                        ty: Some("Other".to_string()),
                        thread_id: Some(1.into()),
                        ..ExceptionValue::default()
                    },
                ],
                ..ExceptionData::default()
            })],
            ..Event::default()
        };

        let view = ThreadView::new(&event, &thread, StackView::Full, StackType::Original);
        assert_eq!(
            view.exception_value().and_then(|v| v.ty.as_deref()),
            Some("Cause")
        );
    }

    #[test]
    fn test_app_view_without_in_app_frames_shows_everything() {
        let thread = Thread::new(1).with_stacktrace(StackTrace::from_frames(
            vec![frame("a", false), frame("b", false)],
            true,
        ));
        let event = Event::default();
        let view = ThreadView::new(&event, &thread, StackView::App, StackType::Original);
        assert_eq!(view.visible_frames(false).len(), 2);
    }
}
