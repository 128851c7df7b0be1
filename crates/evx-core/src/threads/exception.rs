use evx_types::{Event, ExceptionData, Thread};

/// Finds the exception entry that belongs to `thread`.
///
/// A single exception without a thread id is attributed to every thread.
/// Otherwise the entry matches when any of its values names this thread.
pub fn find_thread_exception<'a>(thread: &Thread, event: &'a Event) -> Option<&'a ExceptionData> {
    let exception = event.exception()?;

    match exception.values.as_slice() {
        [] => None,
        [only] if only.thread_id.is_none() => Some(exception),
        values => values
            .iter()
            .any(|value| value.thread_id.as_ref() == Some(&thread.id))
            .then_some(exception),
    }
}
