use evx_types::Thread;

/// Chooses the thread shown first for an event.
///
/// Preference order: the crashed thread, then the first thread with a stack
/// trace, then the first thread at all.
pub fn find_best_thread(threads: &[Thread]) -> Option<&Thread> {
    threads
        .iter()
        .find(|thread| thread.crashed)
        .or_else(|| threads.iter().find(|thread| thread.stacktrace.is_some()))
        .or_else(|| threads.first())
}
