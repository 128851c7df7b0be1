//! Thread selector state.

use evx_core::threads::{
    StackType, StackView, ThreadOption, ThreadView, derive_stack_view, find_best_thread,
    thread_options,
};
use evx_types::{Event, Thread, ThreadId};

/// Everything the selector renders from.
///
/// Derived data (labels, matched exception, display stack trace) is
/// recomputed from `event` and the selection on every read via
/// [`SelectorState::view`], so it can never drift from `active_thread`.
#[derive(Debug, Clone)]
pub struct SelectorState {
    pub event: Event,
    pub options: Vec<ThreadOption>,
    pub active_thread: Option<ThreadId>,
    /// `None` only when the event has no threads.
    pub stack_view: Option<StackView>,
    pub stack_type: StackType,
    pub newest_first: bool,
    /// First visible frame row.
    pub scroll: u16,
    /// One-line message in the footer (e.g. a failed save).
    pub status: Option<String>,
    pub should_quit: bool,
}

impl SelectorState {
    pub fn new(event: Event, newest_first: bool) -> Self {
        let best = find_best_thread(event.threads());
        let active_thread = best.map(|thread| thread.id.clone());
        let stack_view = best.map(|thread| derive_stack_view(Some(thread)));
        let options = thread_options(&event);

        Self {
            event,
            options,
            active_thread,
            stack_view,
            stack_type: StackType::Original,
            newest_first,
            scroll: 0,
            status: None,
            should_quit: false,
        }
    }

    pub fn thread(&self, id: &ThreadId) -> Option<&Thread> {
        self.event.threads().iter().find(|thread| &thread.id == id)
    }

    pub fn active(&self) -> Option<&Thread> {
        self.active_thread.as_ref().and_then(|id| self.thread(id))
    }

    /// Position of the active thread in the event's thread list.
    pub fn active_index(&self) -> Option<usize> {
        let id = self.active_thread.as_ref()?;
        self.event
            .threads()
            .iter()
            .position(|thread| &thread.id == id)
    }

    pub fn view(&self) -> Option<ThreadView<'_>> {
        let thread = self.active()?;
        Some(ThreadView::new(
            &self.event,
            thread,
            self.stack_view.unwrap_or(StackView::Full),
            self.stack_type,
        ))
    }
}
