//! Events consumed by the reducer.

use evx_core::threads::{StackType, StackView};
use evx_types::ThreadId;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Raw terminal input, translated into selector events by the reducer.
    Terminal(crossterm::event::Event),
    Selector(SelectorEvent),
    /// Outcome of a `PersistSortOrder` effect.
    SortOrderPersisted(Result<(), String>),
}

/// User intents of the thread selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    SelectThread(ThreadId),
    /// Partial update: `None` fields keep their current value.
    ChangeStackView {
        stack_view: Option<StackView>,
        stack_type: Option<StackType>,
    },
    ChangeSortOrder(bool),
    ScrollFrames(i32),
    Quit,
}

impl From<SelectorEvent> for UiEvent {
    fn from(event: SelectorEvent) -> Self {
        UiEvent::Selector(event)
    }
}
