//! Reducer for the thread selector.
//!
//! `update` is the only place the selector state changes. It performs no
//! I/O; anything with side effects is returned as a [`UiEffect`].

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use evx_core::threads::{StackView, derive_stack_view};

use crate::effects::UiEffect;
use crate::events::{SelectorEvent, UiEvent};
use crate::render;
use crate::state::SelectorState;

pub fn update(state: &mut SelectorState, event: UiEvent) -> Vec<UiEffect> {
    match event {
        UiEvent::Terminal(Event::Key(key)) => match key_to_event(state, key) {
            Some(selector_event) => apply(state, selector_event),
            None => vec![],
        },
        UiEvent::Terminal(_) => vec![],
        UiEvent::Selector(selector_event) => apply(state, selector_event),
        UiEvent::SortOrderPersisted(result) => {
            state.status = result
                .err()
                .map(|err| format!("Could not save frame order: {err}"));
            vec![]
        }
    }
}

/// Applies one selector transition.
pub fn apply(state: &mut SelectorState, event: SelectorEvent) -> Vec<UiEffect> {
    match event {
        SelectorEvent::SelectThread(id) => {
            let Some(thread) = state.thread(&id) else {
                tracing::debug!(%id, "ignoring selection of unknown thread");
                return vec![];
            };
            // Raw stays raw across threads; other views follow the new thread.
            if state.stack_view != Some(StackView::Raw) {
                state.stack_view = Some(derive_stack_view(Some(thread)));
            }
            state.active_thread = Some(id);
            state.stack_type = Default::default();
            state.scroll = 0;
            vec![]
        }
        SelectorEvent::ChangeStackView {
            stack_view,
            stack_type,
        } => {
            if let Some(stack_view) = stack_view {
                state.stack_view = Some(stack_view);
            }
            if let Some(stack_type) = stack_type {
                state.stack_type = stack_type;
            }
            state.scroll = 0;
            vec![]
        }
        SelectorEvent::ChangeSortOrder(newest_first) => {
            state.newest_first = newest_first;
            vec![UiEffect::PersistSortOrder { newest_first }]
        }
        SelectorEvent::ScrollFrames(delta) => {
            let delta = i16::try_from(delta).unwrap_or(if delta < 0 { i16::MIN } else { i16::MAX });
            state.scroll = state.scroll.saturating_add_signed(delta).min(max_scroll(state));
            vec![]
        }
        SelectorEvent::Quit => {
            state.should_quit = true;
            vec![UiEffect::Quit]
        }
    }
}

/// Last scroll offset that still shows a detail line.
fn max_scroll(state: &SelectorState) -> u16 {
    let line_count = state
        .view()
        .map_or(0, |view| render::detail_lines(state, &view).len());
    u16::try_from(line_count.saturating_sub(1)).unwrap_or(u16::MAX)
}

fn key_to_event(state: &SelectorState, key: KeyEvent) -> Option<SelectorEvent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let event = match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => SelectorEvent::Quit,
        KeyCode::Char('q') | KeyCode::Esc => SelectorEvent::Quit,
        KeyCode::Up | KeyCode::Char('k') => select_relative(state, -1)?,
        KeyCode::Down | KeyCode::Char('j') => select_relative(state, 1)?,
        KeyCode::Char('a') => view_event(StackView::App),
        KeyCode::Char('f') => view_event(StackView::Full),
        KeyCode::Char('r') => view_event(StackView::Raw),
        KeyCode::Char('m') => SelectorEvent::ChangeStackView {
            stack_view: None,
            stack_type: Some(state.stack_type.toggled()),
        },
        KeyCode::Char('o') => SelectorEvent::ChangeSortOrder(!state.newest_first),
        KeyCode::PageDown => SelectorEvent::ScrollFrames(10),
        KeyCode::PageUp => SelectorEvent::ScrollFrames(-10),
        _ => return None,
    };
    Some(event)
}

fn view_event(stack_view: StackView) -> SelectorEvent {
    SelectorEvent::ChangeStackView {
        stack_view: Some(stack_view),
        stack_type: None,
    }
}

/// Selects the thread `offset` rows away from the active one, clamped to
/// the list.
fn select_relative(state: &SelectorState, offset: isize) -> Option<SelectorEvent> {
    let threads = state.event.threads();
    let last = threads.len().checked_sub(1)?;
    let target = match state.active_index() {
        Some(index) => index.saturating_add_signed(offset).min(last),
        None => 0,
    };
    if Some(target) == state.active_index() {
        return None;
    }
    Some(SelectorEvent::SelectThread(threads[target].id.clone()))
}
