//! Selector runtime: owns the terminal, runs the event loop, executes effects.
//!
//! All side effects happen here. The reducer stays pure and returns
//! effects; this module performs them and feeds results back as events.

use std::io::Stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event;
use evx_core::preferences::DisplayPreferences;
use evx_types::Event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::effects::UiEffect;
use crate::events::UiEvent;
use crate::state::SelectorState;
use crate::{render, terminal, update};

/// How long to block waiting for input before redrawing.
const POLL_DURATION: Duration = Duration::from_millis(250);

/// Full-screen thread selector.
///
/// The terminal is restored on drop.
pub struct SelectorRuntime {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    pub state: SelectorState,
    preferences: DisplayPreferences,
}

impl SelectorRuntime {
    pub fn new(event: Event, preferences: DisplayPreferences) -> Result<Self> {
        terminal::install_panic_hook();
        let terminal = terminal::setup_terminal()?;
        let state = SelectorState::new(event, preferences.is_stacktrace_newest_first());
        Ok(Self {
            terminal,
            state,
            preferences,
        })
    }

    /// Runs until the user quits.
    pub fn run(&mut self) -> Result<()> {
        let mut dirty = true;

        while !self.state.should_quit {
            if dirty {
                self.terminal.draw(|frame| render::render(&self.state, frame))?;
                dirty = false;
            }

            if !event::poll(POLL_DURATION)? {
                continue;
            }
            let mut events = vec![UiEvent::Terminal(event::read()?)];
            while event::poll(Duration::ZERO)? {
                events.push(UiEvent::Terminal(event::read()?));
            }

            for event in events {
                self.dispatch_event(event);
            }
            dirty = true;
        }

        Ok(())
    }

    fn dispatch_event(&mut self, event: UiEvent) {
        let effects = update::update(&mut self.state, event);
        for effect in effects {
            self.execute_effect(effect);
        }
    }

    fn execute_effect(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::Quit => self.state.should_quit = true,
            UiEffect::PersistSortOrder { newest_first } => {
                let result = self
                    .preferences
                    .set_newest_first(newest_first)
                    .map_err(|err| {
                        tracing::warn!(error = %err, "failed to save stacktrace order");
                        format!("{err:#}")
                    });
                self.dispatch_event(UiEvent::SortOrderPersisted(result));
            }
        }
    }
}

impl Drop for SelectorRuntime {
    fn drop(&mut self) {
        let _ = terminal::restore_terminal();
    }
}
