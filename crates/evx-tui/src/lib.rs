//! Full-screen thread selector for one event.

pub mod effects;
pub mod events;
pub mod render;
pub mod runtime;
pub mod state;
pub mod terminal;
pub mod update;

use std::io::{IsTerminal, stdout};

use anyhow::Result;
use evx_core::preferences::DisplayPreferences;
use evx_types::Event;
pub use runtime::SelectorRuntime;

/// Runs the interactive selector until the user quits.
pub fn run_thread_selector(event: Event, preferences: DisplayPreferences) -> Result<()> {
    if !stdout().is_terminal() {
        anyhow::bail!(
            "The thread viewer requires a terminal.\n\
             Use `evx threads show <FILE>` for plain text output."
        );
    }

    let mut runtime = SelectorRuntime::new(event, preferences)?;
    runtime.run()
}
