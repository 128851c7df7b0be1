//! Thread command handlers.

use std::fmt::Write as _;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use evx_core::preferences::DisplayPreferences;
use evx_core::threads::{
    StackType, StackView, ThreadView, derive_stack_view, find_best_thread, raw_stacktrace_content,
    thread_options,
};
use evx_types::{Event, Frame, ThreadId};

/// Stack view flags shared by thread commands.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct ViewArgs {
    /// Print the stack trace the way the platform's runtime does
    #[arg(long, conflicts_with = "full")]
    raw: bool,

    /// Include system frames
    #[arg(long)]
    full: bool,

    /// Use the unsymbolicated (minified) stack trace when available
    #[arg(long)]
    minified: bool,
}

impl ViewArgs {
    fn stack_view(self, derived: StackView) -> StackView {
        if self.raw {
            StackView::Raw
        } else if self.full {
            StackView::Full
        } else {
            derived
        }
    }

    fn stack_type(self) -> StackType {
        if self.minified {
            StackType::Minified
        } else {
            StackType::Original
        }
    }
}

/// Reads an event from a JSON file, or stdin for `-`.
pub fn load_event(path: &Path) -> Result<Event> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("read event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("read event file {}", path.display()))?
    };
    serde_json::from_str(&json).with_context(|| format!("parse event {}", path.display()))
}

pub fn show(path: &Path, thread: Option<&str>, view: ViewArgs, json: bool) -> Result<()> {
    let event = load_event(path)?;

    if json {
        let options = thread_options(&event);
        println!("{}", serde_json::to_string_pretty(&options)?);
        return Ok(());
    }

    let selected = match thread {
        Some(input) => {
            let threads = event.threads();
            let id = ThreadId::parse(input);
            // Exact id first, then "1" for a thread reported with string id "1".
            let found = threads
                .iter()
                .find(|thread| thread.id == id)
                .or_else(|| threads.iter().find(|thread| thread.id.matches_input(input)));
            Some(found.with_context(|| format!("Thread '{}' not found in event", input.trim()))?)
        }
        None => find_best_thread(event.threads()),
    };
    let Some(selected) = selected else {
        println!("This event has no threads.");
        return Ok(());
    };

    let newest_first = DisplayPreferences::load()?.is_stacktrace_newest_first();
    let stack_view = view.stack_view(derive_stack_view(Some(selected)));
    let thread_view = ThreadView::new(&event, selected, stack_view, view.stack_type());

    print!("{}", format_thread_list(&event, &selected.id));
    println!();
    print!("{}", format_thread_view(&event, &thread_view, newest_first));
    Ok(())
}

pub fn view(path: &Path) -> Result<()> {
    let event = load_event(path)?;
    let preferences = DisplayPreferences::load()?;
    evx_tui::run_thread_selector(event, preferences)
}

fn format_thread_list(event: &Event, selected: &ThreadId) -> String {
    let mut out = String::new();
    for option in thread_options(event) {
        let marker = if &option.id == selected { '*' } else { ' ' };
        let _ = write!(out, "{marker} {}  {}", option.title(), option.label);
        if let Some(filename) = &option.filename {
            let _ = write!(out, " ({filename})");
        }
        if option.crashed {
            out.push_str("  [crashed]");
        } else if option.current {
            out.push_str("  [current]");
        }
        out.push('\n');
    }
    out
}

fn format_thread_view(event: &Event, view: &ThreadView<'_>, newest_first: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Thread {}",
        match view.thread.display_name() {
            Some(name) => format!("#{} {name}", view.thread.id),
            None => format!("#{}", view.thread.id),
        }
    );
    if let Some(exception) = view.exception_value() {
        let _ = writeln!(out, "{}", exception.summary());
    }
    let _ = writeln!(
        out,
        "view: {}  stack: {}",
        view.stack_view,
        if view.stack_type.prefers_raw() {
            "minified"
        } else {
            "original"
        }
    );
    out.push('\n');

    let Some(stacktrace) = view.stacktrace else {
        out.push_str("No stack trace available for this thread.\n");
        return out;
    };

    if view.stack_view == StackView::Raw {
        let _ = writeln!(
            out,
            "{}",
            raw_stacktrace_content(stacktrace, event.platform(), view.exception_value())
        );
        return out;
    }

    for frame in view.visible_frames(newest_first) {
        let _ = writeln!(out, "{}", format_frame(frame));
    }
    out
}

fn format_frame(frame: &Frame) -> String {
    let function = frame
        .function_name()
        .or(frame.raw_function.as_deref())
        .unwrap_or("?");
    let location = frame
        .file_name()
        .or_else(|| frame.module_name())
        .or_else(|| frame.package_name());

    let mut line = format!("  {function}");
    if let Some(location) = location {
        let _ = write!(line, "  {location}");
        if let Some(line_no) = frame.line_no {
            let _ = write!(line, ":{line_no}");
        }
    }
    if frame.in_app {
        line.push_str("  [app]");
    }
    line
}
