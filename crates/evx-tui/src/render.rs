//! Pure render functions for the thread selector.
//!
//! Everything here reads `&SelectorState` and draws to a ratatui frame.
//! No mutations, no effects.

use evx_core::threads::{StackView, ThreadView, raw_stacktrace_content};
use evx_types::Frame as StackFrame;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::state::SelectorState;

/// Width of the thread list on the left.
const THREAD_LIST_WIDTH: u16 = 32;

/// Height of the footer (help or status line).
const FOOTER_HEIGHT: u16 = 1;

const HELP: &str = "↑/↓ thread  a/f/r view  m minified  o order  PgUp/PgDn scroll  q quit";

pub fn render(state: &SelectorState, frame: &mut Frame) {
    let area = frame.area();
    let [body, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(FOOTER_HEIGHT)])
        .areas(area);

    if state.options.is_empty() {
        frame.render_widget(
            Paragraph::new("This event has no threads.")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title("Threads")),
            body,
        );
        render_footer(state, frame, footer);
        return;
    }

    let [list_area, detail_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(THREAD_LIST_WIDTH.min(body.width / 2)),
            Constraint::Min(1),
        ])
        .areas(body);

    render_thread_list(state, frame, list_area);
    render_detail(state, frame, detail_area);
    render_footer(state, frame, footer);
}

fn render_thread_list(state: &SelectorState, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = state
        .options
        .iter()
        .map(|option| {
            let marker = if option.crashed {
                Span::styled("✖ ", Style::default().fg(Color::Red))
            } else if option.current {
                Span::styled("● ", Style::default().fg(Color::Yellow))
            } else {
                Span::raw("  ")
            };
            let label = Span::styled(
                format!(" {}", option.label),
                Style::default().fg(Color::DarkGray),
            );
            ListItem::new(Line::from(vec![marker, Span::raw(option.title()), label]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Threads ({})", state.options.len())),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Magenta)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );

    let mut list_state = ListState::default();
    list_state.select(state.active_index());
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_detail(state: &SelectorState, frame: &mut Frame, area: Rect) {
    let Some(view) = state.view() else {
        frame.render_widget(
            Paragraph::new("No thread selected.").block(Block::default().borders(Borders::ALL)),
            area,
        );
        return;
    };

    let mut lines = vec![header_line(&view), mode_line(state, &view), Line::default()];
    lines.extend(
        detail_lines(state, &view)
            .into_iter()
            .skip(usize::from(state.scroll)),
    );

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(view.info.label.clone()),
    );
    frame.render_widget(paragraph, area);
}

fn header_line(view: &ThreadView<'_>) -> Line<'static> {
    let title = match view.thread.display_name() {
        Some(name) => format!("#{} {name}", view.thread.id),
        None => format!("#{}", view.thread.id),
    };
    let mut spans = vec![Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if view.thread.crashed {
        spans.push(Span::styled(" crashed", Style::default().fg(Color::Red)));
    }
    if let Some(exception) = view.exception_value() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            exception.summary(),
            Style::default().fg(Color::Red),
        ));
    }
    Line::from(spans)
}

fn mode_line(state: &SelectorState, view: &ThreadView<'_>) -> Line<'static> {
    let stack_type = if view.stack_type.prefers_raw() {
        "minified"
    } else {
        "original"
    };
    let order = if state.newest_first {
        "newest first"
    } else {
        "oldest first"
    };
    Line::from(Span::styled(
        format!("view: {}  stack: {stack_type}  order: {order}", view.stack_view),
        Style::default().fg(Color::DarkGray),
    ))
}

/// Body lines of the detail pane, before scrolling.
pub fn detail_lines(state: &SelectorState, view: &ThreadView<'_>) -> Vec<Line<'static>> {
    let Some(stacktrace) = view.stacktrace else {
        return vec![Line::from(Span::styled(
            "No stack trace available for this thread.",
            Style::default().fg(Color::DarkGray),
        ))];
    };

    if view.stack_view == StackView::Raw {
        return raw_stacktrace_content(stacktrace, state.event.platform(), view.exception_value())
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect();
    }

    view.visible_frames(state.newest_first)
        .into_iter()
        .map(frame_line)
        .collect()
}

fn frame_line(frame: &StackFrame) -> Line<'static> {
    let function = frame
        .function_name()
        .or(frame.raw_function.as_deref())
        .unwrap_or("?")
        .to_string();
    let location = frame
        .file_name()
        .or_else(|| frame.module_name())
        .or_else(|| frame.package_name())
        .map(|location| match frame.line_no {
            Some(line) => format!("{location}:{line}"),
            None => location.to_string(),
        });

    let function_style = if frame.in_app {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let mut spans = vec![Span::raw("  "), Span::styled(function, function_style)];
    if let Some(location) = location {
        spans.push(Span::styled(
            format!("  {location}"),
            Style::default().fg(Color::Cyan),
        ));
    }
    Line::from(spans)
}

fn render_footer(state: &SelectorState, frame: &mut Frame, area: Rect) {
    let line = match &state.status {
        Some(status) => Span::styled(status.clone(), Style::default().fg(Color::Yellow)),
        None => Span::styled(HELP, Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(Line::from(line)), area);
}
