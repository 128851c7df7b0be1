use evx_types::{Event, ThreadId};
use serde::Serialize;

use super::label::build_thread_info;

/// One entry of the thread picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThreadOption {
    pub id: ThreadId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub crashed: bool,
    pub current: bool,
}

impl ThreadOption {
    /// `#id name` heading, falling back to `#id` for unnamed threads.
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) => format!("#{} {name}", self.id),
            None => format!("#{}", self.id),
        }
    }
}

/// Builds picker entries for every thread of the event, in event order.
pub fn thread_options(event: &Event) -> Vec<ThreadOption> {
    event
        .threads()
        .iter()
        .map(|thread| {
            let info = build_thread_info(thread, event);
            ThreadOption {
                id: thread.id.clone(),
                name: thread.display_name().map(str::to_string),
                label: info.label,
                filename: info.filename,
                crashed: thread.crashed,
                current: thread.current,
            }
        })
        .collect()
}
