//! Thread selection and stack trace resolution.
//!
//! Pipeline for one event:
//!
//! ```text
//! Event.threads ──▶ find_best_thread ──▶ Thread
//!                                         ├──▶ find_thread_exception ──▶ ExceptionData
//!                                         └──▶ get_thread_stacktrace ──▶ select_relevant_frame
//!                                                                          └──▶ build_thread_info
//! ```
//!
//! Every step degrades to `None` or a placeholder label instead of failing,
//! so a partially captured event still renders.

mod best;
mod exception;
mod frame;
mod label;
mod options;
mod raw;
mod view;

pub use best::find_best_thread;
pub use exception::find_thread_exception;
pub use frame::select_relevant_frame;
pub use label::{
    ThreadInfo, UNKNOWN_LABEL, build_thread_info, get_thread_stacktrace, trim_filename,
    trim_package,
};
pub use options::{ThreadOption, thread_options};
pub use raw::raw_stacktrace_content;
pub use view::{StackType, StackView, ThreadView, derive_stack_view};
