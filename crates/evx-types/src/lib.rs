//! Event payload types shared across evx crates.
//!
//! These mirror the JSON the monitoring API returns for a single event:
//! an ordered list of typed entries, two of which (`exception` and
//! `threads`) carry the data the thread explorer works on.

mod de;
pub mod event;
pub mod exception;
pub mod resource;
pub mod stacktrace;
pub mod thread;

pub use event::{Entry, Event};
pub use exception::{ExceptionData, ExceptionValue};
pub use resource::{Release, Repository, RepositoryProvider};
pub use stacktrace::{Frame, StackTrace};
pub use thread::{Thread, ThreadId, ThreadsData};
