//! Effects returned by the reducer for the runtime to execute.
//!
//! The reducer never touches the terminal or the config file itself.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    Quit,

    /// Write the global frame order preference to the config file.
    PersistSortOrder { newest_first: bool },
}
