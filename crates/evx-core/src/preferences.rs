//! Global display preferences backed by the config file.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::{Config, StacktraceOrder, paths};

/// User-wide display settings, shared by every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayPreferences {
    path: PathBuf,
    order: StacktraceOrder,
}

impl DisplayPreferences {
    /// Loads preferences from the default config file.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let config = Config::load_from(path)?;
        Ok(Self::from_config(&config, path))
    }

    pub fn from_config(config: &Config, path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            order: config.display.stacktrace_order,
        }
    }

    pub fn is_stacktrace_newest_first(&self) -> bool {
        self.order.is_newest_first()
    }

    /// Updates the frame order and writes it to the config file.
    ///
    /// Writing is skipped when the order doesn't change.
    pub fn set_newest_first(&mut self, newest_first: bool) -> Result<()> {
        let order = StacktraceOrder::from_newest_first(newest_first);
        if order == self.order {
            return Ok(());
        }

        Config::save_stacktrace_order_to(&self.path, order)?;
        tracing::info!(order = order.as_str(), "saved stacktrace order");
        self.order = order;
        Ok(())
    }
}
