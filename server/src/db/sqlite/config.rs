use std::path::PathBuf;

use anyhow::Result;
use pawmart_misc::config::{CommonConfig, PathSet};
use serde::{Deserialize, Serialize};

use super::SqliteConnection;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SqliteConfig {
    /// Use an in-memory database instead of a file. Data is lost on exit,
    /// intended for local experiments only.
    #[serde(default)]
    pub memory: bool,

    #[serde(skip)]
    path: PathBuf,
}

impl CommonConfig for SqliteConfig {
    fn default() -> Self {
        Self {
            memory: false,
            path: PathBuf::new(),
        }
    }

    fn complete(&mut self, ps: &PathSet) -> Result<()> {
        if self.memory {
            return Ok(());
        }

        self.path = ps.data_path.join("pawmart.db");

        Ok(())
    }
}

impl SqliteConfig {
    pub fn build(&self) -> Result<SqliteConnection> {
        if self.memory {
            SqliteConnection::memory()
        } else {
            SqliteConnection::open(&self.path)
        }
    }
}
