//! DuckDB session settings and library discovery for the table loader

use crate::error::{ReconError, Result};
use duckdb::Connection;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the loader's memory limit
pub const MEMORY_LIMIT_ENV: &str = "TABRECON_DUCKDB_MEMORY_LIMIT";

const DEFAULT_MEMORY_LIMIT: &str = "4GB";

/// DuckDB configuration used by every loader connection
#[derive(Debug, Clone)]
pub struct DuckDbConfig {
    pub library_path: Option<PathBuf>,
    pub memory_limit: String,
}

impl DuckDbConfig {
    /// Discover the library and read overrides from the environment
    pub fn new() -> Self {
        let memory_limit = env::var(MEMORY_LIMIT_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MEMORY_LIMIT.to_string());

        Self {
            library_path: Self::discover_library_path(),
            memory_limit,
        }
    }

    /// Open an in-memory connection with the session settings applied
    pub fn open_connection(&self) -> Result<Connection> {
        let connection = Connection::open_in_memory()?;
        self.apply(&connection)?;
        Ok(connection)
    }

    /// Apply session settings.
    ///
    /// Insertion order must be preserved: positional alignment pairs rows by
    /// the order the file lists them in.
    pub fn apply(&self, connection: &Connection) -> Result<()> {
        let memory_limit = self.memory_limit.replace('\'', "");
        connection.execute_batch(&format!(
            "SET memory_limit='{}';
             SET enable_progress_bar=false;
             SET preserve_insertion_order=true;",
            memory_limit
        ))?;
        Ok(())
    }

    fn discover_library_path() -> Option<PathBuf> {
        if let Ok(path) = env::var("DUCKDB_LIB_PATH") {
            let path_buf = PathBuf::from(path);
            if path_buf.exists() {
                return Some(path_buf);
            }
        }

        Self::standard_paths()
            .into_iter()
            .find(|path| Self::check_duckdb_library(path))
    }

    fn standard_paths() -> Vec<PathBuf> {
        let paths: &[&str] = if cfg!(target_os = "macos") {
            &["/opt/homebrew/lib", "/usr/local/lib", "/opt/local/lib"]
        } else if cfg!(target_os = "windows") {
            &["C:\\Program Files\\DuckDB\\lib", "C:\\duckdb\\lib"]
        } else {
            &["/usr/lib", "/usr/local/lib", "/usr/lib/x86_64-linux-gnu", "/usr/lib64"]
        };
        paths.iter().map(PathBuf::from).collect()
    }

    fn check_duckdb_library(path: &Path) -> bool {
        let names: &[&str] = if cfg!(target_os = "windows") {
            &["duckdb.dll", "libduckdb.dll"]
        } else if cfg!(target_os = "macos") {
            &["libduckdb.dylib"]
        } else {
            &["libduckdb.so", "libduckdb.so.1"]
        };
        names.iter().any(|name| path.join(name).exists())
    }

    /// Succeeds when the bundled build is in use or a system library was found
    pub fn validate(&self) -> Result<()> {
        if cfg!(feature = "bundled") || self.library_path.is_some() {
            return Ok(());
        }

        Err(ReconError::config(
            "DuckDB library not found. Install libduckdb, set DUCKDB_LIB_PATH, \
             or build with `--features bundled`",
        ))
    }
}

impl Default for DuckDbConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initialize DuckDB configuration and validate it
pub fn init_duckdb() -> Result<DuckDbConfig> {
    let config = DuckDbConfig::new();
    config.validate()?;

    if cfg!(feature = "bundled") {
        log::debug!("Using bundled DuckDB library");
    } else if let Some(path) = &config.library_path {
        log::debug!("Using DuckDB library from: {}", path.display());
    }

    Ok(config)
}
