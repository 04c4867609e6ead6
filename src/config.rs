use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable consulted when no path argument is given.
pub const DATA_PATH_ENV: &str = "TITANIC_DATA";
pub const DEFAULT_DATA_PATH: &str = "titanic.csv";

/// Startup configuration, resolved once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_path: PathBuf,
}

impl Config {
    /// First positional argument, else `$TITANIC_DATA`, else `titanic.csv`.
    pub fn from_env() -> Self {
        Self::resolve(std::env::args_os().nth(1), std::env::var_os(DATA_PATH_ENV))
    }

    pub fn resolve(arg: Option<OsString>, env: Option<OsString>) -> Self {
        let data_path = arg
            .filter(|a| !a.is_empty())
            .or_else(|| env.filter(|e| !e.is_empty()))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));
        Config { data_path }
    }
}
