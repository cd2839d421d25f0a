use thiserror::Error;
use wfc_core::WfcError;
use wfc_rules::RulesError;

/// Errors surfaced by the command-line application.
#[derive(Error, Debug)]
pub enum AppError {
    /// Invalid command line or configuration file.
    #[error("Configuration Error: {0}")]
    Config(String),

    /// Reading or writing a grid file failed.
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed grid text.
    #[error("Parse Error on line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// Training or generation failed.
    #[error("WFC Core Error: {0}")]
    WfcCore(#[from] WfcError),
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<RulesError> for AppError {
    fn from(err: RulesError) -> Self {
        Self::WfcCore(WfcError::Rules(err))
    }
}
