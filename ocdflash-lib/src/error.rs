use std::path::PathBuf;

use thiserror::Error;

/// Convenient result type for `ocdflash-lib`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A logical path could not be mapped to an existing file.
    #[error("could not resolve `{identifier}`: {reason}")]
    Resolution { identifier: String, reason: String },

    /// The resolved executable could not be started.
    #[error("failed to launch `{}`: {source}", .path.display())]
    Launch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The flashing tool ran and reported failure. `code` is `None` when the
    /// child was terminated without an exit code.
    #[error("{}", describe_exit(.code))]
    Execution { code: Option<i32> },

    #[error("unexpected error: {0}")]
    Unexpected(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn resolution(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Resolution {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::Unexpected(msg.into())
    }

    /// Process exit status for this failure.
    ///
    /// A child that ran and failed hands its own code through; everything
    /// else maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Execution { code: Some(code) } if *code != 0 => *code,
            _ => 1,
        }
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("flashing tool failed with exit code {code}"),
        None => "flashing tool was terminated without an exit code".to_string(),
    }
}
