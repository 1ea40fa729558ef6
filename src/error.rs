//! Error types.
//!
//! `ProviderError` is what an action provider hands back to the dispatcher.
//! Everything except `SessionFatal` is recoverable: the session logs it and
//! keeps the previous screen. `AppError` is what reaches `main`.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("unexpected output from `{program}`: {output}")]
    UnexpectedOutput { program: String, output: String },

    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("{0} is not implemented")]
    Unimplemented(&'static str),

    /// The session cannot continue. Ends the interactive loop.
    #[error("{0}")]
    SessionFatal(String),
}

impl ProviderError {
    /// True when the error must end the session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProviderError::SessionFatal(_))
    }
}

/// Top-level failure of the binary.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("stdin is not an interactive terminal")]
    NotInteractive,

    #[error("cannot set up logging in {}: {source}", .path.display())]
    Logging {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown log level `{0}` (expected error, warn, info, debug or trace)")]
    LogLevel(String),

    /// A fatal error recorded by the session.
    #[error("{0}")]
    Fatal(String),

    /// A one-shot probe failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_session_fatal_is_fatal() {
        assert!(ProviderError::SessionFatal("boom".into()).is_fatal());
        assert!(!ProviderError::Unimplemented("Fusion Drive format").is_fatal());
        assert!(!ProviderError::NotConfigured("wifi ssid").is_fatal());
    }

    #[test]
    fn exit_status_message_names_program() {
        let err = ProviderError::ExitStatus {
            program: "diskutil".into(),
            status: "exit status: 1".into(),
            stderr: "Could not find disk".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("diskutil"));
        assert!(msg.contains("Could not find disk"));
    }

    #[test]
    fn fatal_app_error_is_bare_message() {
        let err = AppError::Fatal("cannot read /: permission denied".into());
        assert_eq!(err.to_string(), "cannot read /: permission denied");
    }
}
