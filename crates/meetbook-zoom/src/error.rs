//! Error types and per-account failure diagnostics.
//!
//! Two failure shapes exist side by side. [`ZoomError`] is a hard failure of
//! one operation (bad link, unreachable endpoint, unexpected status). A
//! booking or lookup that walks the account pool instead accumulates one
//! [`AttemptFailure`] per account in a [`Diagnostics`] list and keeps going;
//! the list is only joined into a display string at the presentation boundary.

use std::fmt;

use thiserror::Error;

/// An error from a single Zoom operation.
#[derive(Debug, Error)]
pub enum ZoomError {
    /// The meeting link has no `/j/<digits>` segment.
    #[error("invalid meeting link: {0}")]
    InvalidLink(String),

    /// A hint account does not match any configured account.
    #[error("account {0} is not configured")]
    UnknownAccount(String),

    /// Transport failure: connection, DNS, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with an unexpected status.
    #[error("API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The API answered but the body could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local filesystem failure while writing a download.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Every configured account was tried and failed.
    #[error("{0}")]
    AllAccountsFailed(Diagnostics),
}

impl ZoomError {
    /// Classifies a reqwest error into the transport variants.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Network("request timeout".to_string())
        } else if err.is_connect() {
            Self::Network(format!("connection failed: {err}"))
        } else {
            Self::Network(format!("request failed: {err}"))
        }
    }
}

/// A specialized Result type for Zoom operations.
pub type ZoomResult<T> = Result<T, ZoomError>;

/// The stage of an account attempt at which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Token acquisition (client-credentials exchange).
    Token,
    /// Calendar conflict check.
    Availability,
    /// Meeting creation.
    Create,
    /// Meeting deletion probe.
    Delete,
    /// Recording metadata lookup.
    Recording,
    /// Summary retrieval or deletion.
    Summary,
    /// Media file download.
    Download,
}

impl Stage {
    /// Returns a short human-readable name for the stage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::Availability => "availability",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Recording => "recording",
            Self::Summary => "summary",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One failed attempt against one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    /// Email of the account the attempt ran against.
    pub account: String,
    /// Stage at which the attempt failed.
    pub stage: Stage,
    /// Human-readable cause.
    pub cause: String,
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed for {}: {}", self.stage, self.account, self.cause)
    }
}

/// Accumulated per-account failures from a pool walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    failures: Vec<AttemptFailure>,
}

impl Diagnostics {
    /// Creates an empty diagnostics list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failed attempt.
    pub fn push(&mut self, account: impl Into<String>, stage: Stage, cause: impl Into<String>) {
        self.failures.push(AttemptFailure {
            account: account.into(),
            stage,
            cause: cause.into(),
        });
    }

    /// Returns true if nothing failed.
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of recorded failures.
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Iterates over the recorded failures in attempt order.
    pub fn iter(&self) -> impl Iterator<Item = &AttemptFailure> {
        self.failures.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "no accounts available");
        }
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_names() {
        assert_eq!(Stage::Token.as_str(), "token");
        assert_eq!(Stage::Availability.as_str(), "availability");
        assert_eq!(Stage::Download.as_str(), "download");
    }

    #[test]
    fn diagnostics_accumulate_in_order() {
        let mut diag = Diagnostics::new();
        diag.push("a@example.com", Stage::Token, "no token");
        diag.push("b@example.com", Stage::Availability, "time conflict");

        assert_eq!(diag.len(), 2);
        let stages: Vec<Stage> = diag.iter().map(|f| f.stage).collect();
        assert_eq!(stages, vec![Stage::Token, Stage::Availability]);
    }

    #[test]
    fn diagnostics_display_newline_joined() {
        let mut diag = Diagnostics::new();
        diag.push("a@example.com", Stage::Token, "no token");
        diag.push("b@example.com", Stage::Create, "API error (400): bad");

        let text = diag.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "token failed for a@example.com: no token");
        assert!(lines[1].starts_with("create failed for b@example.com"));
    }

    #[test]
    fn empty_diagnostics_have_fallback_text() {
        assert_eq!(Diagnostics::new().to_string(), "no accounts available");
    }

    #[test]
    fn all_accounts_failed_wraps_diagnostics() {
        let mut diag = Diagnostics::new();
        diag.push("a@example.com", Stage::Delete, "not found");
        let err = ZoomError::AllAccountsFailed(diag);
        assert!(err.to_string().contains("delete failed for a@example.com"));
    }
}
