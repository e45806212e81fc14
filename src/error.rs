//! Error taxonomy shared by all the schemes.
//!
//! Every fallible operation of the crate returns an [`eyre::Result`]. When the
//! failure belongs to one of the categories below, the report wraps an
//! [`Error`] so that callers can branch on it with
//! `report.downcast_ref::<Error>()`.

use std::fmt;
use thiserror::Error;

/// Caller contract violations of the multi-party protocols.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misuse {
    /// `set_share` was called a second time
    ShareAlreadySet,
    /// an operation needing the private share ran before `set_share`
    ShareNotSet,
    /// the collected public keys do not match the client configuration
    PublicKeys,
    /// the same label was used for two different values
    LabelReuse,
    /// a ciphertext was produced under another label
    LabelMismatch,
    /// a client contribution is missing
    MissingContribution,
    /// a client contributed twice
    DuplicateContribution,
    /// a key share was derived for another function vector
    ForeignKeyShare,
}

impl fmt::Display for Misuse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Misuse::ShareAlreadySet => "the private share is already set",
            Misuse::ShareNotSet => "the private share is not set",
            Misuse::PublicKeys => "invalid set of client public keys",
            Misuse::LabelReuse => "label already used for another value",
            Misuse::LabelMismatch => "ciphertext label does not match",
            Misuse::MissingContribution => "missing client contribution",
            Misuse::DuplicateContribution => "duplicate client contribution",
            Misuse::ForeignKeyShare => "key share derived for another vector",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Vector or matrix arity different from the configured one
    #[error("wrong shape: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// A coordinate is not strictly bounded by the public bound in absolute value
    #[error("coordinate {index} is out of the bound {bound}")]
    CoordinateOutOfBound { index: usize, bound: String },

    /// The bounded discrete logarithm search exhausted its range
    #[error("no discrete logarithm below the bound {bound}")]
    DlogOutOfBound { bound: String },

    #[error("protocol misuse: {0}")]
    ProtocolMisuse(Misuse),

    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Group or curve parameters cannot be built for the requested size
    #[error("parameter generation failed: {0}")]
    ParameterGeneration(String),
}

impl Error {
    pub(crate) fn shape(expected: impl fmt::Display, actual: impl fmt::Display) -> eyre::Report {
        eyre::Report::new(Error::ShapeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }

    pub(crate) fn misuse(kind: Misuse) -> eyre::Report {
        eyre::Report::new(Error::ProtocolMisuse(kind))
    }
}

/// Return the crate error carried by the given report, if any.
pub fn kind(report: &eyre::Report) -> Option<&Error> {
    report.downcast_ref::<Error>()
}
