pub use anyhow::{anyhow, bail, ensure};
pub use paste::paste;
pub use thiserror::Error;

pub type EmptyResult = anyhow::Result<()>;

// This macro creates an enum which derives from thiserror::Error, and also
// creates constructor functions in snake case for each of the enum variants
#[macro_export]
macro_rules! err_impl {
    (@hidden $errtype:ident, $item:ident, String) => {
        paste! {
            pub(crate) fn [<$item:snake>](in_: &str) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.into())}
            }
        }
    };

    (@hidden $errtype:ident, $item:ident, $($dtype:tt)::+) => {
        paste! {
            pub(crate) fn [<$item:snake>](in_: &$($dtype)::+) -> anyhow::Error {
                anyhow!{$errtype::$item(in_.clone())}
            }
        }
    };

    ($errtype:ident,
        $(#[$errinfo:meta] $item:ident($($dtype:tt)::+),)+
    ) => {
        #[derive(Debug, Error)]
        pub(crate) enum $errtype {
            $(#[$errinfo] $item($($dtype)::+)),+
        }

        impl $errtype {
            $(err_impl! {@hidden $errtype, $item, $($dtype)::+})+
        }
    };
}

pub use err_impl;

/// Discriminant for the single classified error type the pause cycle produces.
/// The variants are ordered by severity: a failed unpause means the live fleet
/// may still be paused and an operator has to intervene.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PauserErrorKind {
    InvalidArgument,
    TargetNotFound,
    CoordinatorInit,
    PauseFailed,
    UnpauseFailed,
    GetTargetAfterPauseFailed,
    StatusCheckFailed,
    StatusUnmatched,
}

/// One classified outcome of a pause cycle.  Instead of a hierarchy of narrow
/// error types, every failure carries a kind, an optional underlying cause, and
/// the list of lower-priority failures that were observed during the same run
/// (so no diagnostic information is lost when several phases fail at once).
#[derive(Debug, Error)]
#[error("{message}")]
pub struct PauserError {
    pub kind: PauserErrorKind,
    message: String,
    #[source]
    pub cause: Option<anyhow::Error>,
    pub secondary: Vec<PauserError>,
}

impl PauserError {
    pub fn new(kind: PauserErrorKind, message: impl Into<String>) -> PauserError {
        PauserError {
            kind,
            message: message.into(),
            cause: None,
            secondary: vec![],
        }
    }

    pub fn with_cause(kind: PauserErrorKind, message: impl Into<String>, cause: anyhow::Error) -> PauserError {
        PauserError { cause: Some(cause), ..PauserError::new(kind, message) }
    }

    /// Chain another classified error underneath this one as its direct cause.
    pub fn caused_by(mut self, cause: PauserError) -> PauserError {
        self.cause = Some(anyhow::Error::new(cause));
        self
    }

    /// Attach a lower-priority failure from the same run.
    pub fn attach(&mut self, secondary: PauserError) {
        self.secondary.push(secondary);
    }
}
