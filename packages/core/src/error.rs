use std::fmt;

/// Errors constructed by the adapter itself, for notifications that carry no
/// error value of their own.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Interrupted {
    #[error("Request timed out after {ms} ms")]
    TimedOut { ms: u64 },

    #[error("Operation aborted")]
    Aborted,
}

/// Why a settlement was rejected.
///
/// `Fail` holds the raw failure payload, of the same type as a successful
/// result, so callers can tell application failures apart from transport
/// errors (`Error`) and adapter-constructed errors (`Interrupted`).
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection<T, E> {
    Fail(T),
    Error(E),
    Interrupted(Interrupted),
}

impl<T, E> Rejection<T, E> {
    pub fn is_fail(&self) -> bool {
        matches!(self, Rejection::Fail(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Rejection::Error(_))
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Rejection::Interrupted(_))
    }

    /// The failure payload, if this is an application-level failure.
    pub fn fail_payload(&self) -> Option<&T> {
        match self {
            Rejection::Fail(payload) => Some(payload),
            _ => None,
        }
    }

    /// The transport error, if this rejection came from one.
    pub fn transport_error(&self) -> Option<&E> {
        match self {
            Rejection::Error(error) => Some(error),
            _ => None,
        }
    }

    pub fn interrupted(&self) -> Option<&Interrupted> {
        match self {
            Rejection::Interrupted(interrupted) => Some(interrupted),
            _ => None,
        }
    }

    pub fn into_fail_payload(self) -> Option<T> {
        match self {
            Rejection::Fail(payload) => Some(payload),
            _ => None,
        }
    }
}

impl<T, E> From<Interrupted> for Rejection<T, E> {
    fn from(interrupted: Interrupted) -> Self {
        Rejection::Interrupted(interrupted)
    }
}

impl<T: fmt::Debug, E: fmt::Display> fmt::Display for Rejection<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Fail(payload) => write!(f, "request failed: {:?}", payload),
            Rejection::Error(error) => write!(f, "{}", error),
            Rejection::Interrupted(interrupted) => write!(f, "{}", interrupted),
        }
    }
}

impl<T, E> std::error::Error for Rejection<T, E>
where
    T: fmt::Debug,
    E: std::error::Error + 'static,
{
    // Display already renders the inner error, so the chain continues from
    // that error's own source.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Rejection::Fail(_) => None,
            Rejection::Error(error) => std::error::Error::source(error),
            Rejection::Interrupted(interrupted) => std::error::Error::source(interrupted),
        }
    }
}
