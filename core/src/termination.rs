//! # Functionality Related to Early Termination
//!
//! Public entry points report their outcome as [`MaybeTerminatedError`]. Internally, the
//! exploration routines return [`Flow`], a plain [`Result`] whose error side is a [`Stop`], so
//! that terminations and errors propagate with `?` on stable Rust.

use std::fmt;

/// Early termination reasons for [`crate::Explorer::explore`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    /// Terminated because of maximum number of oracle calls reached
    OracleCallsLimit,
    /// Terminated because of maximum number of outcomes reached
    OutcomesLimit,
    /// Terminated because the time limit ran out between two oracle calls
    TimeLimit,
    /// Termination because of external interrupt
    Interrupted,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::OracleCallsLimit => {
                write!(f, "Exploration terminated early because of oracle call limit")
            }
            Termination::OutcomesLimit => {
                write!(f, "Exploration terminated early because of outcome limit")
            }
            Termination::TimeLimit => {
                write!(f, "Exploration terminated early because of time limit")
            }
            Termination::Interrupted => {
                write!(f, "Exploration terminated early because of interrupt signal")
            }
        }
    }
}

/// Return type for functions that either return a value or were terminated early for some reason
#[derive(Debug, PartialEq)]
pub enum MaybeTerminated<T = ()> {
    /// The operation finished with a return value
    Done(T),
    /// The operation was terminated early
    Terminated(Termination),
}

impl<T> MaybeTerminated<T> {
    pub fn unwrap(self) -> T {
        match self {
            MaybeTerminated::Done(val) => val,
            MaybeTerminated::Terminated(term) => {
                panic!("called `MaybeTerminated::unwrap()` on a `Terminated` value: {term}")
            }
        }
    }

    /// Checks whether the operation ran to completion
    pub fn is_done(&self) -> bool {
        matches!(self, MaybeTerminated::Done(_))
    }
}

/// Return type for functions that either return a value, terminate early or error
#[derive(Debug)]
pub enum MaybeTerminatedError<T = ()> {
    /// The operation finished with a return value
    Done(T),
    /// The operation was terminated early
    Terminated(Termination),
    /// The operation failed
    Error(anyhow::Error),
}

impl<T> MaybeTerminatedError<T> {
    pub fn unwrap(self) -> T {
        match self {
            MaybeTerminatedError::Done(val) => val,
            MaybeTerminatedError::Terminated(term) => {
                panic!("called `MaybeTerminatedError::unwrap()` on a `Terminated` value: {term}")
            }
            MaybeTerminatedError::Error(err) => {
                panic!("called `MaybeTerminatedError::unwrap()` on an `Error` value: {err}")
            }
        }
    }

    /// Checks whether the operation ran to completion
    pub fn is_done(&self) -> bool {
        matches!(self, MaybeTerminatedError::Done(_))
    }

    /// Converts into an [`anyhow::Result`], turning terminations into errors
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            MaybeTerminatedError::Done(val) => Ok(val),
            MaybeTerminatedError::Terminated(term) => Err(anyhow::anyhow!("{term}")),
            MaybeTerminatedError::Error(err) => Err(err),
        }
    }
}

impl<T> From<MaybeTerminated<T>> for MaybeTerminatedError<T> {
    fn from(value: MaybeTerminated<T>) -> Self {
        match value {
            MaybeTerminated::Done(val) => MaybeTerminatedError::Done(val),
            MaybeTerminated::Terminated(term) => MaybeTerminatedError::Terminated(term),
        }
    }
}

impl<T> From<anyhow::Result<T>> for MaybeTerminatedError<T> {
    fn from(value: anyhow::Result<T>) -> Self {
        match value {
            Ok(val) => MaybeTerminatedError::Done(val),
            Err(err) => MaybeTerminatedError::Error(err),
        }
    }
}

impl<T> From<Flow<T>> for MaybeTerminatedError<T> {
    fn from(value: Flow<T>) -> Self {
        match value {
            Ok(val) => MaybeTerminatedError::Done(val),
            Err(Stop::Terminated(term)) => MaybeTerminatedError::Terminated(term),
            Err(Stop::Error(err)) => MaybeTerminatedError::Error(err),
        }
    }
}

/// The reason a [`Flow`] stopped before producing its value
#[derive(Debug)]
pub(crate) enum Stop {
    Terminated(Termination),
    Error(anyhow::Error),
}

impl From<Termination> for Stop {
    fn from(value: Termination) -> Self {
        Stop::Terminated(value)
    }
}

impl From<anyhow::Error> for Stop {
    fn from(value: anyhow::Error) -> Self {
        Stop::Error(value)
    }
}

impl From<crate::NumericalInconsistency> for Stop {
    fn from(value: crate::NumericalInconsistency) -> Self {
        Stop::Error(value.into())
    }
}

/// Internal control flow of the exploration routines
pub(crate) type Flow<T = ()> = Result<T, Stop>;

impl MaybeTerminated {
    /// Lifts a termination check into a [`Flow`]
    pub(crate) fn into_flow(self) -> Flow {
        match self {
            MaybeTerminated::Done(()) => Ok(()),
            MaybeTerminated::Terminated(term) => Err(Stop::Terminated(term)),
        }
    }
}

/// Equivalent of [`anyhow::ensure`] for [`Flow`]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err(crate::termination::Stop::Error(anyhow::anyhow!($msg)));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err(crate::termination::Stop::Error(anyhow::anyhow!($err)));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(crate::termination::Stop::Error(anyhow::anyhow!($fmt, $($arg)*)));
        }
    };
}
pub(crate) use ensure;

#[cfg(test)]
mod tests {
    use super::{Flow, MaybeTerminatedError, Stop, Termination};

    fn limited(n: usize) -> Flow<usize> {
        if n > 2 {
            return Err(Termination::OracleCallsLimit.into());
        }
        Ok(n)
    }

    fn checked(n: usize) -> Flow<usize> {
        super::ensure!(n != 0, "zero is not allowed");
        let val = limited(n)?;
        Ok(val * 2)
    }

    #[test]
    fn flow_conversion() {
        assert_eq!(MaybeTerminatedError::from(checked(2)).unwrap(), 4);
        match MaybeTerminatedError::from(checked(3)) {
            MaybeTerminatedError::Terminated(term) => {
                assert_eq!(term, Termination::OracleCallsLimit)
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            MaybeTerminatedError::from(checked(0)),
            MaybeTerminatedError::Error(_)
        ));
    }

    #[test]
    fn into_result() {
        assert_eq!(MaybeTerminatedError::from(checked(1)).into_result().unwrap(), 2);
        let err = MaybeTerminatedError::from(checked(5))
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("oracle call limit"));
    }

    #[test]
    fn anyhow_into_stop() {
        let stop: Stop = anyhow::anyhow!("oracle failed").into();
        assert!(matches!(stop, Stop::Error(_)));
    }
}
