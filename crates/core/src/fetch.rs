use thiserror::Error;

use crate::errors::FetchError;

/// Load state of one fetch call site.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchState<T> {
    Idle,
    Loading,
    Success(T),
    Error(FetchError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("cannot resolve a fetch from the {from:?} state")]
pub struct FetchTransitionError {
    pub from: FetchPhase,
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> FetchState<T> {
    pub fn phase(&self) -> FetchPhase {
        match self {
            Self::Idle => FetchPhase::Idle,
            Self::Loading => FetchPhase::Loading,
            Self::Success(_) => FetchPhase::Success,
            Self::Error(_) => FetchPhase::Error,
        }
    }

    /// Enters `Loading`, discarding any previous outcome.
    pub fn begin(&mut self) {
        *self = Self::Loading;
    }

    pub fn resolve(&mut self, result: Result<T, FetchError>) -> Result<(), FetchTransitionError> {
        if !self.is_loading() {
            return Err(FetchTransitionError { from: self.phase() });
        }

        *self = match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Error(error),
        };
        Ok(())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}
