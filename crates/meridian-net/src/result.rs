//! Three-state result model shared by every networking operation.

use crate::error::NetworkError;

/// The outcome of a network operation.
///
/// Exactly one variant is active at a time. `Error` always carries a
/// classified [`NetworkError`] whose display form is a non-empty message.
/// `Loading` exists so callers can thread in-flight state through the same
/// channel as final outcomes.
#[derive(Clone, Debug, PartialEq)]
pub enum NetworkResult<T> {
    /// The operation completed and produced a value.
    Success(T),
    /// The operation failed with a classified error.
    Error(NetworkError),
    /// The operation is still in flight.
    Loading(bool),
}

impl<T> NetworkResult<T> {
    /// An active loading marker.
    pub fn loading() -> Self {
        Self::Loading(true)
    }

    /// Check if this is a `Success`.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Check if this is an `Error`.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Check if this is a `Loading`.
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading(_))
    }

    /// Extract the success value, if any.
    pub fn ok(self) -> Option<T> {
        match self {
            Self::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Extract the error, if any.
    pub fn err(self) -> Option<NetworkError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Map the success value to a new type. Error and Loading pass through
    /// with their payloads untouched.
    pub fn map<R>(self, transform: impl FnOnce(T) -> R) -> NetworkResult<R> {
        match self {
            Self::Success(value) => NetworkResult::Success(transform(value)),
            Self::Error(error) => NetworkResult::Error(error),
            Self::Loading(active) => NetworkResult::Loading(active),
        }
    }

    /// Run `action` with the success value, returning `self` unchanged.
    pub fn on_success(self, action: impl FnOnce(&T)) -> Self {
        if let Self::Success(ref value) = self {
            action(value);
        }
        self
    }

    /// Run `action` with the error, returning `self` unchanged.
    pub fn on_error(self, action: impl FnOnce(&NetworkError)) -> Self {
        if let Self::Error(ref error) = self {
            action(error);
        }
        self
    }

    /// Run `action` with the loading flag, returning `self` unchanged.
    pub fn on_loading(self, action: impl FnOnce(bool)) -> Self {
        if let Self::Loading(active) = self {
            action(active);
        }
        self
    }

    /// Convert into a plain `Result`, treating `Loading` as an error.
    pub fn into_result(self) -> crate::error::Result<T> {
        match self {
            Self::Success(value) => Ok(value),
            Self::Error(error) => Err(error),
            Self::Loading(_) => Err(NetworkError::Unknown(
                "operation still in flight".to_string(),
            )),
        }
    }
}

impl<T> From<crate::error::Result<T>> for NetworkResult<T> {
    fn from(result: crate::error::Result<T>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(error) => Self::Error(error),
        }
    }
}
