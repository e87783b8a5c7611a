//! Common result types.

/// The error type used across chat-mux.
pub type Err = anyhow::Error;
/// A result carrying [`Err`].
pub type Res<T> = Result<T, Err>;
/// A result with no value.
pub type Void = Res<()>;
