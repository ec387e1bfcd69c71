//! Helpers for errors that are reported and then tolerated.

/// Converts a `Result` into an `Option`, logging the error.
pub trait ResultOkLogExt<T, E> {
    /// Logs the error as a warning prefixed with `context` and discards it.
    fn ok_log(self, context: &str) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self, context: &str) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::warn!("{context}: {err}");
                None
            }
        }
    }
}
