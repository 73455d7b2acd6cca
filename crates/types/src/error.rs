use thiserror::Error;

/// Failures that abort a depth computation before any output is produced.
/// Everything downstream of input validation either succeeds or degrades
/// locally (see the locked-reserve estimator).
#[derive(Error, Debug)]
pub enum DepthError {
    /// A string-encoded numeric field could not be parsed. The whole batch
    /// aborts since a tick set with inconsistent indices is unusable.
    #[error("malformed numeric input for {0}: '{1}'")]
    MalformedNumericInput(&'static str, String),
    /// The supplied tick set was empty, so no window bounds can be derived.
    #[error("empty tick set, no depth window can be derived")]
    EmptyTickSet
}
