//! Utility macros used internally by the crate.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's used for argument validation where the caller gets the error back.
///
/// # Example
///
/// ```ignore
/// ensure!((0..=11).contains(&quality), CompressError::invalid_argument("quality"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
