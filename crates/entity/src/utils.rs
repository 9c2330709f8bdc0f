//! Internal helper macros.

/// Returns early with `Err($error)` when `$predicate` does not hold.
///
/// Works like `assert!` but reports a caller error instead of panicking:
///
/// ```ignore
/// ensure!(offset <= buffer.len(), EntityError::out_of_range(offset, length, buffer.len()));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
