//! Helpers for unit tests.

/// Includes a file from the `test_files/` folder next to the calling module
/// as byte slice.
macro_rules! include_test_file {
    ($filename:expr) => {
        include_bytes!(concat!("test_files/", $filename)) as &[u8]
    }
}

/// Asserts that the expression evaluates to an `Err` matching the pattern
/// (and guard, if given).
macro_rules! assert_err {
    ($e:expr, $pat:pat if $cond:expr) => {
        match $e {
            Err($pat) if $cond => {}
            Err(e) => panic!("unexpected error for `{}`: {:?}", stringify!($e), e),
            Ok(_) => panic!("expected error for `{}`, got `Ok`", stringify!($e)),
        }
    };
    ($e:expr, $pat:pat) => {
        match $e {
            Err($pat) => {}
            Err(e) => panic!("unexpected error for `{}`: {:?}", stringify!($e), e),
            Ok(_) => panic!("expected error for `{}`, got `Ok`", stringify!($e)),
        }
    }
}
