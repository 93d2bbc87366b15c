//! Filesystem helpers
//!
//! Directory creation is retried a few times with a fixed pause. Nothing else is
//! retried.

use std::io;
use std::path::Path;
use std::thread;
use std::time::Duration;

/// How many times directory creation is attempted
pub const DIR_CREATE_ATTEMPTS: u32 = 3;

/// Pause between attempts
pub const DIR_CREATE_BACKOFF: Duration = Duration::from_millis(100);

/// Run `op` up to [`DIR_CREATE_ATTEMPTS`] times, sleeping between failures.
pub fn with_retry<T, F>(mut op: F) -> io::Result<T>
where
    F: FnMut() -> io::Result<T>,
{
    let mut attempt = 1;
    loop {
        match op() {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= DIR_CREATE_ATTEMPTS => return Err(err),
            Err(_) => {
                attempt += 1;
                thread::sleep(DIR_CREATE_BACKOFF);
            }
        }
    }
}

/// `fs::create_dir_all` with retries
pub fn create_dir_all_with_retry(path: &Path) -> io::Result<()> {
    with_retry(|| std::fs::create_dir_all(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_succeeds_after_transient_failure() {
        let mut calls = 0;
        let result = with_retry(|| {
            calls += 1;
            if calls < 2 {
                Err(io::Error::new(io::ErrorKind::Other, "busy"))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_retry_gives_up() {
        let mut calls = 0;
        let result: io::Result<()> = with_retry(|| {
            calls += 1;
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "nope"))
        });
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(calls, DIR_CREATE_ATTEMPTS);
    }

    #[test]
    fn test_create_nested() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        create_dir_all_with_retry(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
