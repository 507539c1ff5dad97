#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(coverage_nightly, coverage(off))] // This is all test code, no need to test it.

//! Private helpers for tests of `resource_meter`.

use std::env;
use std::panic;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

const WATCHDOG_TIMEOUT: Duration = Duration::from_secs(10);
const WATCHDOG_TIMEOUT_MIRI: Duration = Duration::from_secs(60);

/// Runs `test_fn` on a separate thread and panics if it does not finish in time.
///
/// Multithreaded tests that deadlock would otherwise hang the test run forever. The limit is
/// 10 seconds, or 60 seconds under Miri.
///
/// Setting the `MUTATION_TESTING` environment variable to `1` runs `test_fn` directly on the
/// calling thread without a limit, so that the mutation testing harness can detect mutations
/// that hang.
///
/// # Panics
///
/// Panics if `test_fn` panics or exceeds the time limit.
///
/// # Example
///
/// ```rust
/// use testing::with_watchdog;
///
/// let sum = with_watchdog(|| (1..=10).sum::<u32>());
/// assert_eq!(sum, 55);
/// ```
pub fn with_watchdog<F, R>(test_fn: F) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    if env::var("MUTATION_TESTING").as_deref() == Ok("1") {
        return test_fn();
    }

    let timeout = if cfg!(miri) {
        WATCHDOG_TIMEOUT_MIRI
    } else {
        WATCHDOG_TIMEOUT
    };

    let (tx, rx) = mpsc::channel();

    let worker = thread::spawn(move || {
        // The receiver is gone if the watchdog already gave up.
        drop(tx.send(test_fn()));
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            worker.join().expect("worker sent its result so it did not panic");
            result
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            panic!("test did not finish within {} seconds", timeout.as_secs());
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match worker.join() {
            Ok(()) => panic!("test thread ended without producing a result"),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Returns the absolute difference between `a` and `b`, or zero if it is not more than
/// `close_enough`.
///
/// Use as `assert!(f64_diff_abs(actual, expected, 1e-9) < 1e-9)` to compare floating point
/// values without exact equality.
#[must_use]
pub fn f64_diff_abs(a: f64, b: f64, close_enough: f64) -> f64 {
    let diff = (a - b).abs();

    if diff <= close_enough { 0.0 } else { diff }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn watchdog_returns_result() {
        assert_eq!(with_watchdog(|| 42), 42);
        assert_eq!(with_watchdog(|| "done"), "done");
    }

    #[test]
    #[should_panic(expected = "inner failure")]
    fn watchdog_propagates_panic() {
        with_watchdog(|| -> u32 { panic!("inner failure") });
    }

    #[test]
    fn diff_within_tolerance_is_zero() {
        assert!(f64_diff_abs(1.0, 1.000_000_000_1, 1e-9) < f64::EPSILON);
        assert!(f64_diff_abs(1.0, 1.5, 1e-9) > 0.4);
    }
}
