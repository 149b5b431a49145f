//! # Process-wide fatal hook for programmer errors.
//!
//! Every [`MisuseError`] detected by the runtime ends up in [`fatal`], which
//! hands it to the currently installed hook. The hook never returns.
//!
//! ## Resolution order
//! ```text
//! fatal(err)
//!   ├─► thread-local override (installed by catch_misuse)   if present
//!   └─► global hook (set_fatal_hook / reset_fatal_hook)     otherwise
//!          └─ default: log + std::process::abort()
//! ```
//!
//! ## Rules
//! - The global hook is shared by every thread; replace it once at startup.
//! - [`catch_misuse`] only intercepts misuse raised on the **calling thread**.
//!   Work executed on a [`SerialLane`](crate::SerialLane) worker still goes to
//!   the global hook.
//!
//! ## Example
//! ```
//! use statevisor::{catch_misuse, MisuseError, Publisher};
//!
//! let publisher: Publisher<u32> = Publisher::new();
//! publisher.dispose();
//!
//! let err = catch_misuse(|| publisher.post(1)).unwrap_err();
//! assert_eq!(err, MisuseError::PublisherDisposed { operation: "post" });
//! ```

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use parking_lot::RwLock;

use crate::error::MisuseError;

/// Signature of a fatal hook. It must diverge (abort, panic, exit, ...).
pub type FatalHook = fn(MisuseError) -> !;

static GLOBAL_HOOK: RwLock<FatalHook> = parking_lot::const_rwlock(abort_hook as FatalHook);

thread_local! {
    static LOCAL_HOOK: Cell<Option<FatalHook>> = const { Cell::new(None) };
}

/// Reports a programmer error through the installed hook.
pub(crate) fn fatal(err: MisuseError) -> ! {
    let hook = LOCAL_HOOK
        .with(Cell::get)
        .unwrap_or_else(|| *GLOBAL_HOOK.read());
    hook(err)
}

/// Replaces the global hook and returns the previous one.
pub fn set_fatal_hook(hook: FatalHook) -> FatalHook {
    std::mem::replace(&mut *GLOBAL_HOOK.write(), hook)
}

/// Restores the default aborting hook.
pub fn reset_fatal_hook() {
    *GLOBAL_HOOK.write() = abort_hook;
}

/// Default hook: logs the violation and aborts the process.
pub fn abort_hook(err: MisuseError) -> ! {
    tracing::error!(label = err.as_label(), "fatal misuse: {err}");
    eprintln!("[statevisor] fatal misuse: {err}");
    std::process::abort()
}

/// Hook that unwinds with the [`MisuseError`] as panic payload.
///
/// Install it globally to turn misuse into ordinary panics (e.g. in a test
/// binary), or use [`catch_misuse`] to scope it to one closure.
pub fn unwinding_hook(err: MisuseError) -> ! {
    panic::panic_any(err)
}

/// Runs `f` and converts a misuse raised on this thread into `Err`.
///
/// Panics that do not carry a [`MisuseError`] are resumed unchanged.
///
/// ### Notes
/// Unwinding out of the runtime leaves the offending object in whatever state
/// it had when the violation was detected; the runtime's own locks and the
/// work queue drain flag are released.
pub fn catch_misuse<R>(f: impl FnOnce() -> R) -> Result<R, MisuseError> {
    let previous = LOCAL_HOOK.with(|h| h.replace(Some(unwinding_hook as FatalHook)));
    let _restore = scopeguard::guard(previous, |prev| LOCAL_HOOK.with(|h| h.set(prev)));

    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<MisuseError>() {
            Ok(err) => Err(*err),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_catch_misuse_returns_value_without_violation() {
        assert_eq!(catch_misuse(|| 41 + 1), Ok(42));
    }

    #[test]
    fn test_catch_misuse_captures_error() {
        let res: Result<(), _> = catch_misuse(|| fatal(MisuseError::NotRunning));
        assert_eq!(res, Err(MisuseError::NotRunning));
    }

    #[test]
    fn test_catch_misuse_nests_and_restores() {
        let outer: Result<(), _> = catch_misuse(|| {
            let inner: Result<(), _> = catch_misuse(|| fatal(MisuseError::AlreadyRunning));
            assert_eq!(inner, Err(MisuseError::AlreadyRunning));
            fatal(MisuseError::NoViewConnected)
        });
        assert_eq!(outer.unwrap_err(), MisuseError::NoViewConnected);
        assert!(LOCAL_HOOK.with(Cell::get).is_none());
    }

    #[test]
    fn test_catch_misuse_resumes_foreign_panics() {
        let res = panic::catch_unwind(|| catch_misuse(|| -> () { panic!("not a misuse") }));
        assert!(res.is_err());
        assert!(LOCAL_HOOK.with(Cell::get).is_none());
    }

    #[test]
    #[serial]
    fn test_global_hook_can_be_replaced_and_reset() {
        let previous = set_fatal_hook(unwinding_hook);
        let res = std::thread::spawn(|| {
            panic::catch_unwind(|| -> () { fatal(MisuseError::AcceptAfterDispose) })
        })
        .join()
        .expect("thread joins");
        let payload = res.expect_err("hook unwinds");
        assert_eq!(
            payload.downcast_ref::<MisuseError>(),
            Some(&MisuseError::AcceptAfterDispose)
        );

        set_fatal_hook(previous);
        reset_fatal_hook();
        assert!(*GLOBAL_HOOK.read() as usize == abort_hook as FatalHook as usize);
    }
}
