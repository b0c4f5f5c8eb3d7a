//! Panic boundary.
//!
//! # Responsibilities
//! - Run a closure and turn a panic into a [`PanicReport`]
//! - Capture the panic location, and a backtrace when asked to
//!
//! # Design Decisions
//! - One process-wide panic hook, installed on first use, chained to the
//!   previous hook for panics outside a boundary
//! - Inside a boundary the hook records instead of printing; the dispatcher
//!   logs the report itself
//! - State is thread-local: a panic unwinds on the thread that raised it

use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::{Cell, RefCell};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

/// A panic caught by [`catch`].
#[derive(Debug, Clone)]
pub struct PanicReport {
    pub message: String,
    pub location: Option<String>,
    pub backtrace: Option<String>,
}

impl std::fmt::Display for PanicReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} at {}", self.message, location),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Default)]
struct HookRecord {
    location: Option<String>,
    backtrace: Option<String>,
}

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static CAPTURE_BACKTRACE: Cell<bool> = const { Cell::new(false) };
    static LAST_PANIC: RefCell<Option<HookRecord>> = const { RefCell::new(None) };
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            if DEPTH.with(Cell::get) == 0 {
                previous(info);
                return;
            }
            let backtrace = CAPTURE_BACKTRACE
                .with(Cell::get)
                .then(|| Backtrace::force_capture().to_string());
            let record = HookRecord {
                location: info.location().map(|l| l.to_string()),
                backtrace,
            };
            LAST_PANIC.with(|slot| *slot.borrow_mut() = Some(record));
        }));
    });
}

/// Restores the enclosing boundary's state on exit.
struct Boundary {
    capture: bool,
}

impl Boundary {
    fn enter(capture_backtrace: bool) -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        let capture = CAPTURE_BACKTRACE.with(|c| c.replace(capture_backtrace));
        Self { capture }
    }
}

impl Drop for Boundary {
    fn drop(&mut self) {
        CAPTURE_BACKTRACE.with(|c| c.set(self.capture));
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Run `f`, converting a panic into a report.
pub fn catch<R>(capture_backtrace: bool, f: impl FnOnce() -> R) -> Result<R, PanicReport> {
    install_hook();
    let outcome = {
        let _boundary = Boundary::enter(capture_backtrace);
        panic::catch_unwind(AssertUnwindSafe(f))
    };
    outcome.map_err(|payload| {
        let record = LAST_PANIC.with(|slot| slot.borrow_mut().take()).unwrap_or_default();
        PanicReport {
            message: panic_message(payload.as_ref()),
            location: record.location,
            backtrace: record.backtrace,
        }
    })
}

/// The text a panic was raised with.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_passes_through() {
        assert_eq!(catch(false, || 7).unwrap(), 7);
    }

    #[test]
    fn test_str_panic() {
        let report = catch(false, || panic!("boom")).unwrap_err();
        assert_eq!(report.message, "boom");
        assert!(report.location.unwrap().contains("recovery.rs"));
        assert!(report.backtrace.is_none());
    }

    #[test]
    fn test_formatted_panic_with_backtrace() {
        let id = 42;
        let report = catch(true, || panic!("record {id} missing")).unwrap_err();
        assert_eq!(report.message, "record 42 missing");
        assert!(report.backtrace.is_some());
    }

    #[test]
    fn test_nested_boundaries() {
        let outer = catch(false, || {
            let inner = catch(true, || panic!("inner"));
            assert!(inner.unwrap_err().backtrace.is_some());
            CAPTURE_BACKTRACE.with(Cell::get)
        });
        assert!(!outer.unwrap());
    }

    #[test]
    fn test_non_string_payload() {
        let report = catch(false, || std::panic::panic_any(5_u32)).unwrap_err();
        assert_eq!(report.message, "unknown panic payload");
    }
}
