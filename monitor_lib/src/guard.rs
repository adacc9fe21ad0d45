use crate::session::DiagnosticSession;
use sspi_shared::{LibraryKind, LogLevel};
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

const FAMILIES: usize = 3;

thread_local!(static CALL_DEPTH: Cell<[u32; FAMILIES]> = Cell::new([0; FAMILIES]));

fn family_index(family: LibraryKind) -> usize {
    match family {
        LibraryKind::Security => 0,
        LibraryKind::Certificate => 1,
        LibraryKind::NetworkLibrary => 2,
    }
}

/// Per-thread nesting depth of intercepted calls within one family. Only
/// the outermost call of a family logs; calls the real implementation
/// makes back into the same family run silently.
pub struct CallDepthGuard {
    family: LibraryKind,
    outermost: bool,
}

impl CallDepthGuard {
    pub fn enter(family: LibraryKind) -> CallDepthGuard {
        let idx = family_index(family);
        let depth = CALL_DEPTH.with(|depth| {
            let mut counts = depth.get();
            counts[idx] = counts[idx].saturating_add(1);
            depth.set(counts);
            counts[idx]
        });
        CallDepthGuard {
            family,
            outermost: depth == 1,
        }
    }

    pub fn is_outermost(&self) -> bool {
        self.outermost
    }
}

impl Drop for CallDepthGuard {
    fn drop(&mut self) {
        let idx = family_index(self.family);
        CALL_DEPTH.with(|depth| {
            let mut counts = depth.get();
            counts[idx] = counts[idx].saturating_sub(1);
            depth.set(counts);
        });
    }
}

pub fn current_depth(family: LibraryKind) -> u32 {
    CALL_DEPTH.with(|depth| depth.get()[family_index(family)])
}

/// Runs a logging closure, containing any panic it raises. The wrapped
/// call itself must never go through here.
pub fn log_guarded<F: FnOnce()>(session: &DiagnosticSession, wrapper: &str, f: F) {
    if panic::catch_unwind(AssertUnwindSafe(f)).is_err() {
        session.log(
            LogLevel::Warn,
            &format!("<logging fault suppressed in {}>", wrapper),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::thread;

    #[test]
    fn test_nested_calls_are_not_outermost() {
        let outer = CallDepthGuard::enter(LibraryKind::Certificate);
        assert!(outer.is_outermost());
        {
            let inner = CallDepthGuard::enter(LibraryKind::Certificate);
            assert!(!inner.is_outermost());
            assert_eq!(current_depth(LibraryKind::Certificate), 2);
            // A different family nested inside still logs.
            let other = CallDepthGuard::enter(LibraryKind::Security);
            assert!(other.is_outermost());
        }
        assert_eq!(current_depth(LibraryKind::Certificate), 1);
        drop(outer);
        assert_eq!(current_depth(LibraryKind::Certificate), 0);
    }

    #[test]
    fn test_depth_is_per_thread() {
        let _outer = CallDepthGuard::enter(LibraryKind::Certificate);
        let other_thread = thread::spawn(|| {
            let guard = CallDepthGuard::enter(LibraryKind::Certificate);
            guard.is_outermost()
        })
        .join()
        .unwrap();
        assert!(other_thread);
    }

    #[test]
    fn test_log_guarded_contains_panics() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.log");
        let session = DiagnosticSession::new(Config::default());
        session.open_log(&path).unwrap();

        let mut ran_after = false;
        log_guarded(&session, "CertNameToStrW", || panic!("decoder bug"));
        log_guarded(&session, "CertNameToStrW", || ran_after = true);
        assert!(ran_after);
        session.close_log().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("<logging fault suppressed in CertNameToStrW>"));
    }
}
