use crate::hooks;
use crate::interceptor::Interceptor;
use crate::loader::{self, LoadReport, ModuleResolver};
use crate::session::{ActiveHooks, DiagnosticSession};
use sspi_shared::{DiagError, LogLevel, Result};

impl DiagnosticSession {
    /// Resolves the intercepted functions and redirects every one that was
    /// found to its wrapper.
    pub fn start(
        &self,
        resolver: &dyn ModuleResolver,
        interceptor: Box<dyn Interceptor>,
    ) -> Result<LoadReport> {
        let mut hooks = self.lock_hooks();
        if hooks.is_some() {
            return Err(DiagError::AlreadyActive);
        }

        let report = loader::load_functions(self, resolver)?;

        let mut installed = Vec::new();
        for (id, target) in self.table().populated() {
            let replacement = hooks::replacement(id);
            let token = match unsafe { interceptor.prepare(target, replacement) } {
                Ok(token) => token,
                Err(e) => {
                    self.log(LogLevel::Error, &format!("Failed to hook {}: {}", id.symbol(), e));
                    continue;
                }
            };
            // Wrappers must reach the original through the trampoline from
            // the moment the patch is live.
            self.table().set(id, token.trampoline);
            match unsafe { interceptor.enable(&token) } {
                Ok(()) => {
                    self.log(
                        LogLevel::Trace,
                        &format!(
                            "Hooked {} at 0x{:08x} (trampoline 0x{:08x})",
                            id.symbol(),
                            target,
                            token.trampoline
                        ),
                    );
                    installed.push((id, token));
                }
                Err(e) => {
                    self.table().set(id, target);
                    self.log(LogLevel::Error, &format!("Failed to hook {}: {}", id.symbol(), e));
                }
            }
        }

        self.log(
            LogLevel::Info,
            &format!(
                "Interception started, {} of {} functions hooked",
                installed.len(),
                report.resolved
            ),
        );
        *hooks = Some(ActiveHooks {
            interceptor,
            installed,
        });
        Ok(report)
    }

    /// Removes every hook installed by `start` and restores the original
    /// addresses in the function table.
    pub fn stop(&self) -> Result<()> {
        let mut hooks = self.lock_hooks();
        let Some(active) = hooks.take() else {
            return Err(DiagError::NotActive);
        };

        let mut stuck = 0;
        for (id, token) in active.installed.iter().rev() {
            match unsafe { active.interceptor.uninstall(token) } {
                Ok(()) => {
                    self.table().set(*id, token.target);
                    self.log(LogLevel::Trace, &format!("Unhooked {}", id.symbol()));
                }
                Err(e) => {
                    // The patch is still live, so the slot keeps the trampoline.
                    stuck += 1;
                    self.log(LogLevel::Error, &format!("Failed to unhook {}: {}", id.symbol(), e));
                }
            }
        }
        if stuck > 0 {
            // Dropping the interceptor would release trampolines that live
            // patches still jump through.
            std::mem::forget(active.interceptor);
            self.log(
                LogLevel::Warn,
                &format!("{} hooks could not be removed and stay in place", stuck),
            );
        }

        self.log(LogLevel::Info, "Interception stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::interceptor::{InterceptorEvent, RecordingInterceptor};
    use crate::loader::StaticModuleResolver;
    use crate::session::DiagnosticSession;
    use crate::table::HookId;
    use sspi_shared::{DiagError, LibraryKind};
    use std::sync::Arc;

    fn resolver(with_crypt: bool) -> StaticModuleResolver {
        let exports = |kind: LibraryKind, base: usize| -> Vec<(&'static str, usize)> {
            HookId::ALL
                .iter()
                .filter(|id| id.library() == kind)
                .enumerate()
                .map(|(i, id)| (id.symbol(), base + i * 0x10))
                .collect()
        };
        let mut r = StaticModuleResolver::new()
            .with_module("secur32.dll", &exports(LibraryKind::Security, 0x1000))
            .with_module("dbnetlib.dll", &exports(LibraryKind::NetworkLibrary, 0x3000));
        if with_crypt {
            r = r.with_module("crypt32.dll", &exports(LibraryKind::Certificate, 0x2000));
        }
        r
    }

    #[test]
    fn test_start_hooks_every_resolved_function() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::new());
        session.start(&resolver(true), Box::new(recorder.clone())).unwrap();
        assert!(session.is_active());
        assert_eq!(session.hooked().len(), HookId::COUNT);
        assert_eq!(recorder.enabled_targets().len(), HookId::COUNT);
    }

    #[test]
    fn test_double_start_is_rejected() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::new());
        session.start(&resolver(true), Box::new(recorder.clone())).unwrap();
        let events_before = recorder.events();

        let second = Arc::new(RecordingInterceptor::new());
        let err = session.start(&resolver(true), Box::new(second.clone())).unwrap_err();
        assert!(matches!(err, DiagError::AlreadyActive));
        assert_eq!(recorder.events(), events_before);
        assert!(second.events().is_empty());
        assert_eq!(session.hooked().len(), HookId::COUNT);
    }

    #[test]
    fn test_stop_without_start() {
        let session = DiagnosticSession::new(Config::default());
        assert!(matches!(session.stop(), Err(DiagError::NotActive)));
    }

    #[test]
    fn test_stop_restores_original_addresses() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::new());
        session.start(&resolver(true), Box::new(recorder.clone())).unwrap();
        let before: Vec<_> = session.table().populated();
        session.stop().unwrap();

        assert!(!session.is_active());
        assert!(recorder.enabled_targets().is_empty());
        assert_eq!(session.table().populated(), before);
        assert_eq!(session.table().get(HookId::AcquireCredentialsHandleA), Some(0x1000));
        assert!(matches!(session.stop(), Err(DiagError::NotActive)));
    }

    #[test]
    fn test_failed_unhook_keeps_trampoline_alive() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::failing_disable_on(0x1000).with_trampoline_offset(0x800));
        session.start(&resolver(true), Box::new(recorder.clone())).unwrap();
        assert_eq!(session.table().get(HookId::AcquireCredentialsHandleA), Some(0x1800));

        session.stop().unwrap();
        assert!(!session.is_active());
        assert_eq!(recorder.enabled_targets(), vec![0x1000]);
        assert_eq!(session.table().get(HookId::AcquireCredentialsHandleA), Some(0x1800));
        assert_eq!(session.table().get(HookId::InitializeSecurityContextA), Some(0x1010));
        // The session gave up its handle without dropping it.
        assert_eq!(Arc::strong_count(&recorder), 2);
    }

    #[test]
    fn test_clean_stop_releases_interceptor() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::new().with_trampoline_offset(0x800));
        session.start(&resolver(true), Box::new(recorder.clone())).unwrap();
        assert_eq!(session.table().get(HookId::AcquireCredentialsHandleA), Some(0x1800));
        session.stop().unwrap();
        assert_eq!(session.table().get(HookId::AcquireCredentialsHandleA), Some(0x1000));
        assert_eq!(Arc::strong_count(&recorder), 1);
    }

    #[test]
    fn test_optional_library_missing_still_starts() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::new());
        let report = session.start(&resolver(false), Box::new(recorder.clone())).unwrap();
        assert_eq!(report.missing_optional, vec![LibraryKind::Certificate]);
        assert_eq!(session.hooked().len(), 12);
        assert!(!session.hooked().contains(&HookId::CertNameToStrW));
        session.stop().unwrap();
    }

    #[test]
    fn test_required_library_missing_hooks_nothing() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::new());
        let resolver = StaticModuleResolver::new().with_module("secur32.dll", &[("AcquireCredentialsHandleA", 0x1000)]);
        let err = session.start(&resolver, Box::new(recorder.clone())).unwrap_err();
        assert!(matches!(err, DiagError::LibraryLoadFailure { library: LibraryKind::NetworkLibrary }));
        assert!(!session.is_active());
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_single_install_failure_skips_that_entry() {
        let session = DiagnosticSession::new(Config::default());
        let recorder = Arc::new(RecordingInterceptor::failing_on(0x1000));
        session.start(&resolver(true), Box::new(recorder.clone())).unwrap();
        assert!(!session.hooked().contains(&HookId::AcquireCredentialsHandleA));
        assert_eq!(session.hooked().len(), HookId::COUNT - 1);
        assert!(!recorder
            .events()
            .iter()
            .any(|e| matches!(e, InterceptorEvent::Enabled(t) if t.target == 0x1000)));
        session.stop().unwrap();
    }
}
