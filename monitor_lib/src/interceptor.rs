use sspi_shared::{DiagError, Result};
use std::sync::{Arc, Mutex};

/// Everything needed to reverse one redirection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookToken {
    pub target: usize,
    pub replacement: usize,
    /// Callable address that still reaches the original code.
    pub trampoline: usize,
}

/// Redirects entry points to replacements. The trampoline is handed out by
/// `prepare` before the patch goes live so callers can publish it first.
pub trait Interceptor: Send + Sync {
    /// # Safety
    /// `target` must be the start of a function and `replacement` a function
    /// with the identical signature and calling convention.
    unsafe fn prepare(&self, target: usize, replacement: usize) -> Result<HookToken>;

    /// # Safety
    /// The token must come from `prepare` on this interceptor.
    unsafe fn enable(&self, token: &HookToken) -> Result<()>;

    /// # Safety
    /// The token must come from `prepare` on this interceptor.
    unsafe fn disable(&self, token: &HookToken) -> Result<()>;

    /// # Safety
    /// Same contract as `prepare`.
    unsafe fn install(&self, target: usize, replacement: usize) -> Result<HookToken> {
        let token = self.prepare(target, replacement)?;
        self.enable(&token)?;
        Ok(token)
    }

    /// # Safety
    /// Same contract as `disable`.
    unsafe fn uninstall(&self, token: &HookToken) -> Result<()> {
        self.disable(token)
    }
}

/// Lets a caller keep a handle on an interceptor after giving it to a session.
impl<T: Interceptor + ?Sized> Interceptor for Arc<T> {
    unsafe fn prepare(&self, target: usize, replacement: usize) -> Result<HookToken> {
        (**self).prepare(target, replacement)
    }

    unsafe fn enable(&self, token: &HookToken) -> Result<()> {
        (**self).enable(token)
    }

    unsafe fn disable(&self, token: &HookToken) -> Result<()> {
        (**self).disable(token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptorEvent {
    Prepared(HookToken),
    Enabled(HookToken),
    Disabled(HookToken),
}

/// Interceptor that records what it was asked to do without touching any
/// code. Unless an offset is set, its trampolines are the targets themselves.
#[derive(Default)]
pub struct RecordingInterceptor {
    events: Mutex<Vec<InterceptorEvent>>,
    failing_target: Option<usize>,
    failing_disable: Option<usize>,
    trampoline_offset: usize,
}

impl RecordingInterceptor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `prepare` fail for one target address.
    pub fn failing_on(target: usize) -> Self {
        Self {
            failing_target: Some(target),
            ..Self::default()
        }
    }

    /// Makes `disable` fail for one target address.
    pub fn failing_disable_on(target: usize) -> Self {
        Self {
            failing_disable: Some(target),
            ..Self::default()
        }
    }

    /// Trampolines are handed out `offset` bytes past their target.
    pub fn with_trampoline_offset(mut self, offset: usize) -> Self {
        self.trampoline_offset = offset;
        self
    }

    pub fn events(&self) -> Vec<InterceptorEvent> {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Targets currently enabled, in the order they were enabled.
    pub fn enabled_targets(&self) -> Vec<usize> {
        let mut live = Vec::new();
        for event in self.events() {
            match event {
                InterceptorEvent::Enabled(t) => live.push(t.target),
                InterceptorEvent::Disabled(t) => live.retain(|addr| *addr != t.target),
                InterceptorEvent::Prepared(_) => {}
            }
        }
        live
    }

    fn record(&self, event: InterceptorEvent) {
        self.events.lock().unwrap_or_else(|p| p.into_inner()).push(event);
    }
}

impl Interceptor for RecordingInterceptor {
    unsafe fn prepare(&self, target: usize, replacement: usize) -> Result<HookToken> {
        if self.failing_target == Some(target) {
            return Err(DiagError::Hook(format!("refusing to patch 0x{:08x}", target)));
        }
        let token = HookToken {
            target,
            replacement,
            trampoline: target + self.trampoline_offset,
        };
        self.record(InterceptorEvent::Prepared(token));
        Ok(token)
    }

    unsafe fn enable(&self, token: &HookToken) -> Result<()> {
        self.record(InterceptorEvent::Enabled(*token));
        Ok(())
    }

    unsafe fn disable(&self, token: &HookToken) -> Result<()> {
        if self.failing_disable == Some(token.target) {
            return Err(DiagError::Hook(format!("0x{:08x} is still patched", token.target)));
        }
        self.record(InterceptorEvent::Disabled(*token));
        Ok(())
    }
}

#[cfg(windows)]
pub use detour::DetourInterceptor;

#[cfg(windows)]
mod detour {
    use super::{HookToken, Interceptor};
    use retour::RawDetour;
    use sspi_shared::{DiagError, Result};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct PatchedFunction(RawDetour);

    // The patched code is process-wide; the detour only records where.
    unsafe impl Send for PatchedFunction {}

    /// Inline trampoline patching through `retour`.
    #[derive(Default)]
    pub struct DetourInterceptor {
        detours: Mutex<HashMap<usize, PatchedFunction>>,
    }

    impl DetourInterceptor {
        pub fn new() -> Self {
            Self::default()
        }
    }

    impl Interceptor for DetourInterceptor {
        unsafe fn prepare(&self, target: usize, replacement: usize) -> Result<HookToken> {
            let mut detours = self.detours.lock().unwrap_or_else(|p| p.into_inner());
            if detours.contains_key(&target) {
                return Err(DiagError::Hook(format!("0x{:08x} is already hooked", target)));
            }
            let detour = RawDetour::new(target as *const (), replacement as *const ())
                .map_err(|e| DiagError::Hook(e.to_string()))?;
            let trampoline = detour.trampoline() as *const () as usize;
            detours.insert(target, PatchedFunction(detour));
            Ok(HookToken {
                target,
                replacement,
                trampoline,
            })
        }

        unsafe fn enable(&self, token: &HookToken) -> Result<()> {
            let detours = self.detours.lock().unwrap_or_else(|p| p.into_inner());
            let detour = detours
                .get(&token.target)
                .ok_or_else(|| DiagError::Hook(format!("0x{:08x} was never prepared", token.target)))?;
            detour.0.enable().map_err(|e| DiagError::Hook(e.to_string()))
        }

        unsafe fn disable(&self, token: &HookToken) -> Result<()> {
            let mut detours = self.detours.lock().unwrap_or_else(|p| p.into_inner());
            let Some(detour) = detours.get(&token.target) else {
                return Ok(());
            };
            // A detour that failed to disable stays in the map with its
            // trampoline intact.
            detour.0.disable().map_err(|e| DiagError::Hook(e.to_string()))?;
            // Another thread may still be running inside the trampoline, so
            // its memory is never released.
            if let Some(detour) = detours.remove(&token.target) {
                std::mem::forget(detour);
            }
            Ok(())
        }
    }
}
