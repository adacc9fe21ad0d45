use sspi_shared::LibraryKind;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Every entry point the monitor knows how to intercept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookId {
    AcquireCredentialsHandleA,
    InitializeSecurityContextA,
    CompleteAuthToken,
    AcceptSecurityContext,
    QuerySecurityPackageInfoA,
    QueryContextAttributesA,
    CertGetCertificateChain,
    CertNameToStrW,
    CertVerifyCertificateChainPolicy,
    CertFindChainInStore,
    ConnectionGetSvrUser,
    GenClientContext,
    InitSspiPackage,
    InitSession,
    TermSspiPackage,
    TermSession,
}

impl HookId {
    pub const COUNT: usize = 16;

    pub const ALL: [HookId; HookId::COUNT] = [
        HookId::AcquireCredentialsHandleA,
        HookId::InitializeSecurityContextA,
        HookId::CompleteAuthToken,
        HookId::AcceptSecurityContext,
        HookId::QuerySecurityPackageInfoA,
        HookId::QueryContextAttributesA,
        HookId::CertGetCertificateChain,
        HookId::CertNameToStrW,
        HookId::CertVerifyCertificateChainPolicy,
        HookId::CertFindChainInStore,
        HookId::ConnectionGetSvrUser,
        HookId::GenClientContext,
        HookId::InitSspiPackage,
        HookId::InitSession,
        HookId::TermSspiPackage,
        HookId::TermSession,
    ];

    /// Exported symbol name in the owning library.
    pub fn symbol(self) -> &'static str {
        match self {
            HookId::AcquireCredentialsHandleA => "AcquireCredentialsHandleA",
            HookId::InitializeSecurityContextA => "InitializeSecurityContextA",
            HookId::CompleteAuthToken => "CompleteAuthToken",
            HookId::AcceptSecurityContext => "AcceptSecurityContext",
            HookId::QuerySecurityPackageInfoA => "QuerySecurityPackageInfoA",
            HookId::QueryContextAttributesA => "QueryContextAttributesA",
            HookId::CertGetCertificateChain => "CertGetCertificateChain",
            HookId::CertNameToStrW => "CertNameToStrW",
            HookId::CertVerifyCertificateChainPolicy => "CertVerifyCertificateChainPolicy",
            HookId::CertFindChainInStore => "CertFindChainInStore",
            HookId::ConnectionGetSvrUser => "ConnectionGetSvrUser",
            HookId::GenClientContext => "GenClientContext",
            HookId::InitSspiPackage => "InitSSPIPackage",
            HookId::InitSession => "InitSession",
            HookId::TermSspiPackage => "TermSSPIPackage",
            HookId::TermSession => "TermSession",
        }
    }

    pub fn library(self) -> LibraryKind {
        match self {
            HookId::AcquireCredentialsHandleA
            | HookId::InitializeSecurityContextA
            | HookId::CompleteAuthToken
            | HookId::AcceptSecurityContext
            | HookId::QuerySecurityPackageInfoA
            | HookId::QueryContextAttributesA => LibraryKind::Security,
            HookId::CertGetCertificateChain
            | HookId::CertNameToStrW
            | HookId::CertVerifyCertificateChainPolicy
            | HookId::CertFindChainInStore => LibraryKind::Certificate,
            HookId::ConnectionGetSvrUser
            | HookId::GenClientContext
            | HookId::InitSspiPackage
            | HookId::InitSession
            | HookId::TermSspiPackage
            | HookId::TermSession => LibraryKind::NetworkLibrary,
        }
    }
}

/// Current callable address of each intercepted function. Holds the
/// original export after loading and the trampoline while hooked.
pub struct FunctionTable {
    slots: [AtomicUsize; HookId::COUNT],
}

impl FunctionTable {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const EMPTY: AtomicUsize = AtomicUsize::new(0);
        Self {
            slots: [EMPTY; HookId::COUNT],
        }
    }

    pub fn get(&self, id: HookId) -> Option<usize> {
        match self.slots[id as usize].load(Ordering::Acquire) {
            0 => None,
            addr => Some(addr),
        }
    }

    pub fn set(&self, id: HookId, addr: usize) {
        self.slots[id as usize].store(addr, Ordering::Release);
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            slot.store(0, Ordering::Release);
        }
    }

    /// Non-null entries, in `HookId::ALL` order.
    pub fn populated(&self) -> Vec<(HookId, usize)> {
        HookId::ALL
            .iter()
            .filter_map(|id| self.get(*id).map(|addr| (*id, addr)))
            .collect()
    }

    /// Reinterprets the slot as a function pointer of type `F`.
    ///
    /// # Safety
    /// `F` must be the pointer type matching `id`'s real signature.
    pub unsafe fn resolve<F: Copy>(&self, id: HookId) -> Option<F> {
        debug_assert_eq!(std::mem::size_of::<F>(), std::mem::size_of::<usize>());
        self.get(id).map(|addr| std::mem::transmute_copy::<usize, F>(&addr))
    }
}

impl Default for FunctionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    unsafe extern "system" fn answer(x: u32) -> u32 {
        x + 42
    }

    #[test]
    fn test_all_ids_are_indexed_in_order() {
        for (i, id) in HookId::ALL.iter().enumerate() {
            assert_eq!(*id as usize, i);
        }
    }

    #[test]
    fn test_library_grouping() {
        let count = |kind| HookId::ALL.iter().filter(|id| id.library() == kind).count();
        assert_eq!(count(LibraryKind::Security), 6);
        assert_eq!(count(LibraryKind::Certificate), 4);
        assert_eq!(count(LibraryKind::NetworkLibrary), 6);
        assert_eq!(HookId::InitSspiPackage.symbol(), "InitSSPIPackage");
    }

    #[test]
    fn test_set_get_clear() {
        let table = FunctionTable::new();
        assert!(table.get(HookId::CertNameToStrW).is_none());
        table.set(HookId::CertNameToStrW, 0x1000);
        table.set(HookId::TermSession, 0x2000);
        assert_eq!(table.get(HookId::CertNameToStrW), Some(0x1000));
        assert_eq!(
            table.populated(),
            vec![(HookId::CertNameToStrW, 0x1000), (HookId::TermSession, 0x2000)]
        );
        table.clear();
        assert!(table.populated().is_empty());
    }

    #[test]
    fn test_resolve_calls_through() {
        type AnswerFn = unsafe extern "system" fn(u32) -> u32;
        let table = FunctionTable::new();
        table.set(HookId::InitSession, answer as *const () as usize);
        let f = unsafe { table.resolve::<AnswerFn>(HookId::InitSession) }.unwrap();
        assert_eq!(unsafe { f(1) }, 43);
        assert!(unsafe { table.resolve::<AnswerFn>(HookId::TermSession) }.is_none());
    }
}
