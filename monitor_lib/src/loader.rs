use crate::session::DiagnosticSession;
use crate::table::HookId;
use sspi_shared::{DiagError, LibraryKind, LogLevel, Result};
use std::collections::HashMap;

/// A set of exports that live in one library, which may ship under more
/// than one file name.
#[derive(Debug)]
pub struct LibraryGroup {
    pub kind: LibraryKind,
    /// Tried in order; later names are legacy or renamed builds.
    pub names: &'static [&'static str],
    pub required: bool,
}

pub const LIBRARY_GROUPS: &[LibraryGroup] = &[
    LibraryGroup {
        kind: LibraryKind::Security,
        names: &["secur32.dll", "security.dll"],
        required: true,
    },
    LibraryGroup {
        kind: LibraryKind::Certificate,
        names: &["crypt32.dll"],
        required: false,
    },
    LibraryGroup {
        kind: LibraryKind::NetworkLibrary,
        names: &["dbnetlib.dll", "dbmssocn.dll"],
        required: true,
    },
];

/// Finds libraries and their exports.
pub trait ModuleResolver {
    fn load(&self, library: &str) -> Option<usize>;
    fn symbol(&self, module: usize, name: &str) -> Option<usize>;
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Library group and the file name that actually loaded.
    pub loaded: Vec<(LibraryKind, &'static str)>,
    pub missing_optional: Vec<LibraryKind>,
    pub missing_symbols: Vec<HookId>,
    pub resolved: usize,
}

/// Resolves every known entry point into the session's function table.
/// On error the table is left empty.
pub fn load_functions(session: &DiagnosticSession, resolver: &dyn ModuleResolver) -> Result<LoadReport> {
    let table = session.table();
    table.clear();
    let mut report = LoadReport::default();

    for group in LIBRARY_GROUPS {
        let module = group.names.iter().enumerate().find_map(|(i, name)| {
            if i > 0 {
                session.log(
                    LogLevel::Warn,
                    &format!("{} not found, trying {}", group.names[i - 1], name),
                );
            }
            resolver.load(name).map(|handle| (*name, handle))
        });

        let Some((name, handle)) = module else {
            if group.required {
                session.log(
                    LogLevel::Error,
                    &format!("Failed to load the {} library!", group.kind),
                );
                table.clear();
                return Err(DiagError::LibraryLoadFailure { library: group.kind });
            }
            session.log(
                LogLevel::Warn,
                &format!("Optional {} library is not available; its functions will not be logged", group.kind),
            );
            report.missing_optional.push(group.kind);
            continue;
        };
        report.loaded.push((group.kind, name));

        for id in HookId::ALL.iter().filter(|id| id.library() == group.kind) {
            match resolver.symbol(handle, id.symbol()) {
                Some(addr) if addr != 0 => {
                    table.set(*id, addr);
                    report.resolved += 1;
                }
                _ => {
                    session.log(LogLevel::Warn, &format!("Failed to load {}!", id.symbol()));
                    report.missing_symbols.push(*id);
                }
            }
        }
    }

    if report.resolved == 0 {
        return Err(DiagError::FunctionLoadFailure);
    }
    Ok(report)
}

/// Resolver over a fixed set of libraries and addresses.
#[derive(Debug, Default)]
pub struct StaticModuleResolver {
    modules: HashMap<String, usize>,
    symbols: HashMap<(usize, String), usize>,
}

impl StaticModuleResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, library: &str, exports: &[(&str, usize)]) -> Self {
        let handle = self.modules.len() + 1;
        self.modules.insert(library.to_ascii_lowercase(), handle);
        for (name, addr) in exports {
            self.symbols.insert((handle, name.to_string()), *addr);
        }
        self
    }
}

impl ModuleResolver for StaticModuleResolver {
    fn load(&self, library: &str) -> Option<usize> {
        self.modules.get(&library.to_ascii_lowercase()).copied()
    }

    fn symbol(&self, module: usize, name: &str) -> Option<usize> {
        self.symbols.get(&(module, name.to_string())).copied()
    }
}

#[cfg(windows)]
pub use system::SystemModuleResolver;

#[cfg(windows)]
mod system {
    use super::ModuleResolver;
    use std::ffi::CString;
    use windows_sys::Win32::System::LibraryLoader::{GetProcAddress, LoadLibraryA};

    /// LoadLibrary/GetProcAddress against the live process.
    #[derive(Debug, Default)]
    pub struct SystemModuleResolver;

    impl ModuleResolver for SystemModuleResolver {
        fn load(&self, library: &str) -> Option<usize> {
            let name = CString::new(library).ok()?;
            let handle = unsafe { LoadLibraryA(name.as_ptr() as *const u8) };
            (handle != 0).then_some(handle as usize)
        }

        fn symbol(&self, module: usize, name: &str) -> Option<usize> {
            let name = CString::new(name).ok()?;
            unsafe { GetProcAddress(module as isize, name.as_ptr() as *const u8) }
                .map(|addr| addr as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn exports(kind: LibraryKind, base: usize) -> Vec<(&'static str, usize)> {
        HookId::ALL
            .iter()
            .filter(|id| id.library() == kind)
            .enumerate()
            .map(|(i, id)| (id.symbol(), base + i * 0x10))
            .collect()
    }

    fn full_resolver() -> StaticModuleResolver {
        StaticModuleResolver::new()
            .with_module("secur32.dll", &exports(LibraryKind::Security, 0x1000))
            .with_module("crypt32.dll", &exports(LibraryKind::Certificate, 0x2000))
            .with_module("dbnetlib.dll", &exports(LibraryKind::NetworkLibrary, 0x3000))
    }

    #[test]
    fn test_loads_everything() {
        let session = DiagnosticSession::new(Config::default());
        let report = load_functions(&session, &full_resolver()).unwrap();
        assert_eq!(report.resolved, HookId::COUNT);
        assert!(report.missing_optional.is_empty());
        assert_eq!(session.table().get(HookId::AcquireCredentialsHandleA), Some(0x1000));
        assert_eq!(session.table().get(HookId::CertNameToStrW), Some(0x2010));
    }

    #[test]
    fn test_fallback_library_name() {
        let resolver = StaticModuleResolver::new()
            .with_module("security.dll", &exports(LibraryKind::Security, 0x1000))
            .with_module("DBMSSOCN.DLL", &exports(LibraryKind::NetworkLibrary, 0x3000));
        let session = DiagnosticSession::new(Config::default());
        let report = load_functions(&session, &resolver).unwrap();
        assert_eq!(
            report.loaded,
            vec![
                (LibraryKind::Security, "security.dll"),
                (LibraryKind::NetworkLibrary, "dbmssocn.dll"),
            ]
        );
        assert_eq!(report.missing_optional, vec![LibraryKind::Certificate]);
        assert!(session.table().get(HookId::CertVerifyCertificateChainPolicy).is_none());
    }

    #[test]
    fn test_missing_required_library_empties_table() {
        let resolver = StaticModuleResolver::new()
            .with_module("secur32.dll", &exports(LibraryKind::Security, 0x1000))
            .with_module("crypt32.dll", &exports(LibraryKind::Certificate, 0x2000));
        let session = DiagnosticSession::new(Config::default());
        let err = load_functions(&session, &resolver).unwrap_err();
        assert!(matches!(
            err,
            DiagError::LibraryLoadFailure { library: LibraryKind::NetworkLibrary }
        ));
        assert!(session.table().populated().is_empty());
    }

    #[test]
    fn test_missing_symbol_is_skipped() {
        let mut security = exports(LibraryKind::Security, 0x1000);
        security.retain(|(name, _)| *name != "CompleteAuthToken");
        let resolver = StaticModuleResolver::new()
            .with_module("secur32.dll", &security)
            .with_module("dbnetlib.dll", &exports(LibraryKind::NetworkLibrary, 0x3000));
        let session = DiagnosticSession::new(Config::default());
        let report = load_functions(&session, &resolver).unwrap();
        assert_eq!(report.missing_symbols, vec![HookId::CompleteAuthToken]);
        assert_eq!(report.resolved, 11);
        assert!(session.table().get(HookId::CompleteAuthToken).is_none());
        assert!(session.table().get(HookId::QueryContextAttributesA).is_some());
    }

    #[test]
    fn test_no_symbols_at_all_is_a_function_load_failure() {
        let resolver = StaticModuleResolver::new()
            .with_module("secur32.dll", &[])
            .with_module("dbnetlib.dll", &[]);
        let session = DiagnosticSession::new(Config::default());
        assert!(matches!(
            load_functions(&session, &resolver),
            Err(DiagError::FunctionLoadFailure)
        ));
    }
}
