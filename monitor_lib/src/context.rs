use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Facts picked up during a handshake that later calls use to enrich the
/// log. Nothing here is ever cleared; values from an earlier attempt may
/// still be visible while a new one is in progress.
#[derive(Debug, Default)]
pub struct DiagnosticContext {
    target_name: RwLock<String>,
    server: RwLock<ServerNames>,
}

/// Server as configured by the host and the FQDN it resolved to. Always
/// replaced as a pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerNames {
    pub server: String,
    pub fqdn: String,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl DiagnosticContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Target name most recently passed to InitializeSecurityContext.
    pub fn set_target_name(&self, name: &str) {
        let mut target = write(&self.target_name);
        target.clear();
        target.push_str(name);
    }

    pub fn target_name(&self) -> String {
        read(&self.target_name).clone()
    }

    /// Written by the environment-discovery side after name resolution.
    pub fn set_server_name(&self, server: &str, fqdn: &str) {
        *write(&self.server) = ServerNames {
            server: server.to_string(),
            fqdn: fqdn.to_string(),
        };
    }

    /// Both names from the same update.
    pub fn server_names(&self) -> ServerNames {
        read(&self.server).clone()
    }

    pub fn server_name(&self) -> String {
        read(&self.server).server.clone()
    }

    pub fn resolved_fqdn(&self) -> String {
        read(&self.server).fqdn.clone()
    }

    /// Host the server certificate is expected to name: the resolved FQDN,
    /// else the host part of the saved SPN. The short server alias is only
    /// logged, never matched.
    pub fn expected_host(&self) -> Option<String> {
        let fqdn = self.resolved_fqdn();
        if !fqdn.is_empty() {
            return Some(fqdn);
        }
        let target = self.target_name();
        let host = host_from_spn(&target);
        (!host.is_empty()).then(|| host.to_string())
    }
}

/// `MSSQLSvc/host.domain:1433` -> `host.domain`. Plain host names pass
/// through unchanged.
pub fn host_from_spn(spn: &str) -> &str {
    let without_class = spn.split_once('/').map_or(spn, |(_, rest)| rest);
    let without_port = without_class.split_once(':').map_or(without_class, |(host, _)| host);
    without_port.trim()
}

/// Case-insensitive substring check of the expected host in a formatted
/// certificate subject.
pub fn subject_names_host(subject: &str, host: &str) -> bool {
    subject.to_uppercase().contains(&host.to_uppercase())
}
