//! Local host identity

use crate::{EngineError, Result};
use sysinfo::System;
use tracing::debug;

/// Resolve the local hostname once at startup
pub fn local_hostname() -> Result<String> {
    let hostname = System::host_name()
        .ok_or_else(|| EngineError::Hostname("operating system returned no hostname".to_string()))?;

    let hostname = hostname.trim().to_string();
    if !is_usable_hostname(&hostname) {
        return Err(EngineError::Hostname(format!("invalid hostname '{}'", hostname)));
    }

    debug!("Resolved local hostname: {}", hostname);
    Ok(hostname)
}

/// A hostname is usable as a label value when it is non-empty, fits in a DNS
/// name and carries no whitespace or control characters
fn is_usable_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > 253 {
        return false;
    }

    hostname.chars().all(|c| !c.is_whitespace() && !c.is_control())
}
