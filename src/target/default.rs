//! Default target inference.
//!
//! When a request carries no explicit target, the lookup runs against the
//! caller itself. Signals are tried in a fixed order and the first one that is
//! a literal address wins.

use super::address::{is_public_ip, parse_ip};

/// Ordered rules for inferring a lookup target from connection metadata.
#[derive(Debug, Clone, Copy)]
pub struct DefaultTargetPolicy {
    /// Fall back to the transport source address even when it is not public.
    pub allow_private_source: bool,
}

impl Default for DefaultTargetPolicy {
    fn default() -> Self {
        Self {
            allow_private_source: true,
        }
    }
}

impl DefaultTargetPolicy {
    /// Infers a target, in priority order:
    ///
    /// 1. the caller's public address hint
    /// 2. the transport source address, if public
    /// 3. the caller's declared local address
    /// 4. the transport source address, any class (when allowed)
    ///
    /// Returns `None` when nothing qualifies.
    pub fn infer(&self, source_ip: &str, public_hint: &str, local_ip: &str) -> Option<String> {
        if let Some(hint) = parse_ip(public_hint) {
            return Some(hint.to_string());
        }
        let source = parse_ip(source_ip);
        if let Some(source) = source.filter(|ip| is_public_ip(*ip)) {
            return Some(source.to_string());
        }
        if let Some(local) = parse_ip(local_ip) {
            return Some(local.to_string());
        }
        if self.allow_private_source {
            return source.map(|ip| ip.to_string());
        }
        None
    }
}

/// Infers a target with the default policy (all four rules enabled).
pub fn choose_default_target(source_ip: &str, public_hint: &str, local_ip: &str) -> Option<String> {
    DefaultTargetPolicy::default().infer(source_ip, public_hint, local_ip)
}
