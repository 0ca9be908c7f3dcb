//! HTTP header name constants.

/// Header set by reverse proxies carrying the original client address chain.
///
/// Only the first (left-most) entry is trusted as the caller's address.
pub const HEADER_X_FORWARDED_FOR: &str = "x-forwarded-for";
