//! Address helpers shared by classification, resolution and inference.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Parses a literal IPv4 or IPv6 address, ignoring surrounding whitespace.
pub fn parse_ip(value: &str) -> Option<IpAddr> {
    value.trim().parse().ok()
}

/// Returns `true` if `value` is a literal IPv4 or IPv6 address.
pub fn is_ip_value(value: &str) -> bool {
    parse_ip(value).is_some()
}

/// Returns `true` if the address is publicly routable.
///
/// Private, loopback, link-local, reserved, documentation, multicast and
/// unspecified ranges are all treated as non-public.
pub fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_ipv4(v4),
        IpAddr::V6(v6) => is_public_ipv6(v6),
    }
}

/// Returns `true` if at least one address in the slice is public.
pub fn contains_public_ip(ips: &[IpAddr]) -> bool {
    ips.iter().any(|ip| is_public_ip(*ip))
}

fn is_public_ipv4(ip: Ipv4Addr) -> bool {
    let o = ip.octets();
    // This-network 0.0.0.0/8
    if o[0] == 0 {
        return false;
    }
    // Private 10.0.0.0/8, 172.16.0.0/12, 192.168.0.0/16
    if ip.is_private() {
        return false;
    }
    // Loopback 127.0.0.0/8
    if ip.is_loopback() {
        return false;
    }
    // Link-local 169.254.0.0/16
    if ip.is_link_local() {
        return false;
    }
    // Shared address space 100.64.0.0/10
    if o[0] == 100 && (o[1] & 0xc0) == 64 {
        return false;
    }
    // IETF protocol assignments 192.0.0.0/24
    if o[0] == 192 && o[1] == 0 && o[2] == 0 {
        return false;
    }
    // Documentation 192.0.2.0/24, 198.51.100.0/24, 203.0.113.0/24
    if ip.is_documentation() {
        return false;
    }
    // Benchmarking 198.18.0.0/15
    if o[0] == 198 && (o[1] & 0xfe) == 18 {
        return false;
    }
    // Multicast 224.0.0.0/4
    if ip.is_multicast() {
        return false;
    }
    // Reserved 240.0.0.0/4 (includes broadcast)
    if o[0] >= 240 {
        return false;
    }
    true
}

fn is_public_ipv6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_public_ipv4(mapped);
    }
    let s = ip.segments();
    // :: unspecified, ::1 loopback
    if ip.is_unspecified() || ip.is_loopback() {
        return false;
    }
    // fc00::/7 unique-local
    if (s[0] & 0xfe00) == 0xfc00 {
        return false;
    }
    // fe80::/10 link-local
    if (s[0] & 0xffc0) == 0xfe80 {
        return false;
    }
    // ff00::/8 multicast
    if ip.is_multicast() {
        return false;
    }
    // 2001:db8::/32 documentation
    if s[0] == 0x2001 && s[1] == 0x0db8 {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(value: &str) -> IpAddr {
        value.parse().unwrap()
    }

    #[test]
    fn test_public_ipv4() {
        assert!(is_public_ip(ip("8.8.8.8")));
        assert!(is_public_ip(ip("1.1.1.1")));
        assert!(is_public_ip(ip("93.184.216.34")));
    }

    #[test]
    fn test_non_public_ipv4() {
        for value in [
            "127.0.0.1",
            "10.0.0.1",
            "172.16.0.1",
            "172.31.255.255",
            "192.168.1.1",
            "169.254.1.1",
            "0.0.0.0",
            "100.64.0.1",
            "198.18.0.1",
            "203.0.113.5",
            "224.0.0.1",
            "240.0.0.1",
            "255.255.255.255",
        ] {
            assert!(!is_public_ip(ip(value)), "{value} should not be public");
        }
    }

    #[test]
    fn test_boundaries_of_private_ranges_are_public() {
        assert!(is_public_ip(ip("172.15.255.255")));
        assert!(is_public_ip(ip("172.32.0.0")));
        assert!(is_public_ip(ip("100.128.0.1")));
        assert!(is_public_ip(ip("11.0.0.1")));
    }

    #[test]
    fn test_ipv6_classes() {
        assert!(is_public_ip(ip("2606:4700:4700::1111")));
        assert!(!is_public_ip(ip("::1")));
        assert!(!is_public_ip(ip("::")));
        assert!(!is_public_ip(ip("fd00::1")));
        assert!(!is_public_ip(ip("fe80::1")));
        assert!(!is_public_ip(ip("ff02::1")));
        assert!(!is_public_ip(ip("2001:db8::1")));
        assert!(!is_public_ip(ip("::ffff:192.168.1.1")));
        assert!(is_public_ip(ip("::ffff:8.8.8.8")));
    }

    #[test]
    fn test_is_ip_value() {
        assert!(is_ip_value("8.8.8.8"));
        assert!(is_ip_value(" 8.8.8.8 "));
        assert!(is_ip_value("2001:4860:4860::8888"));
        assert!(!is_ip_value("example.com"));
        assert!(!is_ip_value("256.1.1.1"));
        assert!(!is_ip_value("1.1.1"));
        assert!(!is_ip_value(""));
    }

    #[test]
    fn test_contains_public_ip() {
        assert!(!contains_public_ip(&[]));
        assert!(!contains_public_ip(&[ip("10.0.0.1"), ip("127.0.0.1")]));
        assert!(contains_public_ip(&[ip("10.0.0.1"), ip("8.8.4.4")]));
    }
}
