//! DNS module tests.

use super::*;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

/// Scripted stage that counts how often it was asked.
struct StubSource {
    label: &'static str,
    answer: Result<Vec<IpAddr>, &'static str>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl StubSource {
    fn ok(label: &'static str, ips: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            label,
            answer: Ok(ips.iter().map(|s| s.parse().unwrap()).collect()),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            answer: Err("command failed"),
            delay: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(label: &'static str, ips: &[&str], delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            label,
            answer: Ok(ips.iter().map(|s| s.parse().unwrap()).collect()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AddressSource for StubSource {
    fn label(&self) -> String {
        self.label.to_string()
    }

    async fn resolve(&self, _domain: &str) -> Result<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.answer.clone().map_err(|e| anyhow!(e))
    }
}

fn resolver(
    primary: &Arc<StubSource>,
    fallbacks: &[&Arc<StubSource>],
    timeout: Duration,
) -> DomainResolver {
    DomainResolver::new(
        primary.clone(),
        fallbacks
            .iter()
            .map(|s| Arc::clone(*s) as Arc<dyn AddressSource>)
            .collect(),
        timeout,
    )
}

fn strings(result: &ResolutionResult) -> Vec<String> {
    result.to_strings()
}

#[tokio::test]
async fn test_public_primary_result_skips_escalation() {
    let system = StubSource::ok("system", &["93.184.216.34", "93.184.216.34"]);
    let first = StubSource::ok("first", &["1.2.3.4"]);
    let second = StubSource::ok("second", &["5.6.7.8"]);

    let result = resolver(&system, &[&first, &second], Duration::from_secs(1))
        .resolve("example.com")
        .await;

    assert_eq!(strings(&result), vec!["93.184.216.34"]);
    assert!(result.has_public());
    assert_eq!(system.calls(), 1);
    assert_eq!(first.calls(), 0, "no escalation when primary is public");
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn test_private_primary_escalates_until_public() {
    let system = StubSource::ok("system", &["10.0.0.5"]);
    let first = StubSource::ok("first", &["10.0.0.5", "142.250.72.14"]);
    let second = StubSource::ok("second", &["5.6.7.8"]);

    let result = resolver(&system, &[&first, &second], Duration::from_secs(1))
        .resolve("split-horizon.example")
        .await;

    assert_eq!(strings(&result), vec!["10.0.0.5", "142.250.72.14"]);
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 0, "stops as soon as a public address appears");
    assert_eq!(result.preferred().unwrap().to_string(), "142.250.72.14");
}

#[tokio::test]
async fn test_failures_are_swallowed_and_escalation_continues() {
    let system = StubSource::failing("system");
    let first = StubSource::failing("first");
    let second = StubSource::ok("second", &["8.8.4.4"]);

    let result = resolver(&system, &[&first, &second], Duration::from_secs(1))
        .resolve("example.org")
        .await;

    assert_eq!(strings(&result), vec!["8.8.4.4"]);
    assert_eq!(system.calls(), 1);
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn test_no_public_address_returns_accumulated_private_ones() {
    let system = StubSource::ok("system", &["192.168.1.2"]);
    let first = StubSource::ok("first", &["192.168.1.2", "10.9.9.9"]);
    let second = StubSource::ok("second", &[]);

    let result = resolver(&system, &[&first, &second], Duration::from_secs(1))
        .resolve("intranet.local")
        .await;

    assert_eq!(strings(&result), vec!["192.168.1.2", "10.9.9.9"]);
    assert!(!result.has_public());
    assert_eq!(second.calls(), 1);
    assert_eq!(result.preferred().unwrap().to_string(), "192.168.1.2");
}

#[tokio::test]
async fn test_everything_empty_yields_empty_result() {
    let system = StubSource::ok("system", &[]);
    let first = StubSource::failing("first");
    let second = StubSource::failing("second");

    let result = resolver(&system, &[&first, &second], Duration::from_secs(1))
        .resolve("does-not-exist.invalid")
        .await;

    assert!(result.is_empty());
    assert_eq!(result.preferred(), None);
}

#[tokio::test]
async fn test_slow_stage_is_abandoned() {
    let system = StubSource::slow("system", &["8.8.8.8"], Duration::from_secs(5));
    let first = StubSource::ok("first", &["1.1.1.1"]);

    let result = resolver(&system, &[&first], Duration::from_millis(50))
        .resolve("slow.example")
        .await;

    assert_eq!(strings(&result), vec!["1.1.1.1"]);
    assert_eq!(first.calls(), 1);
}

#[test]
fn test_resolution_result_never_holds_duplicates() {
    let ips: Vec<IpAddr> = ["1.1.1.1", "10.0.0.1", "1.1.1.1", "10.0.0.1", "::1", "::1"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect();
    let mut result = ResolutionResult::from_addresses(ips.clone());
    result.merge(ips);
    assert_eq!(result.to_strings(), vec!["1.1.1.1", "10.0.0.1", "::1"]);
    assert!(result.has_public());
}

#[test]
fn test_parse_ip_tokens_from_nslookup_output() {
    let output = "Server:\t\t8.8.8.8\nAddress:\t8.8.8.8#53\n\nNon-authoritative answer:\n\
                  Name:\texample.com\nAddress: 93.184.216.34\nName:\texample.com\n\
                  Address: 2606:2800:220:1:248:1893:25c8:1946\n";
    let ips: Vec<String> = parse_ip_tokens(output)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(
        ips,
        vec![
            "8.8.8.8",
            "93.184.216.34",
            "2606:2800:220:1:248:1893:25c8:1946"
        ]
    );
}

#[test]
fn test_parse_ip_tokens_cleans_decorations() {
    let ips: Vec<String> = parse_ip_tokens("[1.2.3.4], (5.6.7.8); 9.9.9.9. 1.2.3.4#53 not-an-ip")
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(ips, vec!["1.2.3.4", "5.6.7.8", "9.9.9.9"]);
}

#[tokio::test]
async fn test_nslookup_source_missing_program_is_an_error() {
    let source = NslookupSource::with_program(
        "8.8.8.8".parse().unwrap(),
        "definitely-not-a-real-nslookup-binary",
    );
    assert!(source.resolve("example.com").await.is_err());
    assert_eq!(source.label(), "nslookup 8.8.8.8");
}

#[cfg(unix)]
#[tokio::test]
async fn test_nslookup_source_drops_queried_server_address() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::TempDir::new().unwrap();
    let program = dir.path().join("fake-nslookup");
    std::fs::write(
        &program,
        "#!/bin/sh\n\
         printf 'Server:\\t\\t%s\\nAddress:\\t%s#53\\n\\nNon-authoritative answer:\\n' \"$2\" \"$2\"\n\
         printf 'Name:\\t%s\\nAddress: 93.184.216.34\\n' \"$1\"\n",
    )
    .unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

    let source = NslookupSource::with_program(
        "8.8.8.8".parse().unwrap(),
        program.to_string_lossy().into_owned(),
    );
    let ips = source.resolve("example.com").await.unwrap();

    assert_eq!(ips, vec!["93.184.216.34".parse::<IpAddr>().unwrap()]);
}

#[tokio::test]
async fn test_system_source_resolves_localhost() {
    let result = SystemSource.resolve("localhost").await;
    let ips = result.expect("localhost should resolve through the system resolver");
    assert!(ips.iter().all(|ip| ip.is_loopback()));
}
