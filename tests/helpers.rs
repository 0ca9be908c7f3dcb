// Shared test helpers for spinning up servers against stub providers.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ip_lookup::config::Protocol;
use ip_lookup::dns::{AddressSource, DomainResolver};
use ip_lookup::initialization::{init_client, init_provider_chain};
use ip_lookup::protocol::{FileLogSink, LogSink, RequestHandler};
use ip_lookup::target::DefaultTargetPolicy;
use ip_lookup::{Config, LookupService, Server};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Resolver stage that answers every name with a fixed address list.
pub struct FixedSource(pub Vec<IpAddr>);

#[async_trait]
impl AddressSource for FixedSource {
    fn label(&self) -> String {
        "fixed".to_string()
    }

    async fn resolve(&self, _domain: &str) -> anyhow::Result<Vec<IpAddr>> {
        Ok(self.0.clone())
    }
}

/// A running server plus everything needed to talk to it and stop it.
pub struct TestServer {
    pub addr: SocketAddr,
    pub log_file: PathBuf,
    _log_dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<anyhow::Result<()>>>,
}

impl TestServer {
    /// Stops the server and waits for it to finish.
    pub async fn stop(mut self) -> Vec<String> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await
                .expect("server task panicked")
                .expect("server returned an error");
        }
        self.log_lines()
    }

    /// Current contents of the request log.
    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.log_file)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

/// Config pointing both providers at `provider_base` with short timeouts.
#[allow(dead_code)] // Used by other test files
pub fn test_config(protocol: Protocol, provider_base: &str) -> Config {
    Config {
        protocol,
        host: "127.0.0.1".to_string(),
        port: Some(0),
        provider_timeout_secs: 1,
        resolver_timeout_secs: 1,
        dns_servers: Vec::new(),
        ipwho_url: format!("{provider_base}/ipwho"),
        ipapi_url: format!("{provider_base}/ipapi"),
        ..Default::default()
    }
}

/// Binds and starts a server whose resolver always answers `resolved`.
#[allow(dead_code)] // Used by other test files
pub async fn start_server(config: Config, resolved: &[&str]) -> TestServer {
    let log_dir = TempDir::new().expect("Failed to create temp directory");
    let log_file = log_dir.path().join("log.txt");
    let config = Config {
        log_file: log_file.clone(),
        ..config
    };

    let sink: Arc<dyn LogSink> =
        Arc::new(FileLogSink::open(&log_file).expect("Failed to open log file"));
    let resolver = DomainResolver::new(
        Arc::new(FixedSource(
            resolved.iter().map(|s| s.parse().unwrap()).collect(),
        )),
        Vec::new(),
        Duration::from_secs(config.resolver_timeout_secs),
    );
    let chain = init_provider_chain(&config, init_client(&config).unwrap());
    let handler = RequestHandler::new(
        config.protocol,
        LookupService::new(resolver, chain),
        DefaultTargetPolicy {
            allow_private_source: config.infer_from_private_source,
        },
        sink,
    );

    let server = Server::bind(&config, handler)
        .await
        .expect("Failed to bind test server");
    let addr = server.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    let task = tokio::spawn(server.run(async move {
        let _ = rx.await;
    }));

    TestServer {
        addr,
        log_file,
        _log_dir: log_dir,
        shutdown: Some(tx),
        task: Some(task),
    }
}

/// Minimal successful ipwho.is body for `ip`.
#[allow(dead_code)] // Used by other test files
pub fn ipwho_success(ip: &str) -> Value {
    json!({
        "ip": ip,
        "success": true,
        "type": "IPv4",
        "continent": "North America",
        "continent_code": "NA",
        "country": "United States",
        "country_code": "US",
        "region": "California",
        "region_code": "CA",
        "city": "Mountain View",
        "latitude": 37.386,
        "longitude": -122.0838,
        "is_eu": false,
        "postal": "94039",
        "calling_code": "1",
        "capital": "Washington D.C.",
        "borders": "CA,MX",
        "flag": {"img": "https://cdn.ipwhois.io/flags/us.svg", "emoji": "🇺🇸"},
        "connection": {"asn": 15169, "org": "Google LLC", "isp": "Google LLC", "domain": "google.com"},
        "timezone": {"id": "America/Los_Angeles", "abbr": "PDT", "is_dst": true, "offset": -25200, "utc": "-07:00", "current_time": "2024-06-01T10:00:00-07:00"}
    })
}

/// Minimal successful ip-api.com body for `ip`.
#[allow(dead_code)] // Used by other test files
pub fn ipapi_success(ip: &str) -> Value {
    json!({
        "status": "success",
        "continent": "North America",
        "continentCode": "NA",
        "country": "United States",
        "countryCode": "US",
        "region": "VA",
        "regionName": "Virginia",
        "city": "Ashburn",
        "zip": "20149",
        "lat": 39.03,
        "lon": -77.5,
        "timezone": "America/New_York",
        "offset": -14400,
        "currency": "USD",
        "isp": "Google LLC",
        "org": "Google Public DNS",
        "as": "AS15169 Google LLC",
        "asname": "GOOGLE",
        "reverse": "dns.google",
        "mobile": false,
        "proxy": false,
        "hosting": true,
        "query": ip
    })
}
