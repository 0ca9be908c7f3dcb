//! External `nslookup` command stage.

use std::net::IpAddr;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;

use super::source::AddressSource;
use crate::target::parse_ip;

static TOKEN_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s,;]+").expect("token separator pattern is valid"));

/// Runs `nslookup <domain> <server>` and scrapes addresses from its output.
#[derive(Debug, Clone)]
pub struct NslookupSource {
    server: IpAddr,
    program: String,
}

impl NslookupSource {
    /// Uses the `nslookup` binary found on `PATH`.
    pub fn new(server: IpAddr) -> Self {
        Self::with_program(server, "nslookup")
    }

    /// Uses a specific command instead of `nslookup`.
    pub fn with_program(server: IpAddr, program: impl Into<String>) -> Self {
        Self {
            server,
            program: program.into(),
        }
    }
}

#[async_trait]
impl AddressSource for NslookupSource {
    fn label(&self) -> String {
        format!("nslookup {}", self.server)
    }

    async fn resolve(&self, domain: &str) -> Result<Vec<IpAddr>> {
        let output = Command::new(&self.program)
            .arg(domain)
            .arg(self.server.to_string())
            .kill_on_drop(true)
            .output()
            .await
            .with_context(|| format!("failed to run {} for {domain}", self.program))?;

        // nslookup exits non-zero on NXDOMAIN but may still print answers; scrape both streams.
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        Ok(parse_ip_tokens(&text)
            .into_iter()
            .filter(|ip| *ip != self.server)
            .collect())
    }
}

/// Extracts unique literal addresses from free-form resolver output.
///
/// Tokens are split on whitespace, commas and semicolons; surrounding
/// brackets/parentheses, `#port` suffixes and a trailing dot are removed.
pub fn parse_ip_tokens(text: &str) -> Vec<IpAddr> {
    let mut found: Vec<IpAddr> = Vec::new();
    for token in TOKEN_SEPARATOR.split(text) {
        let mut cleaned = token
            .trim()
            .trim_matches(|c| matches!(c, '[' | ']' | '(' | ')'));
        if let Some((head, _)) = cleaned.split_once('#') {
            cleaned = head;
        }
        let cleaned = cleaned.strip_suffix('.').unwrap_or(cleaned);
        if let Some(ip) = parse_ip(cleaned) {
            if !found.contains(&ip) {
                found.push(ip);
            }
        }
    }
    found
}
