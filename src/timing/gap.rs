//! Client send time parsing and gap computation.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::config::TIMING_NOTE;
use crate::protocol::ClientContext;
use crate::utils::lenient::parse_integer;

/// Timing block attached to every response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingPayload {
    /// Client send time in UTC, or `""` when the client gave nothing usable
    pub client_sent_at_utc: String,
    pub server_received_at_utc: String,
    pub client_sent_epoch_ms: Option<i64>,
    pub server_received_epoch_ms: i64,
    /// `server - client`; `null` iff the client send time is unknown
    pub gap_ms: Option<i64>,
    pub gap_seconds: Option<f64>,
    pub client_timezone_name: String,
    pub client_utc_offset_minutes: Option<i64>,
    /// `true` only when the client clock is ahead of the server's
    pub clock_skew_detected: bool,
    pub note: String,
}

/// Builds [`TimingPayload`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeGapService;

impl TimeGapService {
    /// Timing block for a request received at `server_received`.
    pub fn build(&self, context: &ClientContext, server_received: DateTime<Utc>) -> TimingPayload {
        let server_ms = server_received.timestamp_millis();
        let client_sent = parse_client_sent(context);
        let client_ms = client_sent.map(|t| t.timestamp_millis());
        let gap_ms = client_ms.map(|client| server_ms - client);

        TimingPayload {
            client_sent_at_utc: client_sent.map(format_utc).unwrap_or_default(),
            server_received_at_utc: format_utc(server_received),
            client_sent_epoch_ms: client_ms,
            server_received_epoch_ms: server_ms,
            gap_ms,
            gap_seconds: gap_ms.map(|gap| round_micros(gap as f64 / 1000.0)),
            client_timezone_name: context.client_timezone_name.clone(),
            client_utc_offset_minutes: parse_integer(&context.client_utc_offset_minutes),
            clock_skew_detected: gap_ms.is_some_and(|gap| gap < 0),
            note: TIMING_NOTE.to_string(),
        }
    }

    /// Timing block for a request received now.
    pub fn build_now(&self, context: &ClientContext) -> TimingPayload {
        self.build(context, Utc::now())
    }
}

/// Best-effort client send time.
///
/// Sources in order: epoch milliseconds, UTC ISO-8601, local ISO-8601. An
/// ISO value without an offset is read in the client's declared UTC offset,
/// or as UTC when none was given. Unparseable sources are skipped.
pub fn parse_client_sent(context: &ClientContext) -> Option<DateTime<Utc>> {
    if let Some(ms) = parse_integer(&context.client_sent_epoch_ms) {
        if let Some(parsed) = DateTime::from_timestamp_millis(ms) {
            return Some(parsed);
        }
    }

    let offset_minutes = parse_integer(&context.client_utc_offset_minutes);
    [
        &context.client_sent_at_utc_iso,
        &context.client_sent_at_local_iso,
    ]
    .into_iter()
    .find_map(|value| parse_iso(value, offset_minutes))
}

fn parse_iso(value: &str, offset_minutes: Option<i64>) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }

    let naive = parse_naive(trimmed)?;
    match offset_minutes {
        Some(minutes) => {
            let seconds = i32::try_from(minutes.checked_mul(60)?).ok()?;
            FixedOffset::east_opt(seconds)?
                .from_local_datetime(&naive)
                .single()
                .map(|t| t.with_timezone(&Utc))
        }
        None => Some(naive.and_utc()),
    }
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn format_utc(time: DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, false)
}

fn round_micros(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
