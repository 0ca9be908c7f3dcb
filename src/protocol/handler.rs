//! Per-request dispatch.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::Level;

use super::log_sink::LogSink;
use super::request::{decode_request, Action, ClientContext, LookupRequest};
use super::response::{RequestContext, RequestSource, Response, ResponseBody};
use crate::config::{Protocol, ERROR_INVALID_PAYLOAD, ERROR_NO_TARGET};
use crate::error_handling::ProtocolError;
use crate::lookup::{LookupFailure, LookupService};
use crate::target::DefaultTargetPolicy;
use crate::timing::TimeGapService;
use crate::utils::sanitize_log_value;

/// Decodes, dispatches, annotates and logs one request at a time.
///
/// Cheap to clone; every transport task holds its own copy.
#[derive(Clone)]
pub struct RequestHandler {
    protocol: Protocol,
    lookup: LookupService,
    policy: DefaultTargetPolicy,
    timing: TimeGapService,
    sink: Arc<dyn LogSink>,
}

impl RequestHandler {
    pub fn new(
        protocol: Protocol,
        lookup: LookupService,
        policy: DefaultTargetPolicy,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            protocol,
            lookup,
            policy,
            timing: TimeGapService,
            sink,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Log sink shared with the transport.
    pub fn sink(&self) -> &Arc<dyn LogSink> {
        &self.sink
    }

    /// Handles raw payload bytes.
    ///
    /// Payloads that are not a non-empty JSON object get an
    /// "Invalid request payload" response. Over HTTP an empty body (or `{}`)
    /// is a lookup with an inferred target.
    pub async fn handle_payload(&self, payload: &[u8], source: &RequestSource) -> Response {
        let decoded = if self.protocol == Protocol::Http && payload.trim_ascii().is_empty() {
            Ok(LookupRequest::default())
        } else {
            match decode_request(payload) {
                Err(ProtocolError::Empty) if self.protocol == Protocol::Http => {
                    Ok(LookupRequest::default())
                }
                other => other,
            }
        };

        match decoded {
            Ok(request) => self.handle_request(request, source).await,
            Err(e) => self.reject(&e, source),
        }
    }

    /// Handles an already-decoded request.
    pub async fn handle_request(&self, request: LookupRequest, source: &RequestSource) -> Response {
        let started = Instant::now();
        let received = Utc::now();
        let context = &request.client_context;

        let (body, target) = match request.action {
            Action::Health => (
                ResponseBody::Health {
                    ok: true,
                    message: format!("ip lookup {} server is running", self.protocol),
                },
                None,
            ),
            Action::Lookup => {
                let target = self.effective_target(&request.target, source, context);
                let outcome = if target.is_empty() {
                    LookupFailure::new(ERROR_NO_TARGET).into()
                } else {
                    self.lookup.lookup_target(&target).await
                };
                (ResponseBody::Lookup(outcome), Some(target))
            }
        };

        let response = Response {
            body,
            timing: self.timing.build(context, received),
            request_context: RequestContext::new(source, context, self.protocol),
        };

        let duration_ms = started.elapsed().as_millis();
        let source_ip = sanitize_log_value(&source.ip);
        let message = match target {
            Some(target) => format!(
                "protocol={} source_ip={source_ip} target={} status={} duration_ms={duration_ms}",
                self.protocol,
                sanitize_log_value(&target),
                response.status_code(),
            ),
            None => format!(
                "protocol={} source_ip={source_ip} action=health status={} duration_ms={duration_ms}",
                self.protocol,
                response.status_code(),
            ),
        };
        self.sink.write(Level::Info, &message);

        response
    }

    /// Explicit target when given, else one inferred from the connection.
    fn effective_target(
        &self,
        explicit: &str,
        source: &RequestSource,
        context: &ClientContext,
    ) -> String {
        let explicit = explicit.trim();
        if !explicit.is_empty() {
            return explicit.to_string();
        }
        self.policy
            .infer(
                &source.ip,
                &context.client_public_ip_hint,
                &context.client_local_ip,
            )
            .unwrap_or_default()
    }

    fn reject(&self, error: &ProtocolError, source: &RequestSource) -> Response {
        self.sink.write(
            Level::Warn,
            &format!(
                "invalid_{}_payload error={}",
                self.protocol,
                sanitize_log_value(&error.to_string())
            ),
        );
        let context = ClientContext::default();
        Response {
            body: ResponseBody::Lookup(LookupFailure::new(ERROR_INVALID_PAYLOAD).into()),
            timing: self.timing.build_now(&context),
            request_context: RequestContext::new(source, &context, self.protocol),
        }
    }
}
