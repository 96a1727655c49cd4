//! Shared fixtures for the slotcap behavior tests.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use slotcap_core::transport::{TransportFuture, TransportReply};
use slotcap_core::{
    AdapterConfig, BusinessUnit, CapacityService, MemoryCache, RequestItem, RequestTrace,
    ServiceRequest, TimeWindowSelector, Transport, WireVersion,
};

/// One recorded provider call.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub payload: Value,
    pub version: WireVersion,
}

/// Transport double replaying scripted replies in call order.
pub struct ScriptedTransport {
    responses: Mutex<Vec<TransportReply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    /// Scripts successful (200) replies.
    pub fn returning(responses: Vec<Value>) -> Self {
        Self::replying(responses.into_iter().map(|body| (200, body)).collect())
    }

    /// Scripts replies with explicit HTTP statuses.
    pub fn replying(responses: Vec<(u16, Value)>) -> Self {
        Self {
            responses: Mutex::new(
                responses
                    .into_iter()
                    .map(|(status, body)| TransportReply { status, body })
                    .collect(),
            ),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

impl Transport for ScriptedTransport {
    fn post<'a>(
        &'a self,
        url: &'a str,
        payload: &'a Value,
        version: WireVersion,
        _trace: &'a RequestTrace,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            self.calls.lock().expect("calls lock").push(RecordedCall {
                url: url.to_owned(),
                payload: payload.clone(),
                version,
            });

            let mut responses = self.responses.lock().expect("responses lock");
            if responses.is_empty() {
                Ok(TransportReply {
                    status: 200,
                    body: json!({}),
                })
            } else {
                Ok(responses.remove(0))
            }
        })
    }
}

/// Service wired to a scripted transport and a fresh in-memory cache.
/// Also installs a per-test log capture so structured warnings show up in
/// failure output.
pub fn service_with(transport: Arc<ScriptedTransport>) -> Arc<CapacityService> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();

    Arc::new(CapacityService::new(
        AdapterConfig::default(),
        transport,
        Arc::new(MemoryCache::new()),
    ))
}

pub fn business_unit() -> BusinessUnit {
    BusinessUnit {
        bu_code: String::from("068"),
        bu_type: String::from("STO"),
    }
}

/// Minimal valid request against the legacy single-window contract.
pub fn service_request(retail_id: &str, service_code: &str) -> ServiceRequest {
    ServiceRequest::new(
        retail_id,
        "12345",
        business_unit(),
        service_code,
        "PCS",
        vec![RequestItem {
            item_no: String::from("40412341"),
            quantity: 1,
        }],
        TimeWindowSelector::WindowId(String::from("tw-1")),
    )
    .expect("fixture request is valid")
}

/// Proposal body carrying one available service line per code.
pub fn proposal_body(service_codes: &[&str]) -> Value {
    let lines: Vec<Value> = service_codes
        .iter()
        .map(|code| {
            json!({
                "serviceNumber": code,
                "serviceProviderId": format!("SP-{code}"),
                "timeWindows": [{
                    "id": format!("tw-{code}"),
                    "fromDateTime": "2026-09-01T08:00:00Z",
                    "toDateTime": "2026-09-01T12:00:00Z"
                }],
                "paymentTypes": [{ "paymentMethod": "PAY_TO_IKEA" }]
            })
        })
        .collect();

    json!({ "proposedServiceTypes": [{ "serviceLines": lines }] })
}

/// Top-level provider error body.
pub fn error_body(error_code: &str, error_message: Option<&str>) -> Value {
    match error_message {
        Some(message) => json!({
            "error": { "errorCode": error_code, "errorMessage": message }
        }),
        None => json!({ "error": { "errorCode": error_code } }),
    }
}
