//! Provider wire schema: the tagged request envelope and the nested
//! response payloads the normalizer and classifier consume.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::domain::{OrderKey, ServiceRequest, TimeWindowSelector};
use crate::endpoint::Operation;
use crate::locality::OrderSource;

/// Wraps an operation body in the provider's tagged envelope, attaching the
/// per-call message id, the fixed user id and the resolved locality.
pub fn envelope(
    operation: Operation,
    message_id: &str,
    user_id: &str,
    locality: &str,
    body: Value,
) -> Value {
    let mut inner = json!({
        "messageId": message_id,
        "userId": user_id,
        "locality": locality,
    });

    if let (Some(inner_map), Value::Object(body_map)) = (inner.as_object_mut(), body) {
        for (key, value) in body_map {
            inner_map.insert(key, value);
        }
    }

    json!({ operation.envelope_tag(): inner })
}

/// Operation body shared by the proposal/validation/availability calls.
/// The service-line list is the union of the requested service codes.
pub fn service_request_body(
    request: &ServiceRequest,
    service_codes: &[String],
    order_source: OrderSource,
) -> Value {
    let services: Vec<Value> = service_codes
        .iter()
        .map(|code| {
            json!({
                "serviceCode": code,
                "capacityUnit": request.capacity_unit,
                "items": request.items,
            })
        })
        .collect();

    let mut body = json!({
        "retailId": request.retail_id,
        "zipCode": request.zip_code,
        "businessUnit": request.business_unit,
        "services": services,
    });

    let map = body
        .as_object_mut()
        .expect("service request body is always an object");

    if let Some(state) = &request.state {
        map.insert(String::from("state"), json!(state));
    }
    if let Some(start_date) = request.start_date {
        map.insert(String::from("startDate"), json!(format_rfc3339(start_date)));
    }
    if let Some(order_number) = &request.order_number {
        map.insert(
            String::from("orderKey"),
            json!(OrderKey {
                order_number: order_number.clone(),
                order_number_source: order_source,
            }),
        );
    }
    match &request.time_windows {
        TimeWindowSelector::WindowId(id) => {
            map.insert(String::from("deliveryTimeWindowId"), json!(id));
        }
        TimeWindowSelector::Windows(windows) => {
            map.insert(String::from("deliveryTimeWindows"), json!(windows));
        }
    }

    body
}

fn format_rfc3339(value: OffsetDateTime) -> String {
    value
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("<unformattable>"))
}

/// Error payload reported by the provider, either at the top level or nested
/// inside a service line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireError {
    pub error_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTimeWindow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub from_date_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to_date_time: OffsetDateTime,
    #[serde(default)]
    pub will_be_overbooked: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WirePaymentType {
    pub payment_method: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One service line of a proposed service type.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireServiceLine {
    #[serde(default)]
    pub service_number: Option<String>,
    #[serde(default)]
    pub error: Option<WireError>,
    #[serde(default)]
    pub service_provider_id: Option<String>,
    #[serde(default)]
    pub service_provider_name: Option<String>,
    #[serde(default)]
    pub time_windows: Vec<WireTimeWindow>,
    #[serde(default)]
    pub payment_types: Vec<WirePaymentType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProposedServiceType {
    #[serde(default)]
    pub service_type_code: Option<String>,
    #[serde(default)]
    pub service_lines: Vec<WireServiceLine>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireProviderTimeWindows {
    pub service_provider_id: String,
    #[serde(default)]
    pub service_provider_name: Option<String>,
    #[serde(default)]
    pub time_window_proposals: Vec<WireTimeWindow>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCompatibleService {
    pub service_product_id: String,
    #[serde(default)]
    pub service_product_name: Option<String>,
}

/// Parsed provider response; the populated sections vary by operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    #[serde(default)]
    pub error: Option<WireError>,
    #[serde(default)]
    pub proposed_service_types: Vec<WireProposedServiceType>,
    #[serde(default)]
    pub time_windows_by_provider: Vec<WireProviderTimeWindows>,
    #[serde(default)]
    pub compatible_services: Vec<WireCompatibleService>,
}

impl ProviderResponse {
    /// Locates the provider error: the top-level `error` wins, otherwise the
    /// first service line of the first proposed service type whose lines
    /// carry an error.
    pub fn find_error(&self) -> Option<&WireError> {
        if let Some(error) = &self.error {
            return Some(error);
        }

        self.proposed_service_types
            .iter()
            .find(|service_type| {
                service_type
                    .service_lines
                    .iter()
                    .any(|line| line.error.is_some())
            })
            .and_then(|service_type| {
                service_type
                    .service_lines
                    .iter()
                    .find_map(|line| line.error.as_ref())
            })
    }
}
