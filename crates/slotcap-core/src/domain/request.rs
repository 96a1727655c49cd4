use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ValidationError;
use crate::locality::OrderSource;
use crate::transport::WireVersion;

/// One business-unit reference within a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessUnit {
    pub bu_code: String,
    pub bu_type: String,
}

/// Article line shipped with a capacity request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub item_no: String,
    pub quantity: u32,
}

/// Requested delivery window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryTimeWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub from_date_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to_date_time: OffsetDateTime,
}

/// Window selection shape, which also decides the wire version: a single
/// legacy window id speaks v0, a window list speaks v1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeWindowSelector {
    WindowId(String),
    Windows(Vec<DeliveryTimeWindow>),
}

impl TimeWindowSelector {
    pub fn wire_version(&self) -> WireVersion {
        match self {
            Self::WindowId(_) => WireVersion::V0,
            Self::Windows(_) => WireVersion::V1,
        }
    }

    /// Earliest requested window start, used by the normalizer to reject
    /// proposals the caller never asked for.
    pub fn earliest_start(&self) -> Option<OffsetDateTime> {
        match self {
            Self::WindowId(_) => None,
            Self::Windows(windows) => windows.iter().map(|window| window.from_date_time).min(),
        }
    }
}

/// Order reference sent to the provider; the source is derived from the
/// resolved locality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderKey {
    pub order_number: String,
    pub order_number_source: OrderSource,
}

/// Immutable input for one capacity lookup; constructed fresh per call.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceRequest {
    pub retail_id: String,
    pub zip_code: String,
    pub state: Option<String>,
    pub business_unit: BusinessUnit,
    pub service_code: String,
    pub capacity_unit: String,
    pub items: Vec<RequestItem>,
    pub start_date: Option<OffsetDateTime>,
    pub time_windows: TimeWindowSelector,
    pub order_number: Option<String>,
    pub locality: Option<String>,
}

impl ServiceRequest {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        retail_id: impl Into<String>,
        zip_code: impl Into<String>,
        business_unit: BusinessUnit,
        service_code: impl Into<String>,
        capacity_unit: impl Into<String>,
        items: Vec<RequestItem>,
        time_windows: TimeWindowSelector,
    ) -> Result<Self, ValidationError> {
        let retail_id = retail_id.into();
        let zip_code = zip_code.into();
        let service_code = service_code.into();
        let capacity_unit = capacity_unit.into();

        if retail_id.trim().is_empty() {
            return Err(ValidationError::EmptyRetailId);
        }
        if zip_code.trim().is_empty() {
            return Err(ValidationError::EmptyZipCode);
        }
        if service_code.trim().is_empty() {
            return Err(ValidationError::EmptyServiceCode);
        }
        if capacity_unit.trim().is_empty() {
            return Err(ValidationError::EmptyCapacityUnit);
        }
        if matches!(&time_windows, TimeWindowSelector::Windows(windows) if windows.is_empty()) {
            return Err(ValidationError::EmptyTimeWindows);
        }

        Ok(Self {
            retail_id,
            zip_code,
            state: None,
            business_unit,
            service_code,
            capacity_unit,
            items,
            start_date: None,
            time_windows,
            order_number: None,
            locality: None,
        })
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_start_date(mut self, start_date: OffsetDateTime) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_order_number(mut self, order_number: impl Into<String>) -> Self {
        self.order_number = Some(order_number.into());
        self
    }

    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }
}

/// Input for the cached compatible-services lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityRequest {
    pub retail_id: String,
    pub zip_code: Option<String>,
    pub service_type_code: String,
    pub service_product_id: String,
    pub locality: Option<String>,
}

impl CompatibilityRequest {
    pub fn new(
        retail_id: impl Into<String>,
        service_type_code: impl Into<String>,
        service_product_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let retail_id = retail_id.into();
        if retail_id.trim().is_empty() {
            return Err(ValidationError::EmptyRetailId);
        }

        Ok(Self {
            retail_id,
            zip_code: None,
            service_type_code: service_type_code.into(),
            service_product_id: service_product_id.into(),
            locality: None,
        })
    }

    /// Cache key within the compatible-services namespace.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}:{}",
            self.retail_id, self.service_type_code, self.service_product_id
        )
    }
}
