use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Candidate delivery/service slot offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindowProposal {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub from_date_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub to_date_time: OffsetDateTime,
}

/// Payment options a provider accepts for a service line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    PayToProvider,
    PayToIkea,
    Other(String),
}

impl PaymentMethod {
    pub fn from_wire(code: &str) -> Self {
        match code {
            "PAY_TO_SERVICE_PROVIDER" => Self::PayToProvider,
            "PAY_TO_IKEA" => Self::PayToIkea,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_wire(&self) -> &str {
        match self {
            Self::PayToProvider => "PAY_TO_SERVICE_PROVIDER",
            Self::PayToIkea => "PAY_TO_IKEA",
            Self::Other(code) => code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentType {
    pub method: PaymentMethod,
    pub description: Option<String>,
}

/// One flattened (provider, time window) pair from the availability lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableTimeWindow {
    pub service_provider_id: String,
    pub service_provider_name: Option<String>,
    pub window: TimeWindowProposal,
}

/// Flat, caller-friendly view of one requested service line.
///
/// `available == false` carries a reason instead of windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceTimeWindowResult {
    pub service_provider_id: Option<String>,
    pub service_provider_name: Option<String>,
    pub available: bool,
    pub time_windows: Vec<TimeWindowProposal>,
    pub payment_types: Vec<PaymentType>,
    pub reason_code: Option<String>,
    pub reason: Option<String>,
}

impl ServiceTimeWindowResult {
    pub fn unavailable(reason_code: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            service_provider_id: None,
            service_provider_name: None,
            available: false,
            time_windows: Vec::new(),
            payment_types: Vec::new(),
            reason_code: Some(reason_code.into()),
            reason,
        }
    }
}

/// Proposal results keyed by service number, preserving first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProposalByService {
    entries: Vec<(String, ServiceTimeWindowResult)>,
}

impl ProposalByService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider service numbers may carry a qualifier suffix after an
    /// underscore; comparisons strip it on both sides.
    pub fn normalize_key(key: &str) -> &str {
        key.split('_').next().unwrap_or(key)
    }

    pub fn get(&self, service_code: &str) -> Option<&ServiceTimeWindowResult> {
        let wanted = Self::normalize_key(service_code);
        self.entries
            .iter()
            .find(|(key, _)| Self::normalize_key(key) == wanted)
            .map(|(_, result)| result)
    }

    pub fn get_mut(&mut self, service_code: &str) -> Option<&mut ServiceTimeWindowResult> {
        let wanted = Self::normalize_key(service_code);
        self.entries
            .iter_mut()
            .find(|(key, _)| Self::normalize_key(key) == wanted)
            .map(|(_, result)| result)
    }

    pub fn insert(&mut self, service_code: impl Into<String>, result: ServiceTimeWindowResult) {
        self.entries.push((service_code.into(), result));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceTimeWindowResult)> {
        self.entries
            .iter()
            .map(|(key, result)| (key.as_str(), result))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ServiceTimeWindowResult)> {
        self.entries
            .iter_mut()
            .map(|(key, result)| (key.as_str(), result))
    }
}

/// Combined proposal + availability view, fetched concurrently.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalWithAvailability {
    pub proposal: ProposalByService,
    pub available_time_windows: Vec<AvailableTimeWindow>,
}

/// One compatible service product for a service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibleService {
    pub service_product_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_product_name: Option<String>,
}

/// Compatibility lookup result, cached by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibleServices {
    pub service_type_code: String,
    pub compatible_services: Vec<CompatibleService>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_method_maps_known_wire_codes() {
        assert_eq!(
            PaymentMethod::from_wire("PAY_TO_SERVICE_PROVIDER"),
            PaymentMethod::PayToProvider
        );
        assert_eq!(
            PaymentMethod::from_wire("PAY_TO_IKEA"),
            PaymentMethod::PayToIkea
        );
        assert_eq!(
            PaymentMethod::from_wire("INVOICE"),
            PaymentMethod::Other(String::from("INVOICE"))
        );
    }

    #[test]
    fn lookup_strips_provider_suffix_on_both_sides() {
        let mut proposal = ProposalByService::new();
        proposal.insert("X1_CFS", ServiceTimeWindowResult::unavailable("NONE", None));

        assert!(proposal.get("X1").is_some());
        assert!(proposal.get("X1_OTHER").is_some());
        assert!(proposal.get("X2").is_none());
    }

    #[test]
    fn iteration_preserves_insertion_order() {
        let mut proposal = ProposalByService::new();
        proposal.insert("B", ServiceTimeWindowResult::unavailable("NONE", None));
        proposal.insert("A", ServiceTimeWindowResult::unavailable("NONE", None));

        let keys: Vec<&str> = proposal.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["B", "A"]);
    }
}
