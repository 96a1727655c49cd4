//! Ordered, first-match classification of provider error codes.
//!
//! The precedence below is a wire contract: later rules are deliberately
//! unreachable once an earlier, more specific rule matches the same code.

use serde_json::{json, Value};

use crate::error::{CapacityProviderError, RequestTrace};
use crate::wire::ProviderResponse;

/// Sentinel code tables, immutable and injected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierTables {
    pub invalid_service_code: &'static str,
    /// locality error code -> required field list
    pub locality_codes: &'static [(&'static str, &'static [&'static str])],
    pub undefined_zip_code: &'static str,
    pub undefined_business_unit: &'static str,
    /// generic input error code -> affected field list
    pub input_codes: &'static [(&'static str, &'static [&'static str])],
    pub invalid_request: &'static str,
    /// message keyword -> field list, scanned as substring of the message
    pub message_keywords: &'static [(&'static str, &'static [&'static str])],
    pub capacity_codes: &'static [&'static str],
    pub provider_unavailable: &'static str,
    pub connection_codes: &'static [&'static str],
}

impl Default for ClassifierTables {
    fn default() -> Self {
        Self {
            invalid_service_code: "INVALID_SERVICE_CODE",
            locality_codes: &[
                ("UNDEFINED_LOCALITY", &["retailId", "zipCode"]),
                ("LOCALITY_NOT_FOUND", &["zipCode", "state"]),
            ],
            undefined_zip_code: "UNDEFINED_ZIPCODE",
            undefined_business_unit: "UNDEFINED_ORIGINATOR",
            input_codes: &[
                ("MISSING_MANDATORY_FIELD", &["services[]"]),
                ("INVALID_DATE_FORMAT", &["startDate"]),
                ("INVALID_CAPACITY_UNIT", &["services[].capacityUnit"]),
            ],
            invalid_request: "INVALID_REQUEST",
            message_keywords: &[
                ("zip code", &["zipCode"]),
                ("capacity unit", &["services[].capacityUnit"]),
                ("time window", &["deliveryTimeWindows"]),
                ("start date", &["startDate"]),
                ("item", &["services[].items"]),
            ],
            capacity_codes: &["NO_CAPACITY_AVAILABLE", "TIME_WINDOW_NOT_FOUND"],
            provider_unavailable: "SERVICE_PROVIDER_NOT_AVAILABLE",
            connection_codes: &["INTERNAL_ERROR", "TEMPORARY_FAILURE"],
        }
    }
}

/// Everything a rule may look at.
pub struct ClassifyInput<'a> {
    pub code: Option<&'a str>,
    pub message: Option<&'a str>,
    pub raw: &'a Value,
    pub payload: &'a Value,
    pub trace: &'a RequestTrace,
}

type Rule = fn(&ClassifierTables, &ClassifyInput<'_>) -> Option<CapacityProviderError>;

// Fixed evaluation order; first match wins. The unconditional fallback is
// applied after the list.
const RULES: [Rule; 9] = [
    rule_invalid_service_code,
    rule_locality,
    rule_undefined_zip_code,
    rule_undefined_business_unit,
    rule_input_codes,
    rule_invalid_request_message,
    rule_no_capacity,
    rule_provider_unavailable,
    rule_connection_codes,
];

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    tables: ClassifierTables,
}

impl Classifier {
    pub fn new(tables: ClassifierTables) -> Self {
        Self { tables }
    }

    /// Maps a semantically erroneous provider response to exactly one typed
    /// error and logs it on its severity channel.
    pub fn classify(
        &self,
        response: &ProviderResponse,
        raw: &Value,
        payload: &Value,
        trace: &RequestTrace,
    ) -> CapacityProviderError {
        let wire_error = response.find_error();
        let input = ClassifyInput {
            code: wire_error.map(|error| error.error_code.as_str()),
            message: wire_error.and_then(|error| error.error_message.as_deref()),
            raw,
            payload,
            trace,
        };

        let error = RULES
            .iter()
            .find_map(|rule| rule(&self.tables, &input))
            .unwrap_or_else(|| unmapped(&input));
        error.emit();
        error
    }
}

fn rule_invalid_service_code(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input.code.filter(|code| *code == tables.invalid_service_code)?;
    let mut error = CapacityProviderError::service_code(code, input.trace.clone());
    if let Some(message) = input.message {
        error = error.with_message(message.to_owned());
    }
    Some(error)
}

fn rule_locality(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input.code?;
    let (sentinel, fields) = tables
        .locality_codes
        .iter()
        .find(|(sentinel, _)| *sentinel == code)?;
    Some(CapacityProviderError::locality(
        *sentinel,
        fields.to_vec(),
        input.trace.clone(),
    ))
}

fn rule_undefined_zip_code(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input.code.filter(|code| *code == tables.undefined_zip_code)?;
    Some(CapacityProviderError::zip_code(code, input.trace.clone()))
}

fn rule_undefined_business_unit(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input
        .code
        .filter(|code| *code == tables.undefined_business_unit)?;
    Some(CapacityProviderError::bu(code, input.trace.clone()))
}

fn rule_input_codes(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input.code?;
    let (sentinel, fields) = tables
        .input_codes
        .iter()
        .find(|(sentinel, _)| *sentinel == code)?;
    Some(CapacityProviderError::input(
        *sentinel,
        fields.to_vec(),
        input.trace.clone(),
    ))
}

// The generic invalid-request sentinel is only meaningful together with a
// downstream message; without one it falls through to the unmapped handler.
fn rule_invalid_request_message(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input.code.filter(|code| *code == tables.invalid_request)?;
    let message = input.message?;

    let lowered = message.to_ascii_lowercase();
    let matched = tables
        .message_keywords
        .iter()
        .find(|(keyword, _)| lowered.contains(keyword));

    let error = match matched {
        Some((keyword, fields)) => CapacityProviderError::input(
            code,
            fields.to_vec(),
            input.trace.clone(),
        )
        .with_message(format!("invalid value supplied for {keyword}")),
        None => CapacityProviderError::input(code, Vec::new(), input.trace.clone())
            .with_message(message.to_owned()),
    };
    Some(error)
}

fn rule_no_capacity(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input
        .code
        .filter(|code| tables.capacity_codes.contains(code))?;
    Some(
        CapacityProviderError::capacity(code, input.trace.clone())
            .with_message("no delivery capacity or time windows found for the requested period"),
    )
}

fn rule_provider_unavailable(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input
        .code
        .filter(|code| *code == tables.provider_unavailable)?;
    Some(CapacityProviderError::service_provider(
        code,
        input.trace.clone(),
    ))
}

fn rule_connection_codes(
    tables: &ClassifierTables,
    input: &ClassifyInput<'_>,
) -> Option<CapacityProviderError> {
    let code = input
        .code
        .filter(|code| tables.connection_codes.contains(code))?;
    Some(
        CapacityProviderError::connection(code, input.trace.clone())
            .with_raw_response(input.raw.clone()),
    )
}

fn unmapped(input: &ClassifyInput<'_>) -> CapacityProviderError {
    CapacityProviderError::connection(
        "unable to retrieve proper response from provider",
        input.trace.clone(),
    )
    .with_raw_response(json!({
        "response": input.raw,
        "payload": input.payload,
    }))
}
