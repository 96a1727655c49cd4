//! Behavior-driven tests for provider error classification
//!
//! These tests verify HOW the adapter maps provider error codes onto its
//! typed error family, end to end through the service facade.

use std::sync::Arc;

use serde_json::json;
use slotcap_core::{ErrorKind, Severity};
use slotcap_tests::{error_body, service_request, service_with, ScriptedTransport};

// =============================================================================
// Classification: code-table matches
// =============================================================================

#[tokio::test]
async fn when_provider_rejects_the_service_code_error_targets_the_service_field() {
    // Given: The provider rejects the requested service code
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "INVALID_SERVICE_CODE",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The error names the service code field and is operational
    assert_eq!(error.kind(), ErrorKind::ServiceCode);
    assert_eq!(error.status(), 422);
    assert_eq!(error.severity(), Severity::Operational);
    assert_eq!(error.fields(), &["services[].serviceCode"]);
}

#[tokio::test]
async fn when_locality_is_undefined_error_lists_the_locality_input_fields() {
    // Given: The provider cannot resolve the locality
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "UNDEFINED_LOCALITY",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: Both locality-determining fields are reported, informationally
    assert_eq!(error.kind(), ErrorKind::Locality);
    assert_eq!(error.severity(), Severity::Informational);
    assert_eq!(error.fields(), &["retailId", "zipCode"]);
}

#[tokio::test]
async fn when_zip_code_is_unknown_error_is_an_informational_input_rejection() {
    // Given: The provider does not serve the zip code
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "UNDEFINED_ZIPCODE",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The zip code field is flagged without an operational alert
    assert_eq!(error.kind(), ErrorKind::ZipCode);
    assert_eq!(error.status(), 422);
    assert_eq!(error.severity(), Severity::Informational);
    assert_eq!(error.fields(), &["zipCode"]);
}

#[tokio::test]
async fn when_originator_is_undefined_error_targets_both_business_unit_fields() {
    // Given: A request for market DE, zip 12345, service X1 in PCS against a
    // provider that does not know the originating business unit
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "UNDEFINED_ORIGINATOR",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: Both business unit fields are reported as an operational fault
    assert_eq!(error.kind(), ErrorKind::Bu);
    assert_eq!(error.status(), 422);
    assert_eq!(error.severity(), Severity::Operational);
    assert_eq!(
        error.fields(),
        &["businessUnit.buCode", "businessUnit.buType"]
    );
}

#[tokio::test]
async fn when_no_capacity_is_available_error_is_an_informational_404() {
    // Given: The provider has no capacity for the requested period
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "NO_CAPACITY_AVAILABLE",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The business condition maps to a not-found, not a fault
    assert_eq!(error.kind(), ErrorKind::Capacity);
    assert_eq!(error.status(), 404);
    assert_eq!(error.severity(), Severity::Informational);
}

#[tokio::test]
async fn when_the_service_provider_is_down_error_is_informational() {
    // Given: The provider reports its downstream partner as unavailable
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "SERVICE_PROVIDER_NOT_AVAILABLE",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The condition is reported without an operational alert
    assert_eq!(error.kind(), ErrorKind::ServiceProvider);
    assert_eq!(error.severity(), Severity::Informational);
}

// =============================================================================
// Classification: message-dependent and fallback behavior
// =============================================================================

#[tokio::test]
async fn when_invalid_request_message_names_a_known_concept_fields_follow_it() {
    // Given: A generic rejection whose message mentions the zip code
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "INVALID_REQUEST",
        Some("The given zip code could not be processed"),
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The keyword decides the affected field and the message template
    assert_eq!(error.kind(), ErrorKind::Input);
    assert_eq!(error.fields(), &["zipCode"]);
    assert_eq!(error.message(), Some("invalid value supplied for zip code"));
}

#[tokio::test]
async fn when_invalid_request_message_is_unrecognized_it_passes_through_verbatim() {
    // Given: A generic rejection with a message naming no known concept
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "INVALID_REQUEST",
        Some("something exotic went wrong"),
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The error stays an input error with the original message
    assert_eq!(error.kind(), ErrorKind::Input);
    assert!(error.fields().is_empty());
    assert_eq!(error.message(), Some("something exotic went wrong"));
}

#[tokio::test]
async fn when_invalid_request_has_no_message_it_falls_back_to_connection() {
    // Given: The generic rejection arrives without any message
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "INVALID_REQUEST",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: Without a message there is nothing to map; the fallback applies
    assert_eq!(error.kind(), ErrorKind::Connection);
    assert_eq!(error.severity(), Severity::Operational);
}

#[tokio::test]
async fn when_code_is_unmapped_fallback_carries_the_diagnostic_bundle() {
    // Given: An error code no table knows about
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "SOMETHING_NEW",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: A connection error carries both the response and the payload
    assert_eq!(error.kind(), ErrorKind::Connection);
    assert_eq!(error.status(), 500);
    let bundle = error.raw_response().expect("diagnostic bundle");
    assert_eq!(
        bundle["response"]["error"]["errorCode"],
        json!("SOMETHING_NEW")
    );
    assert!(bundle["payload"]["getServiceDateProposalRequest"].is_object());
}

#[tokio::test]
async fn when_a_failure_status_carries_no_error_code_the_call_still_fails() {
    // Given: A 500 whose JSON body parses but names no error code
    let transport = Arc::new(ScriptedTransport::replying(vec![(
        500,
        json!({"unexpected": true}),
    )]));
    let service = service_with(transport);

    // When: Availability is requested
    let error = service
        .get_available_time_windows(&service_request("DE", "X1"))
        .await
        .expect_err("failure status must not pass as success");

    // Then: The fallback connection error surfaces with the diagnostics
    assert_eq!(error.kind(), ErrorKind::Connection);
    assert_eq!(error.status(), 500);
    assert_eq!(error.severity(), Severity::Operational);
    assert_eq!(
        error.raw_response().expect("diagnostic bundle")["response"],
        json!({"unexpected": true})
    );
}

#[tokio::test]
async fn when_a_known_connection_code_arrives_the_raw_response_is_attached() {
    // Given: The provider reports an internal failure
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "INTERNAL_ERROR",
        None,
    )]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: Operations get the raw body alongside the typed error
    assert_eq!(error.kind(), ErrorKind::Connection);
    assert_eq!(
        error.raw_response().expect("raw response")["error"]["errorCode"],
        json!("INTERNAL_ERROR")
    );
}

#[tokio::test]
async fn when_the_error_is_nested_in_a_service_line_it_still_classifies() {
    // Given: No top-level error, but an errored service line
    let transport = Arc::new(ScriptedTransport::returning(vec![json!({
        "proposedServiceTypes": [{
            "serviceLines": [
                { "serviceNumber": "X1" },
                { "serviceNumber": "X2", "error": { "errorCode": "UNDEFINED_ZIPCODE" } }
            ]
        }]
    })]));
    let service = service_with(transport);

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The nested code drives the classification
    assert_eq!(error.kind(), ErrorKind::ZipCode);
}

#[tokio::test]
async fn when_an_error_is_classified_the_request_trace_is_preserved() {
    // Given: Any provider error
    let transport = Arc::new(ScriptedTransport::returning(vec![error_body(
        "NO_CAPACITY_AVAILABLE",
        None,
    )]));
    let service = service_with(Arc::clone(&transport));

    // When: A proposal is requested
    let error = service
        .get_service_date_proposal(&service_request("DE", "X1"))
        .await
        .expect_err("classified error");

    // Then: The error carries the market and the message id of the call
    assert_eq!(error.retail_id(), "DE");
    let calls = transport.calls();
    let sent_id = calls[0].payload["getServiceDateProposalRequest"]["messageId"]
        .as_str()
        .expect("message id")
        .to_owned();
    assert_eq!(error.request_id(), sent_id);
}
