//! Reshapes nested provider payloads into the flat caller-facing schema.
//!
//! All functions here are pure over their inputs; normalizing the same
//! payload twice yields identical output.

use time::OffsetDateTime;

use crate::domain::{
    AvailableTimeWindow, PaymentType, ProposalByService, ServiceTimeWindowResult,
    TimeWindowProposal,
};
use crate::wire::{ProviderResponse, WireServiceLine, WireTimeWindow};

/// Flattens provider/time-window pairs into one list per (provider, window).
///
/// Proposals flagged as overbooked are excluded. Proposals starting before
/// the earliest requested delivery window are an upstream anomaly: they are
/// dropped with a structured warning and the caller receives a reduced but
/// valid result set.
pub fn flatten_time_windows(
    response: &ProviderResponse,
    earliest_requested: Option<OffsetDateTime>,
) -> Vec<AvailableTimeWindow> {
    let mut windows = Vec::new();

    for provider in &response.time_windows_by_provider {
        for proposal in &provider.time_window_proposals {
            if proposal.will_be_overbooked {
                continue;
            }

            if let Some(earliest) = earliest_requested {
                if proposal.from_date_time < earliest {
                    tracing::warn!(
                        service_provider_id = %provider.service_provider_id,
                        window_start = %proposal.from_date_time,
                        requested_start = %earliest,
                        "provider returned a time window before the requested range"
                    );
                    continue;
                }
            }

            windows.push(AvailableTimeWindow {
                service_provider_id: provider.service_provider_id.clone(),
                service_provider_name: provider.service_provider_name.clone(),
                window: to_proposal(proposal),
            });
        }
    }

    windows
}

/// Reduces the provider's service lines into a mapping keyed by service
/// number.
///
/// A line carrying an error becomes an unavailable entry; a line without one
/// becomes an available entry merging provider and window fields. When the
/// same service number appears twice, the first-seen entry wins for all
/// fields except the window list, which accumulates.
pub fn reduce_service_lines(response: &ProviderResponse) -> ProposalByService {
    let mut proposal = ProposalByService::new();

    for service_type in &response.proposed_service_types {
        for line in &service_type.service_lines {
            let Some(service_number) = &line.service_number else {
                tracing::warn!("provider returned a service line without a service number");
                continue;
            };

            if let Some(existing) = proposal.get_mut(service_number) {
                existing
                    .time_windows
                    .extend(line.time_windows.iter().map(to_proposal));
                continue;
            }

            proposal.insert(service_number.clone(), to_result(line));
        }
    }

    proposal
}

fn to_result(line: &WireServiceLine) -> ServiceTimeWindowResult {
    match &line.error {
        Some(error) => ServiceTimeWindowResult::unavailable(
            error.error_code.clone(),
            error.error_message.clone(),
        ),
        None => ServiceTimeWindowResult {
            service_provider_id: line.service_provider_id.clone(),
            service_provider_name: line.service_provider_name.clone(),
            available: true,
            time_windows: line.time_windows.iter().map(to_proposal).collect(),
            payment_types: line
                .payment_types
                .iter()
                .map(|payment| PaymentType {
                    method: crate::domain::PaymentMethod::from_wire(&payment.payment_method),
                    description: payment.description.clone(),
                })
                .collect(),
            reason_code: None,
            reason: None,
        },
    }
}

fn to_proposal(window: &WireTimeWindow) -> TimeWindowProposal {
    TimeWindowProposal {
        id: window.id.clone(),
        from_date_time: window.from_date_time,
        to_date_time: window.to_date_time,
    }
}

/// Filters payment types for a market: with the pay-to-provider flag only
/// pay-to-provider entries survive; otherwise pay-to-IKEA entries win when
/// present; otherwise the list passes through unfiltered.
pub fn filter_payment_types(
    payment_types: Vec<PaymentType>,
    pay_to_provider: bool,
) -> Vec<PaymentType> {
    use crate::domain::PaymentMethod;

    if pay_to_provider {
        return payment_types
            .into_iter()
            .filter(|payment| payment.method == PaymentMethod::PayToProvider)
            .collect();
    }

    if payment_types
        .iter()
        .any(|payment| payment.method == PaymentMethod::PayToIkea)
    {
        return payment_types
            .into_iter()
            .filter(|payment| payment.method == PaymentMethod::PayToIkea)
            .collect();
    }

    payment_types
}
