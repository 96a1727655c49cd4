//! Adapter facade: one entry point per provider operation.
//!
//! Every operation resolves the locality, builds the tagged envelope, calls
//! the transport, classifies semantic errors and normalizes the payload. The
//! compatibility lookup additionally reads through the cache.

use std::sync::Arc;

use serde_json::{json, Value};
use uuid::Uuid;

use slotcap_cache::CacheStore;

use crate::classify::Classifier;
use crate::config::AdapterConfig;
use crate::domain::{
    AvailableTimeWindow, CompatibilityRequest, CompatibleService, CompatibleServices,
    ProposalByService, ProposalWithAvailability, ServiceRequest, ServiceTimeWindowResult,
};
use crate::endpoint::{Operation, UrlBuilder};
use crate::error::{CapacityProviderError, RequestTrace};
use crate::loader::{BatchFuture, BatchProposalFetch, ProposalLoader};
use crate::locality::{LocalityResolver, ResolvedLocality};
use crate::normalize::{filter_payment_types, flatten_time_windows, reduce_service_lines};
use crate::transport::{Transport, WireVersion};
use crate::wire::{self, ProviderResponse};

/// Cache namespace for compatibility lookups.
pub const COMPATIBLE_SERVICES_NAMESPACE: &str = "compatible-services";

pub struct CapacityService {
    config: AdapterConfig,
    resolver: LocalityResolver,
    urls: UrlBuilder,
    classifier: Classifier,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheStore>,
}

impl CapacityService {
    pub fn new(
        config: AdapterConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn CacheStore>,
    ) -> Self {
        let resolver = LocalityResolver::new(config.locality.clone());
        let urls = UrlBuilder::new(config.endpoints.clone());
        let classifier = Classifier::new(config.classifier.clone());

        Self {
            config,
            resolver,
            urls,
            classifier,
            transport,
            cache,
        }
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Checks whether the requested windows can still be booked.
    pub async fn validate_service_date_proposal(
        &self,
        request: &ServiceRequest,
    ) -> Result<ProposalByService, CapacityProviderError> {
        let resolved = self.resolve(request);
        let codes = [request.service_code.clone()];
        let body = wire::service_request_body(request, &codes, resolved.order_source);

        let (response, _) = self
            .call(
                Operation::ValidateServiceDateProposal,
                &request.retail_id,
                &resolved.locality,
                request.time_windows.wire_version(),
                body,
            )
            .await?;

        let mut proposal = reduce_service_lines(&response);
        self.apply_payment_policy(&request.retail_id, &mut proposal);
        Ok(proposal)
    }

    /// Lists bookable time windows per provider, flattened to one entry per
    /// (provider, window) pair. Windows starting before the earliest
    /// requested window are dropped.
    pub async fn get_available_time_windows(
        &self,
        request: &ServiceRequest,
    ) -> Result<Vec<AvailableTimeWindow>, CapacityProviderError> {
        let resolved = self.resolve(request);
        let codes = [request.service_code.clone()];
        let body = wire::service_request_body(request, &codes, resolved.order_source);

        let (response, _) = self
            .call(
                Operation::GetAvailableServiceTimeWindows,
                &request.retail_id,
                &resolved.locality,
                request.time_windows.wire_version(),
                body,
            )
            .await?;

        Ok(flatten_time_windows(
            &response,
            request.time_windows.earliest_start(),
        ))
    }

    /// Fetches the proposal for the request's single service code.
    pub async fn get_service_date_proposal(
        &self,
        request: &ServiceRequest,
    ) -> Result<ServiceTimeWindowResult, CapacityProviderError> {
        let codes = [request.service_code.clone()];
        let (proposal, trace) = self.proposals_with_trace(request, &codes).await?;

        proposal
            .get(&request.service_code)
            .cloned()
            .ok_or_else(|| {
                CapacityProviderError::capacity(
                    "no proposal returned for the requested service",
                    trace,
                )
                .with_message(request.service_code.clone())
            })
    }

    /// Fetches proposals for several service codes in one provider call.
    pub async fn get_service_date_proposals(
        &self,
        request: &ServiceRequest,
        service_codes: &[String],
    ) -> Result<ProposalByService, CapacityProviderError> {
        self.proposals_with_trace(request, service_codes)
            .await
            .map(|(proposal, _)| proposal)
    }

    /// Proposal and availability, fetched concurrently. Either failure fails
    /// the combined lookup.
    pub async fn get_proposal_with_availability(
        &self,
        request: &ServiceRequest,
    ) -> Result<ProposalWithAvailability, CapacityProviderError> {
        let codes = [request.service_code.clone()];
        let (proposal, available_time_windows) = tokio::try_join!(
            self.get_service_date_proposals(request, &codes),
            self.get_available_time_windows(request),
        )?;

        Ok(ProposalWithAvailability {
            proposal,
            available_time_windows,
        })
    }

    /// Compatibility lookup with read-through caching. A fresh result is
    /// written back with the configured TTL; cache failures never fail the
    /// call.
    pub async fn get_compatible_services(
        &self,
        request: &CompatibilityRequest,
        force_refresh: bool,
    ) -> Result<CompatibleServices, CapacityProviderError> {
        let key = request.cache_key();

        if !force_refresh {
            if let Some(cached) = self.cached_compatibility(&key).await {
                tracing::debug!(key = %key, "compatible-services cache hit");
                return Ok(cached);
            }
        }

        let resolved = self
            .resolver
            .resolve(&request.retail_id, request.locality.as_deref());

        let mut body = json!({
            "retailId": request.retail_id,
            "serviceTypeCode": request.service_type_code,
            "serviceProductId": request.service_product_id,
        });
        if let Some(zip_code) = &request.zip_code {
            body.as_object_mut()
                .expect("compatibility body is always an object")
                .insert(String::from("zipCode"), json!(zip_code));
        }

        let (response, _) = self
            .call(
                Operation::GetServiceCompatibility,
                &request.retail_id,
                &resolved.locality,
                WireVersion::V1,
                body,
            )
            .await?;

        let result = CompatibleServices {
            service_type_code: request.service_type_code.clone(),
            compatible_services: response
                .compatible_services
                .iter()
                .map(|service| CompatibleService {
                    service_product_id: service.service_product_id.clone(),
                    service_product_name: service.service_product_name.clone(),
                })
                .collect(),
        };

        self.store_compatibility(&key, &result).await;
        Ok(result)
    }

    /// Builds a loader that coalesces concurrent per-service proposal
    /// lookups against `base` into shared provider calls.
    pub fn proposal_loader(self: &Arc<Self>, base: ServiceRequest) -> ProposalLoader<ProposalFetch> {
        let retail_id = base.retail_id.clone();
        ProposalLoader::new(
            ProposalFetch {
                service: Arc::clone(self),
                base,
            },
            retail_id,
        )
    }

    pub(crate) async fn proposals_with_trace(
        &self,
        request: &ServiceRequest,
        service_codes: &[String],
    ) -> Result<(ProposalByService, RequestTrace), CapacityProviderError> {
        let resolved = self.resolve(request);
        let body = wire::service_request_body(request, service_codes, resolved.order_source);

        let (response, trace) = self
            .call(
                Operation::GetServiceDateProposal,
                &request.retail_id,
                &resolved.locality,
                request.time_windows.wire_version(),
                body,
            )
            .await?;

        let mut proposal = reduce_service_lines(&response);
        self.apply_payment_policy(&request.retail_id, &mut proposal);
        Ok((proposal, trace))
    }

    fn resolve(&self, request: &ServiceRequest) -> ResolvedLocality {
        self.resolver
            .resolve(&request.retail_id, request.locality.as_deref())
    }

    fn apply_payment_policy(&self, retail_id: &str, proposal: &mut ProposalByService) {
        let pay_to_provider = self.config.pays_to_provider(retail_id);
        for (_, result) in proposal.iter_mut() {
            let payments = std::mem::take(&mut result.payment_types);
            result.payment_types = filter_payment_types(payments, pay_to_provider);
        }
    }

    /// Sends one enveloped request and returns the parsed response, or the
    /// classified error when the provider reports one.
    async fn call(
        &self,
        operation: Operation,
        retail_id: &str,
        locality: &str,
        version: WireVersion,
        body: Value,
    ) -> Result<(ProviderResponse, RequestTrace), CapacityProviderError> {
        let message_id = Uuid::new_v4().to_string();
        let trace = RequestTrace::new(message_id.clone(), retail_id);
        let url = self.urls.build(operation, retail_id);
        let payload = wire::envelope(operation, &message_id, self.config.user_id, locality, body);

        tracing::debug!(
            operation = %operation,
            url = %url,
            request_id = %trace.request_id,
            "calling capacity provider"
        );

        let reply = self.transport.post(&url, &payload, version, &trace).await?;
        let reply_is_success = reply.is_success();
        let raw = reply.body;

        let response: ProviderResponse = match serde_json::from_value(raw.clone()) {
            Ok(response) => response,
            Err(_) => {
                // A body that parses as JSON but not as the wire schema goes
                // through the classifier's fallback.
                return Err(self.classifier.classify(
                    &ProviderResponse::default(),
                    &raw,
                    &payload,
                    &trace,
                ));
            }
        };

        // A failure status without a locatable error code still fails the
        // call, through the classifier's unmapped fallback.
        if response.find_error().is_some() || !reply_is_success {
            return Err(self.classifier.classify(&response, &raw, &payload, &trace));
        }

        Ok((response, trace))
    }

    async fn cached_compatibility(&self, key: &str) -> Option<CompatibleServices> {
        match self.cache.get(COMPATIBLE_SERVICES_NAMESPACE, key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(cached) => Some(cached),
                Err(error) => {
                    tracing::warn!(
                        key,
                        %error,
                        "dropping unreadable compatible-services cache entry"
                    );
                    None
                }
            },
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(key, %error, "compatible-services cache read failed");
                None
            }
        }
    }

    async fn store_compatibility(&self, key: &str, result: &CompatibleServices) {
        let value = match serde_json::to_value(result) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(key, %error, "compatible-services result not serializable");
                return;
            }
        };

        if let Err(error) = self
            .cache
            .set(
                COMPATIBLE_SERVICES_NAMESPACE,
                key,
                value,
                self.config.compatibility_cache_ttl,
            )
            .await
        {
            tracing::warn!(key, %error, "compatible-services cache write failed");
        }
    }
}

/// Batch fetch seam backed by a shared `CapacityService`.
pub struct ProposalFetch {
    service: Arc<CapacityService>,
    base: ServiceRequest,
}

impl BatchProposalFetch for ProposalFetch {
    fn fetch(&self, service_codes: Vec<String>) -> BatchFuture<'_> {
        Box::pin(async move {
            self.service
                .proposals_with_trace(&self.base, &service_codes)
                .await
        })
    }
}
