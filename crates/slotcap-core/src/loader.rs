//! Coalesces concurrent single-service proposal lookups into one provider
//! call.
//!
//! Callers enqueue a service code each; the first lookup of a scheduling turn
//! spawns a flush task that yields once, then drains everything enqueued in
//! the meantime, performs a single fetch for the union of codes and
//! redistributes the per-service results over oneshot channels.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};

use crate::domain::{ProposalByService, ServiceTimeWindowResult};
use crate::error::{CapacityProviderError, RequestTrace};

pub type BatchFuture<'a> = Pin<
    Box<
        dyn Future<Output = Result<(ProposalByService, RequestTrace), CapacityProviderError>>
            + Send
            + 'a,
    >,
>;

/// One provider round trip for a union of service codes.
pub trait BatchProposalFetch: Send + Sync {
    fn fetch(&self, service_codes: Vec<String>) -> BatchFuture<'_>;
}

struct PendingLookup {
    service_code: String,
    sender: oneshot::Sender<Result<ServiceTimeWindowResult, CapacityProviderError>>,
}

struct LoaderInner<F> {
    fetch: F,
    retail_id: String,
    pending: Mutex<Vec<PendingLookup>>,
}

/// Batches concurrent proposal lookups against one market.
pub struct ProposalLoader<F> {
    inner: Arc<LoaderInner<F>>,
}

impl<F> Clone for ProposalLoader<F> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<F: BatchProposalFetch + 'static> ProposalLoader<F> {
    pub fn new(fetch: F, retail_id: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                fetch,
                retail_id: retail_id.into(),
                pending: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Looks up the proposal for one service code, sharing the provider call
    /// with every other lookup enqueued in the same scheduling turn.
    ///
    /// A successful batch that carries no entry for the requested code
    /// resolves to a Capacity-kind error for that caller only.
    pub async fn load(
        &self,
        service_code: impl Into<String>,
    ) -> Result<ServiceTimeWindowResult, CapacityProviderError> {
        let service_code = service_code.into();
        let (sender, receiver) = oneshot::channel();

        let first_in_batch = {
            let mut pending = self.inner.pending.lock().await;
            pending.push(PendingLookup {
                service_code,
                sender,
            });
            pending.len() == 1
        };

        if first_in_batch {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                // One yield lets sibling lookups of the same turn enqueue
                // before the batch is sealed.
                tokio::task::yield_now().await;
                flush(inner).await;
            });
        }

        match receiver.await {
            Ok(result) => result,
            Err(_) => Err(CapacityProviderError::connection(
                "batch flush ended without a result",
                RequestTrace::new("batch-loader", self.inner.retail_id.clone()),
            )),
        }
    }
}

async fn flush<F: BatchProposalFetch>(inner: Arc<LoaderInner<F>>) {
    let pending: Vec<PendingLookup> = std::mem::take(&mut *inner.pending.lock().await);
    if pending.is_empty() {
        return;
    }

    // Union of requested codes, first-seen order, deduplicated under suffix
    // normalization so "X1" and "X1_CFS" share one service line.
    let mut service_codes: Vec<String> = Vec::new();
    for lookup in &pending {
        let normalized = ProposalByService::normalize_key(&lookup.service_code);
        if !service_codes
            .iter()
            .any(|code| ProposalByService::normalize_key(code) == normalized)
        {
            service_codes.push(lookup.service_code.clone());
        }
    }

    tracing::debug!(
        callers = pending.len(),
        services = service_codes.len(),
        "flushing batched proposal lookups"
    );

    match inner.fetch.fetch(service_codes).await {
        Ok((proposal, trace)) => {
            for lookup in pending {
                let result = proposal
                    .get(&lookup.service_code)
                    .cloned()
                    .ok_or_else(|| {
                        CapacityProviderError::capacity(
                            "no proposal returned for the requested service",
                            trace.clone(),
                        )
                        .with_message(lookup.service_code.clone())
                    });
                let _ = lookup.sender.send(result);
            }
        }
        Err(error) => {
            for lookup in pending {
                let _ = lookup.sender.send(Err(error.clone()));
            }
        }
    }
}
