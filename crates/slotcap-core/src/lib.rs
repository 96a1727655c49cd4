//! Core contracts for slotcap.
//!
//! This crate contains:
//! - Canonical request/result models and validation
//! - Locality and endpoint resolution
//! - The provider wire schema, transport seam and error classifier
//! - The adapter service, batch loader and cached compatibility lookup

pub mod classify;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod loader;
pub mod locality;
pub mod normalize;
pub mod service;
pub mod transport;
pub mod wire;

pub use classify::{Classifier, ClassifierTables};
pub use config::AdapterConfig;
pub use domain::{
    AvailableTimeWindow, BusinessUnit, CompatibilityRequest, CompatibleService,
    CompatibleServices, DeliveryTimeWindow, OrderKey, PaymentMethod, PaymentType,
    ProposalByService, ProposalWithAvailability, RequestItem, ServiceRequest,
    ServiceTimeWindowResult, TimeWindowProposal, TimeWindowSelector,
};
pub use endpoint::{EndpointConfig, Operation, UrlBuilder};
pub use error::{CapacityProviderError, ErrorKind, RequestTrace, Severity, ValidationError};
pub use loader::{BatchProposalFetch, ProposalLoader};
pub use locality::{LocalityConfig, LocalityResolver, OrderSource, ResolvedLocality};
pub use service::{CapacityService, ProposalFetch, COMPATIBLE_SERVICES_NAMESPACE};
pub use slotcap_cache::{CacheError, CacheStore, MemoryCache};
pub use transport::{HttpTransport, Transport, TransportConfig, TransportReply, WireVersion};
pub use wire::ProviderResponse;
