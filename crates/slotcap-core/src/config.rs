use std::time::Duration;

use crate::classify::ClassifierTables;
use crate::endpoint::EndpointConfig;
use crate::locality::LocalityConfig;
use crate::transport::TransportConfig;

/// Immutable adapter configuration, injected at construction.
///
/// All lookup tables live here rather than in module state, so a service
/// instance is fully described by its config.
#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Fixed `userId` literal sent in every request envelope.
    pub user_id: &'static str,
    pub endpoints: EndpointConfig,
    pub locality: LocalityConfig,
    pub transport: TransportConfig,
    pub classifier: ClassifierTables,
    /// Markets where the provider is paid directly by the customer.
    pub pay_to_provider_markets: Vec<&'static str>,
    pub compatibility_cache_ttl: Duration,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            user_id: "SLOTCAP",
            endpoints: EndpointConfig::default(),
            locality: LocalityConfig::default(),
            transport: TransportConfig::default(),
            classifier: ClassifierTables::default(),
            pay_to_provider_markets: vec!["US", "CA"],
            compatibility_cache_ttl: Duration::from_secs(60 * 60),
        }
    }
}

impl AdapterConfig {
    pub fn pays_to_provider(&self, retail_id: &str) -> bool {
        self.pay_to_provider_markets
            .iter()
            .any(|market| market.eq_ignore_ascii_case(retail_id))
    }
}
