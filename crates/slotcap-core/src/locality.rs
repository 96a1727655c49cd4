use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Order-number source systems, derived from locality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSource {
    Isell,
    Mcom,
    Rcom,
    Ccom,
}

impl OrderSource {
    pub const ALL: [Self; 4] = [Self::Isell, Self::Mcom, Self::Rcom, Self::Ccom];

    /// Fallback used when a locality has no mapping. Callers tolerate a
    /// wrong-but-present value rather than an error; see `LocalityResolver`.
    pub const FALLBACK: Self = Self::ALL[0];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Isell => "ISELL",
            Self::Mcom => "MCOM",
            Self::Rcom => "RCOM",
            Self::Ccom => "CCOM",
        }
    }
}

impl Display for OrderSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSource {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ISELL" => Ok(Self::Isell),
            "MCOM" => Ok(Self::Mcom),
            "RCOM" => Ok(Self::Rcom),
            "CCOM" => Ok(Self::Ccom),
            other => Err(ValidationError::InvalidOrderSource {
                value: other.to_owned(),
            }),
        }
    }
}

/// Fixed market and locality tables, injected at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalityConfig {
    /// retail id (market) -> locality code
    pub market_localities: Vec<(&'static str, &'static str)>,
    /// locality code -> order source
    pub locality_sources: Vec<(&'static str, OrderSource)>,
}

impl Default for LocalityConfig {
    fn default() -> Self {
        Self {
            market_localities: vec![
                ("DE", "EU"),
                ("FR", "EU"),
                ("NL", "EU"),
                ("SE", "EU"),
                ("PL", "EU"),
                ("GB", "EU"),
                ("US", "NA"),
                ("CA", "NA"),
                ("RU", "RU"),
                ("CN", "CN"),
                ("AU", "AP"),
                ("JP", "AP"),
            ],
            locality_sources: vec![
                ("EU", OrderSource::Isell),
                ("NA", OrderSource::Mcom),
                ("RU", OrderSource::Rcom),
                ("CN", OrderSource::Ccom),
                ("AP", OrderSource::Isell),
            ],
        }
    }
}

/// Locality and order-source resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocality {
    pub locality: String,
    pub order_source: OrderSource,
}

/// Maps a market identifier to a locality code and an order-source code.
/// Pure lookup, no I/O.
#[derive(Debug, Clone, Default)]
pub struct LocalityResolver {
    config: LocalityConfig,
}

impl LocalityResolver {
    pub fn new(config: LocalityConfig) -> Self {
        Self { config }
    }

    /// Resolves `retail_id` to its locality and order source. An explicit
    /// locality overrides the market table.
    ///
    /// An unmapped locality falls back to `OrderSource::FALLBACK` with a
    /// warning instead of failing. This mirrors the upstream behavior and is
    /// a known anomaly: downstream consumers may receive a wrong-but-present
    /// order source for new markets.
    pub fn resolve(&self, retail_id: &str, explicit_locality: Option<&str>) -> ResolvedLocality {
        let locality = explicit_locality
            .or_else(|| {
                self.config
                    .market_localities
                    .iter()
                    .find(|(market, _)| market.eq_ignore_ascii_case(retail_id))
                    .map(|(_, locality)| *locality)
            })
            .unwrap_or(retail_id)
            .to_ascii_uppercase();

        let order_source = self
            .config
            .locality_sources
            .iter()
            .find(|(candidate, _)| *candidate == locality)
            .map(|(_, source)| *source)
            .unwrap_or_else(|| {
                tracing::warn!(
                    retail_id,
                    locality = %locality,
                    fallback = %OrderSource::FALLBACK,
                    "locality has no order-source mapping, using fallback"
                );
                OrderSource::FALLBACK
            });

        ResolvedLocality {
            locality,
            order_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_mapped_market() {
        let resolver = LocalityResolver::default();
        let resolved = resolver.resolve("DE", None);

        assert_eq!(resolved.locality, "EU");
        assert_eq!(resolved.order_source, OrderSource::Isell);
    }

    #[test]
    fn explicit_locality_overrides_market_table() {
        let resolver = LocalityResolver::default();
        let resolved = resolver.resolve("DE", Some("na"));

        assert_eq!(resolved.locality, "NA");
        assert_eq!(resolved.order_source, OrderSource::Mcom);
    }

    #[test]
    fn unmapped_market_falls_back_to_first_order_source() {
        let resolver = LocalityResolver::default();
        let resolved = resolver.resolve("XX", None);

        assert_eq!(resolved.locality, "XX");
        assert_eq!(resolved.order_source, OrderSource::FALLBACK);
        assert_eq!(resolved.order_source, OrderSource::Isell);
    }

    #[test]
    fn lowercase_retail_id_matches_market_table() {
        let resolver = LocalityResolver::default();
        let resolved = resolver.resolve("us", None);

        assert_eq!(resolved.locality, "NA");
        assert_eq!(resolved.order_source, OrderSource::Mcom);
    }

    #[test]
    fn order_source_round_trips_from_str() {
        for source in OrderSource::ALL {
            assert_eq!(source.as_str().parse::<OrderSource>().ok(), Some(source));
        }
    }
}
