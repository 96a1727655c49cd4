use std::fmt::{Display, Formatter};

/// Logical provider operations exposed by the capacity API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ValidateServiceDateProposal,
    GetAvailableServiceTimeWindows,
    GetServiceDateProposal,
    GetServiceCompatibility,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidateServiceDateProposal => "ValidateServiceDateProposal",
            Self::GetAvailableServiceTimeWindows => "GetAvailableServiceTimeWindows",
            Self::GetServiceDateProposal => "GetServiceDateProposal",
            Self::GetServiceCompatibility => "GetServiceCompatibility",
        }
    }

    /// Wrapper key of the tagged request envelope for this operation.
    pub const fn envelope_tag(self) -> &'static str {
        match self {
            Self::ValidateServiceDateProposal => "validateServiceDateProposalRequest",
            Self::GetAvailableServiceTimeWindows => "getAvailableServiceTimewindowsRequest",
            Self::GetServiceDateProposal => "getServiceDateProposalRequest",
            Self::GetServiceCompatibility => "getServiceCompatibilityRequest",
        }
    }

    pub const fn path_segment(self) -> &'static str {
        match self {
            Self::ValidateServiceDateProposal => "validate-service-date-proposal",
            Self::GetAvailableServiceTimeWindows => "available-service-timewindows",
            Self::GetServiceDateProposal => "service-date-proposal",
            Self::GetServiceCompatibility => "service-compatibility",
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static endpoint configuration for the two provider families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub current_base_url: String,
    pub legacy_base_url: String,
    /// Selects the current endpoint family; the legacy family never carries
    /// a version path segment.
    pub use_current_family: bool,
    pub api_version: &'static str,
    /// Region whose URLs never carry a version segment, regardless of
    /// operation.
    pub unversioned_region: &'static str,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            current_base_url: String::from("https://capacity.slotcap.net/capacity"),
            legacy_base_url: String::from("https://legacy.slotcap.net/capacity"),
            use_current_family: true,
            api_version: "v1",
            unversioned_region: "RU",
        }
    }
}

/// Selects the provider endpoint and API version for an operation.
/// Pure function of inputs plus static configuration.
#[derive(Debug, Clone, Default)]
pub struct UrlBuilder {
    config: EndpointConfig,
}

impl UrlBuilder {
    pub fn new(config: EndpointConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, operation: Operation, retail_id: &str) -> String {
        let base = if self.config.use_current_family {
            &self.config.current_base_url
        } else {
            &self.config.legacy_base_url
        };

        if self.versioned(operation, retail_id) {
            format!(
                "{base}/{version}/{segment}",
                version = self.config.api_version,
                segment = operation.path_segment()
            )
        } else {
            format!("{base}/{segment}", segment = operation.path_segment())
        }
    }

    // Compatibility checks are unversioned on the current family, and the
    // unversioned region never gets a version segment.
    fn versioned(&self, operation: Operation, retail_id: &str) -> bool {
        self.config.use_current_family
            && operation != Operation::GetServiceCompatibility
            && !retail_id.eq_ignore_ascii_case(self.config.unversioned_region)
    }
}
