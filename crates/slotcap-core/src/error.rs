use std::fmt::{Display, Formatter};

use serde_json::Value;
use thiserror::Error;

/// Request-shaping errors raised before any provider call is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("retailId cannot be empty")]
    EmptyRetailId,
    #[error("zipCode cannot be empty")]
    EmptyZipCode,
    #[error("serviceCode cannot be empty")]
    EmptyServiceCode,
    #[error("capacityUnit cannot be empty")]
    EmptyCapacityUnit,
    #[error("deliveryTimeWindows cannot be empty when no window id is given")]
    EmptyTimeWindows,
    #[error("invalid order source '{value}'")]
    InvalidOrderSource { value: String },
}

/// Variant tag for the provider-integration error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Connection,
    Bu,
    Capacity,
    ZipCode,
    ServiceCode,
    Locality,
    ServiceProvider,
}

impl ErrorKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Input => "capacity.input_error",
            Self::Connection => "capacity.connection_error",
            Self::Bu => "capacity.bu_error",
            Self::Capacity => "capacity.no_capacity",
            Self::ZipCode => "capacity.zip_code_error",
            Self::ServiceCode => "capacity.service_code_error",
            Self::Locality => "capacity.locality_error",
            Self::ServiceProvider => "capacity.service_provider_error",
        }
    }
}

/// Logging channel for a classified error.
///
/// Business conditions (no capacity, unknown zip code, ...) are expected and
/// log as informational; connection and unmapped errors are operational
/// faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Informational,
    Operational,
}

/// Request identifiers threaded through every classified error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTrace {
    pub request_id: String,
    pub retail_id: String,
}

impl RequestTrace {
    pub fn new(request_id: impl Into<String>, retail_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            retail_id: retail_id.into(),
        }
    }
}

/// Typed error returned by every adapter operation.
///
/// Exactly one of these resolves from any non-2xx or malformed provider
/// response; callers never see a raw transport or serde error past the
/// adapter boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityProviderError {
    kind: ErrorKind,
    status: u16,
    cause: String,
    fields: Vec<&'static str>,
    message: Option<String>,
    raw_response: Option<Value>,
    trace: RequestTrace,
    severity: Severity,
}

impl CapacityProviderError {
    fn new(
        kind: ErrorKind,
        status: u16,
        cause: impl Into<String>,
        fields: Vec<&'static str>,
        trace: RequestTrace,
        severity: Severity,
    ) -> Self {
        Self {
            kind,
            status,
            cause: cause.into(),
            fields,
            message: None,
            raw_response: None,
            trace,
            severity,
        }
    }

    pub fn input(cause: impl Into<String>, fields: Vec<&'static str>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::Input,
            422,
            cause,
            fields,
            trace,
            Severity::Informational,
        )
    }

    pub fn connection(cause: impl Into<String>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::Connection,
            500,
            cause,
            Vec::new(),
            trace,
            Severity::Operational,
        )
    }

    pub fn bu(cause: impl Into<String>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::Bu,
            422,
            cause,
            vec!["businessUnit.buCode", "businessUnit.buType"],
            trace,
            Severity::Operational,
        )
    }

    pub fn capacity(cause: impl Into<String>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::Capacity,
            404,
            cause,
            Vec::new(),
            trace,
            Severity::Informational,
        )
    }

    pub fn zip_code(cause: impl Into<String>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::ZipCode,
            422,
            cause,
            vec!["zipCode"],
            trace,
            Severity::Informational,
        )
    }

    pub fn service_code(cause: impl Into<String>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::ServiceCode,
            422,
            cause,
            vec!["services[].serviceCode"],
            trace,
            Severity::Operational,
        )
    }

    pub fn locality(
        cause: impl Into<String>,
        fields: Vec<&'static str>,
        trace: RequestTrace,
    ) -> Self {
        Self::new(
            ErrorKind::Locality,
            422,
            cause,
            fields,
            trace,
            Severity::Informational,
        )
    }

    pub fn service_provider(cause: impl Into<String>, trace: RequestTrace) -> Self {
        Self::new(
            ErrorKind::ServiceProvider,
            422,
            cause,
            Vec::new(),
            trace,
            Severity::Informational,
        )
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_raw_response(mut self, raw: Value) -> Self {
        self.raw_response = Some(raw);
        self
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    pub fn cause(&self) -> &str {
        &self.cause
    }

    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.raw_response.as_ref()
    }

    pub fn request_id(&self) -> &str {
        &self.trace.request_id
    }

    pub fn retail_id(&self) -> &str {
        &self.trace.retail_id
    }

    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Logs the error on the channel its classification prescribes.
    pub fn emit(&self) {
        match self.severity {
            Severity::Informational => tracing::info!(
                code = self.kind.code(),
                cause = %self.cause,
                request_id = %self.trace.request_id,
                retail_id = %self.trace.retail_id,
                "provider reported a business condition"
            ),
            Severity::Operational => tracing::error!(
                code = self.kind.code(),
                cause = %self.cause,
                request_id = %self.trace.request_id,
                retail_id = %self.trace.retail_id,
                "provider call failed"
            ),
        }
    }
}

impl Display for CapacityProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.cause, self.kind.code())?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for CapacityProviderError {}
