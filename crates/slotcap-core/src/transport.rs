use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::{json, Value};

use crate::error::{CapacityProviderError, RequestTrace};

/// Accept-header version of the provider wire schema. v0 is the legacy
/// single-window-id contract, v1 the current window-list one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireVersion {
    V0,
    V1,
}

impl WireVersion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V0 => "v0",
            Self::V1 => "v1",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Tag identifying this system in diagnostic logs.
    pub system_tag: &'static str,
    pub accept_media_type: &'static str,
    /// Bounded per-call budget. The upstream core had none; a timeout
    /// surfaces as the same connection error as any other transport failure.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            system_tag: "slotcap",
            accept_media_type: "application/vnd.slotcap+json",
            timeout: Duration::from_secs(10),
        }
    }
}

impl TransportConfig {
    pub fn accept_header(&self, version: WireVersion) -> String {
        format!("{};version={}", self.accept_media_type, version.as_str())
    }
}

/// Parsed provider reply with the HTTP status it arrived under.
///
/// The status travels alongside the body so callers can fail non-2xx
/// replies even when the body carries no locatable error code.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportReply {
    pub status: u16,
    pub body: Value,
}

impl TransportReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportReply, CapacityProviderError>> + Send + 'a>>;

/// Outbound call seam.
///
/// Implementations must never let a raw transport error escape: any failure
/// to obtain a parsable JSON body becomes a Connection-kind error carrying a
/// diagnostic bundle. Non-2xx responses with a parsable body are returned as
/// is so the classifier can map the semantic error.
pub trait Transport: Send + Sync {
    fn post<'a>(
        &'a self,
        url: &'a str,
        payload: &'a Value,
        version: WireVersion,
        trace: &'a RequestTrace,
    ) -> TransportFuture<'a>;
}

/// Production transport on top of `reqwest`.
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(TransportConfig::default())
    }
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn connection_error(
        &self,
        cause: &str,
        url: &str,
        payload: &Value,
        response_text: Option<&str>,
        trace: &RequestTrace,
    ) -> CapacityProviderError {
        tracing::error!(
            system = self.config.system_tag,
            url,
            payload = %payload,
            response = response_text.unwrap_or("<none>"),
            request_id = %trace.request_id,
            "provider transport failure"
        );

        let mut error =
            CapacityProviderError::connection(cause, trace.clone()).with_raw_response(json!({
                "system": self.config.system_tag,
                "url": url,
                "payload": payload,
                "response": response_text,
            }));
        if let Some(text) = response_text {
            error = error.with_message(text.to_owned());
        }
        error
    }
}

impl Transport for HttpTransport {
    fn post<'a>(
        &'a self,
        url: &'a str,
        payload: &'a Value,
        version: WireVersion,
        trace: &'a RequestTrace,
    ) -> TransportFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .header("Content-Type", "application/json")
                .header("Accept", self.config.accept_header(version))
                .timeout(self.config.timeout)
                .json(payload)
                .send()
                .await
                .map_err(|error| {
                    self.connection_error(
                        format!("provider call failed: {error}").as_str(),
                        url,
                        payload,
                        None,
                        trace,
                    )
                })?;

            let status = response.status().as_u16();

            // The provider signals "no content" instead of an empty body.
            if response.status() == reqwest::StatusCode::NO_CONTENT {
                return Ok(TransportReply {
                    status,
                    body: json!({}),
                });
            }

            let text = response.text().await.map_err(|error| {
                self.connection_error(
                    format!("provider response body unreadable: {error}").as_str(),
                    url,
                    payload,
                    None,
                    trace,
                )
            })?;

            if text.trim().is_empty() {
                return Ok(TransportReply {
                    status,
                    body: json!({}),
                });
            }

            let body = serde_json::from_str(&text).map_err(|error| {
                self.connection_error(
                    format!("provider returned a non-JSON body: {error}").as_str(),
                    url,
                    payload,
                    Some(&text),
                    trace,
                )
            })?;

            Ok(TransportReply { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_header_embeds_wire_version() {
        let config = TransportConfig::default();

        assert_eq!(
            config.accept_header(WireVersion::V0),
            "application/vnd.slotcap+json;version=v0"
        );
        assert_eq!(
            config.accept_header(WireVersion::V1),
            "application/vnd.slotcap+json;version=v1"
        );
    }

    #[test]
    fn default_timeout_is_bounded() {
        let config = TransportConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn only_2xx_replies_count_as_success() {
        let reply = |status| TransportReply {
            status,
            body: json!({}),
        };

        assert!(reply(200).is_success());
        assert!(reply(204).is_success());
        assert!(!reply(199).is_success());
        assert!(!reply(302).is_success());
        assert!(!reply(500).is_success());
    }
}
