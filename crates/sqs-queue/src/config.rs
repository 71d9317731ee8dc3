//! Backend connection settings.

use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

/// Settings for connecting to an SQS-compatible endpoint
///
/// Loading these settings (files, environment) is left to the embedding
/// application; this type only carries and validates them.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SqsConfig {
    /// AWS region used for the default endpoint and request signing
    pub region: String,

    /// Endpoint override, e.g. `http://localhost:4566` for LocalStack
    pub endpoint: Option<String>,

    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials
    pub session_token: Option<String>,

    /// Per-request timeout enforced by the HTTP client
    pub request_timeout_seconds: u64,
}

impl SqsConfig {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.region.trim().is_empty() {
            return Err(ConfigurationError::Missing {
                key: "region".to_string(),
            });
        }

        if self.request_timeout_seconds == 0 {
            return Err(ConfigurationError::Invalid {
                message: "request_timeout_seconds must be greater than zero".to_string(),
            });
        }

        match (&self.access_key_id, &self.secret_access_key) {
            (Some(_), None) => {
                return Err(ConfigurationError::Missing {
                    key: "secret_access_key".to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(ConfigurationError::Missing {
                    key: "access_key_id".to_string(),
                })
            }
            _ => {}
        }

        if let Some(endpoint) = &self.endpoint {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(ConfigurationError::Invalid {
                    message: format!("endpoint '{}' must start with http:// or https://", endpoint),
                });
            }
        }

        Ok(())
    }

    /// Endpoint requests are sent to
    pub fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://sqs.{}.amazonaws.com", self.region),
        }
    }
}

impl Default for SqsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            request_timeout_seconds: 30,
        }
    }
}

impl std::fmt::Debug for SqsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqsConfig")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
