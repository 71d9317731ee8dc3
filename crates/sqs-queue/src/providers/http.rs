//! AWS SQS backend using the HTTP Query API.
//!
//! This module talks to SQS (or an SQS-compatible endpoint such as LocalStack)
//! with plain HTTP calls instead of the AWS SDK, so every request and response
//! can be exercised against a mock HTTP server in tests.
//!
//! ## Wire Format
//!
//! - Requests are `POST`s to the endpoint path with a form-encoded body
//!   carrying `Action`, `Version` and the action parameters
//! - Responses are XML documents (`<ActionResponse><ActionResult>...`)
//! - Failures come back as `<ErrorResponse><Error><Code>/<Message>` with a
//!   non-2xx status
//!
//! ## Authentication
//!
//! Requests are signed with AWS Signature Version 4 using the access key pair
//! (and optional session token) from [`SqsConfig`]. Without credentials every
//! request fails with [`BackendError::Authentication`] before reaching the
//! network.

use crate::backend::{
    GetQueueAttributesRequest, PurgeQueueRequest, QueueAttributes, SendMessageOutput,
    SendMessageRequest, SqsBackend,
};
use crate::config::SqsConfig;
use crate::error::{BackendError, ConfigurationError};
use crate::message::QueueIdentifier;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{Client as HttpClient, Url};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;

const API_VERSION: &str = "2012-11-05";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ============================================================================
// AWS Signature V4 Signing
// ============================================================================

type HmacSha256 = Hmac<Sha256>;

/// AWS Signature Version 4 signer for request authentication
///
/// Implements the AWS Signature V4 signing process:
/// 1. Create canonical request (method, URI, query, headers, payload)
/// 2. Create string to sign (algorithm, timestamp, scope, request hash)
/// 3. Derive signing key (4-level HMAC chain)
/// 4. Calculate signature and build Authorization header
#[derive(Clone)]
struct AwsV4Signer {
    access_key: String,
    secret_key: String,
    session_token: Option<String>,
    region: String,
    service: String,
}

impl AwsV4Signer {
    fn new(
        access_key: String,
        secret_key: String,
        session_token: Option<String>,
        region: String,
    ) -> Self {
        Self {
            access_key,
            secret_key,
            session_token,
            region,
            service: "sqs".to_string(),
        }
    }

    /// Sign a form-encoded request
    ///
    /// Returns the headers to add to the request: `Authorization`,
    /// `x-amz-date` and, for temporary credentials, `x-amz-security-token`.
    fn sign_request(
        &self,
        method: &str,
        host: &str,
        path: &str,
        body: &str,
        timestamp: &DateTime<Utc>,
    ) -> Vec<(String, String)> {
        let date_stamp = timestamp.format("%Y%m%d").to_string();
        let amz_date = timestamp.format("%Y%m%dT%H%M%SZ").to_string();

        // Canonical headers (must be sorted)
        let mut canonical_headers = format!(
            "content-type:{}\nhost:{}\nx-amz-date:{}\n",
            FORM_CONTENT_TYPE, host, amz_date
        );
        let mut signed_headers = "content-type;host;x-amz-date".to_string();
        if let Some(token) = &self.session_token {
            canonical_headers.push_str(&format!("x-amz-security-token:{}\n", token));
            signed_headers.push_str(";x-amz-security-token");
        }

        let payload_hash = format!("{:x}", Sha256::digest(body.as_bytes()));

        // Form requests carry no query string
        let canonical_request = format!(
            "{}\n{}\n\n{}\n{}\n{}",
            method, path, canonical_headers, signed_headers, payload_hash
        );

        let algorithm = "AWS4-HMAC-SHA256";
        let credential_scope = format!(
            "{}/{}/{}/aws4_request",
            date_stamp, self.region, self.service
        );
        let canonical_request_hash = format!("{:x}", Sha256::digest(canonical_request.as_bytes()));

        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            algorithm, amz_date, credential_scope, canonical_request_hash
        );

        let signing_key = self.derive_signing_key(&date_stamp);
        let signature = hex::encode(Self::hmac_sha256(&signing_key, string_to_sign.as_bytes()));

        let authorization_header = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            algorithm, self.access_key, credential_scope, signed_headers, signature
        );

        let mut headers = vec![
            ("Authorization".to_string(), authorization_header),
            ("x-amz-date".to_string(), amz_date),
        ];
        if let Some(token) = &self.session_token {
            headers.push(("x-amz-security-token".to_string(), token.clone()));
        }

        headers
    }

    /// Derive the signing key
    ///
    /// kSecret = "AWS4" + secret_key, then HMAC over date, region, service and
    /// the literal "aws4_request" in turn.
    fn derive_signing_key(&self, date_stamp: &str) -> Vec<u8> {
        let k_secret = format!("AWS4{}", self.secret_key);
        let k_date = Self::hmac_sha256(k_secret.as_bytes(), date_stamp.as_bytes());
        let k_region = Self::hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = Self::hmac_sha256(&k_region, self.service.as_bytes());
        Self::hmac_sha256(&k_service, b"aws4_request")
    }

    fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(data);
        mac.finalize().into_bytes().to_vec()
    }
}

// ============================================================================
// HTTP Backend
// ============================================================================

/// SQS backend speaking the HTTP Query API
///
/// The backend is stateless apart from its HTTP connection pool and can be
/// shared across tasks behind an `Arc`.
pub struct HttpSqsBackend {
    http_client: HttpClient,
    signer: Option<AwsV4Signer>,
    endpoint: String,
    request_url: Url,
    host: String,
}

impl HttpSqsBackend {
    /// Create new HTTP backend
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the HTTP client cannot
    /// be built.
    pub fn new(config: &SqsConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let signer = match (&config.access_key_id, &config.secret_access_key) {
            (Some(access_key), Some(secret_key)) => Some(AwsV4Signer::new(
                access_key.clone(),
                secret_key.clone(),
                config.session_token.clone(),
                config.region.clone(),
            )),
            _ => None,
        };

        let endpoint = config.endpoint_url();
        let request_url = Url::parse(&format!("{}/", endpoint)).map_err(|e| {
            ConfigurationError::Invalid {
                message: format!("Invalid endpoint '{}': {}", endpoint, e),
            }
        })?;

        // Matches the Host header reqwest sends; default ports are omitted
        let host = match (request_url.host_str(), request_url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(ConfigurationError::Invalid {
                    message: format!("Endpoint '{}' has no host", endpoint),
                })
            }
        };

        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(
                config.request_timeout_seconds,
            ))
            .build()
            .map_err(|e| ConfigurationError::Invalid {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http_client,
            signer,
            endpoint,
            request_url,
            host,
        })
    }

    /// Endpoint requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Look up the URL of a queue by name
    ///
    /// The adapter uses its queue identifier verbatim; callers holding only a
    /// queue name resolve it once with this call before building the adapter.
    pub async fn resolve_queue_url(&self, queue_name: &str) -> Result<QueueIdentifier, BackendError> {
        let response = self
            .call("GetQueueUrl", vec![("QueueName", queue_name.to_string())])
            .await?;

        let queue_url = first_element_text(&response, b"QueueUrl")?.ok_or_else(|| {
            BackendError::MalformedResponse("QueueUrl not found in response".to_string())
        })?;

        QueueIdentifier::new(queue_url)
            .map_err(|e| BackendError::MalformedResponse(format!("Invalid queue URL: {}", e)))
    }

    /// Send one signed Query API request and return the response body
    async fn call(
        &self,
        action: &str,
        params: Vec<(&str, String)>,
    ) -> Result<String, BackendError> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| BackendError::Authentication("No credentials configured".to_string()))?;

        let body = encode_form(action, &params);
        let auth_headers = signer.sign_request(
            "POST",
            &self.host,
            self.request_url.path(),
            &body,
            &Utc::now(),
        );

        debug!(action = action, endpoint = %self.endpoint, "Calling SQS");

        let mut request = self
            .http_client
            .post(self.request_url.clone())
            .header(reqwest::header::CONTENT_TYPE, FORM_CONTENT_TYPE);
        for (key, value) in auth_headers {
            request = request.header(key, value);
        }

        let response = request.body(body).send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Network(format!("Request timeout: {}", e))
            } else if e.is_connect() {
                BackendError::Network(format!("Connection failed: {}", e))
            } else {
                BackendError::Network(format!("HTTP request failed: {}", e))
            }
        })?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(parse_error_response(&response_body, status.as_u16()));
        }

        Ok(response_body)
    }
}

impl fmt::Debug for HttpSqsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSqsBackend")
            .field("endpoint", &self.endpoint)
            .field("signed", &self.signer.is_some())
            .finish()
    }
}

#[async_trait]
impl SqsBackend for HttpSqsBackend {
    async fn send_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageOutput, BackendError> {
        let response = self
            .call(
                "SendMessage",
                vec![
                    ("QueueUrl", request.queue_url),
                    ("MessageBody", request.message_body),
                ],
            )
            .await?;

        Ok(SendMessageOutput {
            message_id: first_element_text(&response, b"MessageId")?,
        })
    }

    async fn get_queue_attributes(
        &self,
        request: GetQueueAttributesRequest,
    ) -> Result<QueueAttributes, BackendError> {
        let mut params = vec![("QueueUrl", request.queue_url)];
        let names: Vec<(String, String)> = request
            .attribute_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| (format!("AttributeName.{}", i + 1), name))
            .collect();
        params.extend(names.iter().map(|(k, v)| (k.as_str(), v.clone())));

        let response = self.call("GetQueueAttributes", params).await?;
        parse_get_queue_attributes_response(&response)
    }

    async fn purge_queue(&self, request: PurgeQueueRequest) -> Result<(), BackendError> {
        self.call("PurgeQueue", vec![("QueueUrl", request.queue_url)])
            .await
            .map(|_| ())
    }
}

// ============================================================================
// Wire Helpers
// ============================================================================

/// Build the form body for an action
fn encode_form(action: &str, params: &[(&str, String)]) -> String {
    let mut pairs = vec![
        format!("Action={}", urlencoding::encode(action)),
        format!("Version={}", API_VERSION),
    ];
    pairs.extend(
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v))),
    );
    pairs.join("&")
}

/// Text of the first element with the given name, if present
fn first_element_text(xml: &str, element: &[u8]) -> Result<Option<String>, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut inside = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == element => {
                inside = true;
            }
            Ok(Event::Text(e)) if inside => {
                return e.unescape().map(|s| Some(s.into_owned())).map_err(|e| {
                    BackendError::MalformedResponse(format!("Failed to parse XML: {}", e))
                });
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == element => {
                return Ok(Some(String::new()));
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::MalformedResponse(format!(
                    "XML parsing error: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(None)
}

#[derive(Clone, Copy)]
enum AttributeField {
    Name,
    Value,
}

/// Parse GetQueueAttributes XML response
fn parse_get_queue_attributes_response(xml: &str) -> Result<QueueAttributes, BackendError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut attributes = HashMap::new();
    let mut saw_result = false;
    let mut in_attribute = false;
    let mut field: Option<AttributeField> = None;
    let mut name: Option<String> = None;
    let mut value: Option<String> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"GetQueueAttributesResult" => saw_result = true,
                b"Attribute" => {
                    in_attribute = true;
                    name = None;
                    value = None;
                }
                b"Name" if in_attribute => field = Some(AttributeField::Name),
                b"Value" if in_attribute => field = Some(AttributeField::Value),
                _ => {}
            },
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"GetQueueAttributesResult" => {
                saw_result = true;
            }
            Ok(Event::Text(e)) => {
                if let Some(current) = field {
                    let text = e
                        .unescape()
                        .map_err(|e| {
                            BackendError::MalformedResponse(format!("Failed to parse XML: {}", e))
                        })?
                        .into_owned();
                    match current {
                        AttributeField::Name => name = Some(text),
                        AttributeField::Value => value = Some(text),
                    }
                }
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"Name" | b"Value" => field = None,
                b"Attribute" => {
                    in_attribute = false;
                    if let Some(name) = name.take() {
                        attributes.insert(name, value.take().unwrap_or_default());
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(BackendError::MalformedResponse(format!(
                    "XML parsing error: {}",
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_result {
        return Err(BackendError::MalformedResponse(
            "GetQueueAttributesResult not found in response".to_string(),
        ));
    }

    Ok(QueueAttributes::new(attributes))
}

/// Parse error response from XML
fn parse_error_response(xml: &str, status_code: u16) -> BackendError {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut error_code = None;
    let mut error_message = None;
    let mut in_error = false;
    let mut in_code = false;
    let mut in_message = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"Error" => in_error = true,
                b"Code" if in_error => in_code = true,
                b"Message" if in_error => in_message = true,
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if in_code {
                    error_code = e.unescape().ok().map(|s| s.into_owned());
                    in_code = false;
                } else if in_message {
                    error_message = e.unescape().ok().map(|s| s.into_owned());
                    in_message = false;
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"Error" => {
                in_error = false;
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    let code = error_code.unwrap_or_else(|| "Unknown".to_string());
    let message = error_message.unwrap_or_else(|| format!("HTTP status {}", status_code));

    match code.as_str() {
        "AWS.SimpleQueueService.NonExistentQueue" | "QueueDoesNotExist" => {
            BackendError::QueueNotFound(message)
        }
        "InvalidClientTokenId"
        | "UnrecognizedClientException"
        | "SignatureDoesNotMatch"
        | "MissingAuthenticationToken" => {
            BackendError::Authentication(format!("{}: {}", code, message))
        }
        "AWS.SimpleQueueService.PurgeQueueInProgress" | "RequestThrottled" | "ThrottlingException" => {
            BackendError::Throttled(format!("{}: {}", code, message))
        }
        _ if status_code == 429 => BackendError::Throttled(format!("{}: {}", code, message)),
        _ if status_code == 401 || status_code == 403 => {
            BackendError::Authentication(format!("{}: {}", code, message))
        }
        _ if status_code >= 500 => BackendError::Service(format!("{}: {}", code, message)),
        _ => BackendError::Rejected { code, message },
    }
}
