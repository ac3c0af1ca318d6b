//! HTTP clients for the extraction, transformation and reconstruction services.
//!
//! # Responsibilities
//! - POST content and JSON payloads to the configured endpoints
//! - Enforce the per-call timeout
//! - Map transport, status and decode failures to `CollaboratorError`

use async_trait::async_trait;
use std::time::Duration;

use crate::collaborators::types::{
    CollaboratorError, CollaboratorResult, Extraction, ReconstructRequest, TransformRequest,
    TransformResponse,
};
use crate::collaborators::{Reconstructor, StructureExtractor, TextTransformer};
use crate::config::CollaboratorConfig;
use crate::transform::mode::TransformationMode;

const EXTRACTION: &str = "extraction";
const TRANSFORMATION: &str = "transformation";
const RECONSTRUCTION: &str = "reconstruction";

/// reqwest-backed implementation of all three collaborator traits.
#[derive(Clone)]
pub struct HttpCollaborators {
    client: reqwest::Client,
    config: CollaboratorConfig,
}

impl HttpCollaborators {
    pub fn new(config: CollaboratorConfig) -> CollaboratorResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CollaboratorError::Transport {
                service: "client",
                reason: e.to_string(),
            })?;
        Ok(Self { client, config })
    }

    fn map_send_error(&self, service: &'static str, e: reqwest::Error) -> CollaboratorError {
        if e.is_timeout() {
            CollaboratorError::Timeout {
                service,
                secs: self.config.timeout_secs,
            }
        } else {
            CollaboratorError::Transport {
                service,
                reason: e.to_string(),
            }
        }
    }

    fn check_status(
        service: &'static str,
        response: reqwest::Response,
    ) -> CollaboratorResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(CollaboratorError::Status {
                service,
                status: status.as_u16(),
            })
        }
    }
}

#[async_trait]
impl StructureExtractor for HttpCollaborators {
    async fn extract(&self, content: &str) -> CollaboratorResult<Extraction> {
        let response = self
            .client
            .post(&self.config.extraction_url)
            .header(reqwest::header::CONTENT_TYPE, "text/html; charset=utf-8")
            .body(content.to_string())
            .send()
            .await
            .map_err(|e| self.map_send_error(EXTRACTION, e))?;

        Self::check_status(EXTRACTION, response)?
            .json::<Extraction>()
            .await
            .map_err(|e| CollaboratorError::Decode {
                service: EXTRACTION,
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl TextTransformer for HttpCollaborators {
    async fn transform(
        &self,
        mode: TransformationMode,
        request: TransformRequest,
    ) -> CollaboratorResult<TransformResponse> {
        let url = format!(
            "{}{}",
            self.config.transformation_url.trim_end_matches('/'),
            mode.remote_path()
        );
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(TRANSFORMATION, e))?;

        let body = Self::check_status(TRANSFORMATION, response)?
            .json::<TransformResponse>()
            .await
            .map_err(|e| CollaboratorError::Decode {
                service: TRANSFORMATION,
                reason: e.to_string(),
            })?;

        if !body.success {
            return Err(CollaboratorError::Rejected {
                service: TRANSFORMATION,
                reason: body
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            });
        }

        tracing::debug!(
            mode = %mode,
            total = body.total,
            transformed = body.transformed,
            "Fragments transformed"
        );
        Ok(body)
    }
}

#[async_trait]
impl Reconstructor for HttpCollaborators {
    async fn reconstruct(&self, request: ReconstructRequest) -> CollaboratorResult<String> {
        let response = self
            .client
            .post(&self.config.reconstruction_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.map_send_error(RECONSTRUCTION, e))?;

        Self::check_status(RECONSTRUCTION, response)?
            .text()
            .await
            .map_err(|e| CollaboratorError::Decode {
                service: RECONSTRUCTION,
                reason: e.to_string(),
            })
    }
}
