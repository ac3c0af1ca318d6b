//! Response finalization.
//!
//! Exactly one branch applies, in priority order:
//!
//! ```text
//! override_response set      → override status / content type / body
//! OPTIONS with CORS enabled  → 204, empty body, CORS headers only
//! otherwise                  → modified or upstream body, upstream status
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::config::CorsConfig;
use crate::error::ServiceError;
use crate::processing::headers::{assemble_headers, cors_headers};
use crate::processing::types::{Modifications, ProcessingResult, ResponseFields};

pub struct ResponseFinalizer {
    cors: CorsConfig,
}

impl ResponseFinalizer {
    pub fn new(cors: CorsConfig) -> Self {
        Self { cors }
    }

    pub fn finalize(
        &self,
        response: &ResponseFields,
        mods: &Modifications,
    ) -> Result<ProcessingResult, ServiceError> {
        if mods.override_response {
            let body = mods.modified_body.clone().unwrap_or_default();
            let content_type = mods
                .override_content_type
                .clone()
                .unwrap_or_else(|| "text/plain".to_string());
            let headers = assemble_headers(
                &response.response_headers,
                &content_type,
                &body,
                &mods.headers_to_add,
                &mods.headers_to_remove,
            )?;
            return Ok(ProcessingResult {
                final_status_code: mods.override_status.unwrap_or(200),
                final_content_type: content_type,
                final_body: body,
                final_headers: headers,
                debug_mode_active: mods.debug_mode,
                content_was_modified: false,
                response_overridden: true,
                processing_error: None,
            });
        }

        if response.request.is_preflight() && self.cors.enabled {
            let additions: BTreeMap<String, String> = cors_headers(&self.cors).into_iter().collect();
            let headers = assemble_headers(&HashMap::new(), "text/plain", "", &additions, &[])?;
            return Ok(ProcessingResult {
                final_status_code: 204,
                final_content_type: "text/plain".to_string(),
                final_body: String::new(),
                final_headers: headers,
                debug_mode_active: false,
                content_was_modified: false,
                response_overridden: false,
                processing_error: None,
            });
        }

        let body = mods
            .modified_body
            .clone()
            .unwrap_or_else(|| response.body().to_string());
        let content_type = response.content_type().unwrap_or("text/plain").to_string();
        let headers = assemble_headers(
            &response.response_headers,
            &content_type,
            &body,
            &mods.headers_to_add,
            &mods.headers_to_remove,
        )?;
        // A queued content-type addition wins over the upstream one.
        let final_content_type = headers
            .get("content-type")
            .cloned()
            .unwrap_or(content_type);

        Ok(ProcessingResult {
            final_status_code: response.status_code.unwrap_or(200),
            final_content_type,
            final_body: body,
            final_headers: headers,
            debug_mode_active: mods.debug_mode,
            content_was_modified: mods.modified_body.is_some(),
            response_overridden: false,
            processing_error: None,
        })
    }

    /// Like `finalize`, but any failure becomes the fixed 500 result.
    pub fn finalize_or_error(&self, response: &ResponseFields, mods: &Modifications) -> ProcessingResult {
        self.finalize(response, mods).unwrap_or_else(|e| {
            tracing::error!(error = %e, url = %response.request.url(), "Finalization failed");
            ProcessingResult::error(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::types::RequestFields;

    fn finalizer(cors: bool) -> ResponseFinalizer {
        ResponseFinalizer::new(CorsConfig {
            enabled: cors,
            ..CorsConfig::default()
        })
    }

    fn response(method: &str) -> ResponseFields {
        ResponseFields {
            request: RequestFields {
                host: "example.com".into(),
                path: "/".into(),
                method: method.into(),
                ..RequestFields::default()
            },
            status_code: Some(201),
            content_type: Some("text/html".into()),
            body: Some("<p>upstream</p>".into()),
            response_headers: HashMap::from([
                ("Content-Length".to_string(), "1".to_string()),
                ("ETag".to_string(), "abc".to_string()),
            ]),
        }
    }

    #[test]
    fn test_regular_uses_upstream() {
        let result = finalizer(false)
            .finalize(&response("GET"), &Modifications::default())
            .unwrap();
        assert_eq!(result.final_status_code, 201);
        assert_eq!(result.final_body, "<p>upstream</p>");
        assert_eq!(result.final_headers["content-length"], "15");
        assert_eq!(result.final_headers["etag"], "abc");
        assert!(!result.content_was_modified);
    }

    #[test]
    fn test_regular_defaults() {
        let bare = ResponseFields::default();
        let result = finalizer(false).finalize(&bare, &Modifications::default()).unwrap();
        assert_eq!(result.final_status_code, 200);
        assert_eq!(result.final_content_type, "text/plain");
        assert_eq!(result.final_body, "");
        assert_eq!(result.final_headers["content-length"], "0");
    }

    #[test]
    fn test_modified_body_recomputes_length() {
        let mods = Modifications {
            modified_body: Some("<p>changed body</p>".into()),
            ..Modifications::default()
        };
        let result = finalizer(false).finalize(&response("GET"), &mods).unwrap();
        assert_eq!(result.final_body, "<p>changed body</p>");
        assert_eq!(result.final_headers["content-length"], "19");
        assert!(result.content_was_modified);
    }

    #[test]
    fn test_override_wins_over_preflight() {
        let mut mods = Modifications::default();
        mods.override_with(404, "text/plain", "nope".into());
        mods.add_header("x-debug-show", "original");

        let result = finalizer(true).finalize(&response("OPTIONS"), &mods).unwrap();
        assert!(result.response_overridden);
        assert_eq!(result.final_status_code, 404);
        assert_eq!(result.final_body, "nope");
        assert_eq!(result.final_headers["x-debug-show"], "original");
        assert!(!result.final_headers.contains_key("access-control-allow-origin"));
    }

    #[test]
    fn test_override_body_defaults_to_empty() {
        let mods = Modifications {
            override_response: true,
            ..Modifications::default()
        };
        let result = finalizer(false).finalize(&response("GET"), &mods).unwrap();
        assert_eq!(result.final_status_code, 200);
        assert_eq!(result.final_body, "");
    }

    #[test]
    fn test_preflight_ignores_other_modifications() {
        let mut mods = Modifications {
            modified_body: Some("changed".into()),
            ..Modifications::default()
        };
        mods.add_header("x-transform-mode", "hashes");

        let result = finalizer(true).finalize(&response("OPTIONS"), &mods).unwrap();
        assert_eq!(result.final_status_code, 204);
        assert_eq!(result.final_body, "");
        assert_eq!(result.final_headers["access-control-allow-origin"], "*");
        assert!(!result.final_headers.contains_key("x-transform-mode"));
        assert!(!result.final_headers.contains_key("etag"));
    }

    #[test]
    fn test_preflight_requires_cors() {
        let result = finalizer(false)
            .finalize(&response("OPTIONS"), &Modifications::default())
            .unwrap();
        assert_eq!(result.final_status_code, 201);
    }

    #[test]
    fn test_failure_becomes_error_result() {
        let mut mods = Modifications::default();
        mods.add_header("bad\nname", "x");

        let result = finalizer(false).finalize_or_error(&response("GET"), &mods);
        assert_eq!(result.final_status_code, 500);
        assert_eq!(result.final_content_type, "text/plain");
        assert!(result.processing_error.as_deref().unwrap().contains("bad\nname"));
        assert_eq!(result.final_headers.len(), 3);
        assert_eq!(result.final_headers["x-processing-error"], "true");
    }
}
