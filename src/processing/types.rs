//! Interceptor-facing request, response and result shapes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::stats::StatsSnapshot;

/// Case-insensitive header lookup.
pub fn find_header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Intercepted request as reported by the interceptor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestFields {
    /// Defaults to `https` when absent.
    pub scheme: Option<String>,
    pub host: String,
    pub path: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    /// Query-derived debug parameters.
    pub debug_params: HashMap<String, String>,
}

impl RequestFields {
    /// Absolute URL of the intercepted request.
    pub fn url(&self) -> String {
        let scheme = self.scheme.as_deref().unwrap_or("https");
        let path = if self.path.starts_with('/') || self.path.is_empty() {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("{}://{}{}", scheme, self.host, path)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.header("cookie")
    }

    pub fn is_preflight(&self) -> bool {
        self.method.eq_ignore_ascii_case("OPTIONS")
    }
}

/// Intercepted upstream response, with the request that produced it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseFields {
    #[serde(flatten)]
    pub request: RequestFields,
    pub status_code: Option<u16>,
    pub content_type: Option<String>,
    pub body: Option<String>,
    pub response_headers: HashMap<String, String>,
}

impl ResponseFields {
    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Declared content type, falling back to the response headers.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .or_else(|| find_header(&self.response_headers, "content-type"))
    }

    pub fn is_html(&self) -> bool {
        self.content_type().is_some_and(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml")
        })
    }

    /// Body is text that literal replacement can be applied to.
    pub fn is_textual(&self) -> bool {
        self.content_type().is_some_and(|ct| {
            let ct = ct.to_ascii_lowercase();
            ct.starts_with("text/")
                || ["json", "javascript", "xml"].iter().any(|t| ct.contains(t))
        })
    }
}

/// Changes the interceptor must apply to one request or response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifications {
    /// Lower-case name → value; a later add replaces an earlier one.
    pub headers_to_add: BTreeMap<String, String>,
    pub headers_to_remove: Vec<String>,
    pub block_request: bool,
    pub block_status: Option<u16>,
    pub block_message: Option<String>,
    pub modified_body: Option<String>,
    pub override_response: bool,
    pub override_status: Option<u16>,
    pub override_content_type: Option<String>,
    /// Body came from the transformation cache.
    pub cached_response: bool,
    pub include_stats: bool,
    pub stats: Option<StatsSnapshot>,
    pub debug_mode: bool,
}

impl Modifications {
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers_to_add
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn remove_header(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref().to_ascii_lowercase();
        if !self.headers_to_remove.contains(&name) {
            self.headers_to_remove.push(name);
        }
    }

    /// Replace the whole response.
    pub fn override_with(&mut self, status: u16, content_type: &str, body: String) {
        self.override_response = true;
        self.override_status = Some(status);
        self.override_content_type = Some(content_type.to_string());
        self.modified_body = Some(body);
    }

    pub fn block(&mut self, status: u16, message: &str) {
        self.block_request = true;
        self.block_status = Some(status);
        self.block_message = Some(message.to_string());
    }
}

/// Final response description handed back to the interceptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingResult {
    pub final_status_code: u16,
    pub final_content_type: String,
    pub final_body: String,
    pub final_headers: BTreeMap<String, String>,
    pub debug_mode_active: bool,
    pub content_was_modified: bool,
    pub response_overridden: bool,
    pub processing_error: Option<String>,
}

impl ProcessingResult {
    /// Fixed 500 result carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        let message = message.into();
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "text/plain".to_string());
        headers.insert("content-length".to_string(), message.len().to_string());
        headers.insert("x-processing-error".to_string(), "true".to_string());
        Self {
            final_status_code: 500,
            final_content_type: "text/plain".to_string(),
            final_body: message.clone(),
            final_headers: headers,
            debug_mode_active: false,
            content_was_modified: false,
            response_overridden: false,
            processing_error: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_building() {
        let fields = RequestFields {
            host: "example.com".into(),
            path: "articles/1?x=2".into(),
            ..RequestFields::default()
        };
        assert_eq!(fields.url(), "https://example.com/articles/1?x=2");

        let fields = RequestFields {
            scheme: Some("http".into()),
            host: "localhost:8080".into(),
            path: "/".into(),
            ..RequestFields::default()
        };
        assert_eq!(fields.url(), "http://localhost:8080/");
    }

    #[test]
    fn test_content_type_detection() {
        let mut response = ResponseFields::default();
        assert!(!response.is_html());

        response
            .response_headers
            .insert("Content-Type".into(), "text/html; charset=utf-8".into());
        assert!(response.is_html());
        assert!(response.is_textual());

        response.content_type = Some("application/json".into());
        assert!(!response.is_html());
        assert!(response.is_textual());

        response.content_type = Some("image/png".into());
        assert!(!response.is_textual());
    }

    #[test]
    fn test_response_fields_wire_shape() {
        let fields: ResponseFields = serde_json::from_value(serde_json::json!({
            "host": "example.com",
            "path": "/a",
            "method": "GET",
            "status_code": 200,
            "body": "<p>x</p>"
        }))
        .unwrap();
        assert_eq!(fields.request.host, "example.com");
        assert_eq!(fields.status_code, Some(200));
        assert_eq!(fields.body(), "<p>x</p>");
    }

    #[test]
    fn test_error_result() {
        let result = ProcessingResult::error("boom");
        assert_eq!(result.final_status_code, 500);
        assert_eq!(result.final_body, "boom");
        assert_eq!(result.processing_error.as_deref(), Some("boom"));
        assert_eq!(
            result.final_headers.keys().collect::<Vec<_>>(),
            vec!["content-length", "content-type", "x-processing-error"]
        );
    }

    #[test]
    fn test_header_queue_is_case_insensitive() {
        let mut mods = Modifications::default();
        mods.add_header("X-Test", "1");
        mods.add_header("x-test", "2");
        mods.remove_header("Server");
        mods.remove_header("server");
        assert_eq!(mods.headers_to_add.len(), 1);
        assert_eq!(mods.headers_to_add["x-test"], "2");
        assert_eq!(mods.headers_to_remove, vec!["server"]);
    }
}
