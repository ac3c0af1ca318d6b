//! Request-side decisions: host blocking and request header injection.

use crate::config::{HeaderRulesConfig, RequestRulesConfig};
use crate::processing::types::{Modifications, RequestFields};
use crate::stats::StatsAggregator;

/// Host without port, lower-cased.
fn bare_host(host: &str) -> String {
    let host = host.trim().to_ascii_lowercase();
    if host.starts_with('[') {
        // IPv6 literal, keep the brackets.
        return host.split_once(']').map(|(h, _)| format!("{h}]")).unwrap_or(host);
    }
    host.split(':').next().unwrap_or_default().to_string()
}

/// Exact match or a subdomain of a blocked host.
pub fn host_is_blocked(host: &str, blocked: &[String]) -> bool {
    let host = bare_host(host);
    blocked.iter().any(|rule| {
        let rule = rule.trim().trim_start_matches("*.").to_ascii_lowercase();
        !rule.is_empty() && (host == rule || host.ends_with(&format!(".{rule}")))
    })
}

pub struct RequestProcessor {
    rules: RequestRulesConfig,
    headers: HeaderRulesConfig,
}

impl RequestProcessor {
    pub fn new(rules: RequestRulesConfig, headers: HeaderRulesConfig) -> Self {
        Self { rules, headers }
    }

    pub fn process(&self, fields: &RequestFields, stats: &StatsAggregator) -> Modifications {
        stats.record_request();
        let mut mods = Modifications::default();

        if host_is_blocked(&fields.host, &self.rules.blocked_hosts) {
            tracing::info!(host = %fields.host, path = %fields.path, "Request blocked");
            mods.block(self.rules.block_status, &self.rules.block_message);
            return mods;
        }

        for (name, value) in &self.headers.request {
            mods.add_header(name, value.clone());
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn processor(blocked: &[&str]) -> RequestProcessor {
        let rules = RequestRulesConfig {
            blocked_hosts: blocked.iter().map(|s| s.to_string()).collect(),
            ..RequestRulesConfig::default()
        };
        let mut headers = HeaderRulesConfig::default();
        headers
            .request
            .insert("X-Forwarded-Via".into(), "intercept".into());
        RequestProcessor::new(rules, headers)
    }

    fn request(host: &str) -> RequestFields {
        RequestFields {
            host: host.into(),
            path: "/".into(),
            method: "GET".into(),
            ..RequestFields::default()
        }
    }

    #[test]
    fn test_host_matching() {
        let blocked = vec!["ads.example".to_string(), "*.tracker.io".to_string()];
        assert!(host_is_blocked("ads.example", &blocked));
        assert!(host_is_blocked("cdn.ads.example:443", &blocked));
        assert!(host_is_blocked("A.Tracker.IO", &blocked));
        assert!(!host_is_blocked("badads.example", &blocked));
        assert!(!host_is_blocked("example.com", &blocked));
        assert!(!host_is_blocked("[::1]:8080", &blocked));
    }

    #[test]
    fn test_blocked_request() {
        let stats = StatsAggregator::new();
        let mods = processor(&["ads.example"]).process(&request("x.ads.example"), &stats);

        assert!(mods.block_request);
        assert_eq!(mods.block_status, Some(403));
        assert_eq!(mods.block_message.as_deref(), Some("Blocked by intercept policy"));
        assert!(mods.headers_to_add.is_empty());
        assert_eq!(stats.snapshot().stats.total_requests, 1);
    }

    #[test]
    fn test_allowed_request_gets_headers() {
        let stats = StatsAggregator::new();
        let mods = processor(&[]).process(&request("example.com"), &stats);

        assert!(!mods.block_request);
        assert_eq!(mods.headers_to_add["x-forwarded-via"], "intercept");
    }
}
