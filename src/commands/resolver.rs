//! Debug parameter resolution.

use std::collections::{BTreeMap, HashMap};

use crate::commands::types::{
    CommandKind, DebugCommand, InjectPanel, Replacement, ShowTarget,
};

/// Recognized parameter names, in dispatch order.
pub const COMMAND_ORDER: [&str; 4] = ["show", "inject", "replace", "debug"];

/// Split a `Cookie` header into name/value pairs, in header order.
pub fn parse_cookies(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().trim_matches('"').to_string()))
        })
        .collect()
}

/// Value of the cookie called `name`; the last occurrence wins.
pub fn cookie_value(header: Option<&str>, name: &str) -> Option<String> {
    parse_cookies(header?)
        .into_iter()
        .filter(|(n, _)| n == name)
        .map(|(_, v)| v)
        .last()
}

fn is_enabled(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

/// Turns query and cookie debug parameters into typed commands.
#[derive(Debug, Clone)]
pub struct CommandResolver {
    cookie_prefix: String,
}

impl CommandResolver {
    pub fn new(cookie_prefix: impl Into<String>) -> Self {
        Self {
            cookie_prefix: cookie_prefix.into(),
        }
    }

    /// Debug parameters carried by cookies named `{prefix}{param}`.
    pub fn cookie_params(&self, cookie_header: Option<&str>) -> BTreeMap<String, String> {
        let Some(header) = cookie_header else {
            return BTreeMap::new();
        };
        parse_cookies(header)
            .into_iter()
            .filter_map(|(name, value)| {
                let param = name.strip_prefix(&self.cookie_prefix)?;
                (!param.is_empty()).then(|| (param.to_ascii_lowercase(), value))
            })
            .collect()
    }

    /// Merge both sources; cookie values override query values.
    pub fn merge(
        &self,
        query: &HashMap<String, String>,
        cookie_header: Option<&str>,
    ) -> BTreeMap<String, String> {
        let mut merged: BTreeMap<String, String> = query
            .iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v.clone()))
            .collect();
        merged.extend(self.cookie_params(cookie_header));
        merged
    }

    /// Resolve commands from the interceptor's parameters and the request cookies.
    pub fn resolve(
        &self,
        query: &HashMap<String, String>,
        cookie_header: Option<&str>,
    ) -> Vec<DebugCommand> {
        resolve_params(&self.merge(query, cookie_header))
    }
}

/// One command per recognized key, in `COMMAND_ORDER`.
pub fn resolve_params(params: &BTreeMap<String, String>) -> Vec<DebugCommand> {
    COMMAND_ORDER
        .iter()
        .filter_map(|name| {
            let value = params.get(*name)?;
            let kind = match *name {
                "show" => CommandKind::Show(ShowTarget::parse(value)),
                "inject" => CommandKind::Inject(InjectPanel::parse(value)),
                "replace" => CommandKind::Replace(Replacement::parse(value)),
                _ => CommandKind::DebugMode(is_enabled(value)),
            };
            Some(DebugCommand::new(kind, value.as_str()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::mode::TransformationMode;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_cookie_parsing() {
        let cookies = parse_cookies("a=1; __dbg_show=stats;broken; b = \"two\" ");
        assert_eq!(
            cookies,
            vec![
                ("a".to_string(), "1".to_string()),
                ("__dbg_show".to_string(), "stats".to_string()),
                ("b".to_string(), "two".to_string()),
            ]
        );
        assert_eq!(cookie_value(Some("m=xxx; m=hashes"), "m").as_deref(), Some("hashes"));
        assert_eq!(cookie_value(None, "m"), None);
    }

    #[test]
    fn test_cookie_overrides_query() {
        let resolver = CommandResolver::new("__dbg_");
        let commands = resolver.resolve(
            &query(&[("show", "stats"), ("Replace", "a:b")]),
            Some("__dbg_show=cache; session=abc"),
        );

        assert_eq!(commands.len(), 2);
        assert_eq!(commands[0].kind, CommandKind::Show(ShowTarget::Cache));
        assert_eq!(commands[0].value, "cache");
        assert_eq!(
            commands[1].kind,
            CommandKind::Replace(Some(Replacement {
                old: "a".into(),
                new: "b".into()
            }))
        );
    }

    #[test]
    fn test_fixed_order_and_unknown_keys() {
        let resolver = CommandResolver::new("__dbg_");
        let commands = resolver.resolve(
            &query(&[("debug", "on"), ("verbose", "1"), ("inject", "info")]),
            Some("__dbg_show=hashes"),
        );
        let kinds: Vec<_> = commands.iter().map(|c| c.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                CommandKind::Show(ShowTarget::Preview(TransformationMode::Hashes)),
                CommandKind::Inject(Some(InjectPanel::Info)),
                CommandKind::DebugMode(true),
            ]
        );
    }

    #[test]
    fn test_debug_flag_values() {
        for (raw, expected) in [("1", true), ("YES", true), ("on", true), ("0", false), ("", false)] {
            let commands = resolve_params(&BTreeMap::from([("debug".to_string(), raw.to_string())]));
            assert_eq!(commands[0].kind, CommandKind::DebugMode(expected), "value {raw:?}");
        }
    }

    #[test]
    fn test_no_params_no_commands() {
        let resolver = CommandResolver::new("__dbg_");
        assert!(resolver.resolve(&HashMap::new(), Some("session=1")).is_empty());
        assert!(resolver.resolve(&HashMap::new(), None).is_empty());
    }
}
