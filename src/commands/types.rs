//! Debug command types.

use serde::Serialize;

use crate::transform::mode::TransformationMode;

/// What a `show` command asks to display instead of the upstream response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShowTarget {
    Stats,
    /// Page entry recorded for the URL.
    Cache,
    /// Cached untouched source of the URL.
    Original,
    Structure,
    Fragments,
    /// The page run through a transformation mode.
    Preview(TransformationMode),
    Unknown,
}

impl ShowTarget {
    pub fn parse(raw: &str) -> Self {
        let target = raw.trim().to_ascii_lowercase();
        match target.as_str() {
            "stats" => ShowTarget::Stats,
            "cache" => ShowTarget::Cache,
            "original" => ShowTarget::Original,
            "structure" => ShowTarget::Structure,
            "fragments" => ShowTarget::Fragments,
            other => match TransformationMode::parse(Some(other)) {
                TransformationMode::Off => ShowTarget::Unknown,
                mode => ShowTarget::Preview(mode),
            },
        }
    }

    /// Needs a remote collaborator and therefore HTML input.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            ShowTarget::Structure | ShowTarget::Fragments | ShowTarget::Preview(_)
        )
    }
}

/// Panel inserted by an `inject` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InjectPanel {
    Stats,
    Info,
}

impl InjectPanel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stats" => Some(InjectPanel::Stats),
            "info" => Some(InjectPanel::Info),
            _ => None,
        }
    }
}

/// Literal text substitution from a `replace` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Replacement {
    pub old: String,
    pub new: String,
}

impl Replacement {
    /// `old:new`, split on the first colon. No colon or an empty `old` is no replacement.
    pub fn parse(raw: &str) -> Option<Self> {
        let (old, new) = raw.split_once(':')?;
        if old.is_empty() {
            return None;
        }
        Some(Self {
            old: old.to_string(),
            new: new.to_string(),
        })
    }

    pub fn apply(&self, body: &str) -> String {
        body.replace(&self.old, &self.new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum CommandKind {
    Show(ShowTarget),
    Inject(Option<InjectPanel>),
    Replace(Option<Replacement>),
    DebugMode(bool),
}

/// One resolved debug command. Built per request, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugCommand {
    pub kind: CommandKind,
    /// Raw parameter value.
    pub value: String,
}

impl DebugCommand {
    pub fn new(kind: CommandKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}
