//! Transformation modes and their attributes.
//!
//! Every attribute is an exhaustive `match`, so a new mode does not build
//! until all of its attributes are wired.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named anonymization/obfuscation strategy applied to a page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransformationMode {
    #[default]
    Off,
    /// Dictionary listing of the page's text fragments.
    Dict,
    Xxx,
    Hashes,
    /// Fragments sent through the transformation service unchanged.
    Roundtrip,
    XxxRandom,
    HashesRandom,
    AbcdeBySize,
    /// Sentiment-driven variants. Criterion filtering is disabled, so these
    /// currently transform every fragment.
    SentimentXxx,
    SentimentHashes,
}

/// Replacement glyph style passed to the text transformation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualMode {
    Xxx,
    Hashes,
    Preserve,
}

/// Engine the text transformation service should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineMode {
    Hash,
    Sentiment,
}

/// How criterion filters are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterLogic {
    And,
    Or,
}

impl TransformationMode {
    pub const ALL: [TransformationMode; 10] = [
        TransformationMode::Off,
        TransformationMode::Dict,
        TransformationMode::Xxx,
        TransformationMode::Hashes,
        TransformationMode::Roundtrip,
        TransformationMode::XxxRandom,
        TransformationMode::HashesRandom,
        TransformationMode::AbcdeBySize,
        TransformationMode::SentimentXxx,
        TransformationMode::SentimentHashes,
    ];

    /// Parse a cookie value. Anything unrecognized is `Off`.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return TransformationMode::Off;
        };
        let tag = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(tag))
            .unwrap_or(TransformationMode::Off)
    }

    /// Find the mode whose cache command name is `command`.
    pub fn from_command(command: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .filter(|mode| mode.is_active())
            .find(|mode| mode.command_name() == command)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransformationMode::Off => "off",
            TransformationMode::Dict => "dict",
            TransformationMode::Xxx => "xxx",
            TransformationMode::Hashes => "hashes",
            TransformationMode::Roundtrip => "roundtrip",
            TransformationMode::XxxRandom => "xxx_random",
            TransformationMode::HashesRandom => "hashes_random",
            TransformationMode::AbcdeBySize => "abcde_by_size",
            TransformationMode::SentimentXxx => "sentiment_xxx",
            TransformationMode::SentimentHashes => "sentiment_hashes",
        }
    }

    pub fn is_active(self) -> bool {
        self != TransformationMode::Off
    }

    pub fn requires_caching(self) -> bool {
        self.is_active()
    }

    /// Processed in-process instead of by the text transformation service.
    pub fn is_local(self) -> bool {
        matches!(
            self,
            TransformationMode::XxxRandom
                | TransformationMode::HashesRandom
                | TransformationMode::AbcdeBySize
        )
    }

    pub fn requires_sentiment(self) -> bool {
        matches!(
            self,
            TransformationMode::SentimentXxx | TransformationMode::SentimentHashes
        )
    }

    /// Path on the text transformation service; empty for local modes.
    pub fn remote_path(self) -> &'static str {
        match self {
            TransformationMode::Off => "",
            TransformationMode::Dict => "/transform/dict",
            TransformationMode::Xxx => "/transform/xxx",
            TransformationMode::Hashes => "/transform/hashes",
            TransformationMode::Roundtrip => "/transform/roundtrip",
            TransformationMode::XxxRandom => "",
            TransformationMode::HashesRandom => "",
            TransformationMode::AbcdeBySize => "",
            TransformationMode::SentimentXxx => "/transform/sentiment",
            TransformationMode::SentimentHashes => "/transform/sentiment",
        }
    }

    pub fn response_content_type(self) -> &'static str {
        match self {
            TransformationMode::Dict => "text/plain",
            _ => "text/html",
        }
    }

    /// Logical cache command the transformed artifact is stored under.
    pub fn command_name(self) -> &'static str {
        match self {
            TransformationMode::Off => "",
            TransformationMode::Dict => "html-dict",
            TransformationMode::Xxx => "html-xxx",
            TransformationMode::Hashes => "html-hashes",
            TransformationMode::Roundtrip => "html-roundtrip",
            TransformationMode::XxxRandom => "html-xxx-random",
            TransformationMode::HashesRandom => "html-hashes-random",
            TransformationMode::AbcdeBySize => "html-abcde-by-size",
            TransformationMode::SentimentXxx => "html-sentiment-xxx",
            TransformationMode::SentimentHashes => "html-sentiment-hashes",
        }
    }

    /// Storage sub-key for this mode's cached artifact.
    pub fn cache_data_key(self) -> &'static str {
        match self {
            TransformationMode::Off => "",
            TransformationMode::Dict => "transformations/html-dict",
            TransformationMode::Xxx => "transformations/html-xxx",
            TransformationMode::Hashes => "transformations/html-hashes",
            TransformationMode::Roundtrip => "transformations/html-roundtrip",
            TransformationMode::XxxRandom => "transformations/html-xxx-random",
            TransformationMode::HashesRandom => "transformations/html-hashes-random",
            TransformationMode::AbcdeBySize => "transformations/html-abcde-by-size",
            TransformationMode::SentimentXxx => "transformations/html-sentiment-xxx",
            TransformationMode::SentimentHashes => "transformations/html-sentiment-hashes",
        }
    }

    pub fn engine_mode(self) -> EngineMode {
        if self.requires_sentiment() {
            EngineMode::Sentiment
        } else {
            EngineMode::Hash
        }
    }

    pub fn visual_mode(self) -> VisualMode {
        let name = self.as_str();
        if name.contains("xxx") {
            VisualMode::Xxx
        } else if name.contains("hashes") {
            VisualMode::Hashes
        } else {
            VisualMode::Preserve
        }
    }

    /// Classification criteria sent with sentiment requests.
    // Sentiment filtering is disabled; every mode sends no criteria.
    pub fn criterion_filters(self) -> Vec<String> {
        Vec::new()
    }

    pub fn filter_logic(self) -> FilterLogic {
        FilterLogic::And
    }
}

impl fmt::Display for TransformationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
