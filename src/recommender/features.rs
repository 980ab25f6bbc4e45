//! Request context and its fixed-length feature encoding.
//!
//! Every categorical field is a one-hot block over a fixed, ordered vocabulary and every
//! flag is one coordinate. Stored policy statistics are only meaningful relative to this
//! exact layout; a stored policy is checked against [`FEATURE_DIM`] on load, but a
//! same-width reordering of the vocabularies would go unnoticed.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RecError, Result};

macro_rules! categorical {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// A label outside the vocabulary; encodes as an all-zero block.
            Unknown(String),
        }

        impl $name {
            pub const VOCAB: &'static [&'static str] = &[$($label),+];

            #[must_use]
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Unknown(raw) => raw,
                }
            }

            /// Position inside the one-hot block, `None` for labels outside the vocabulary.
            #[must_use]
            pub fn slot(&self) -> Option<usize> {
                let label = self.as_str();
                Self::VOCAB.iter().position(|known| *known == label)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($label => Self::$variant,)+
                    _ => Self::Unknown(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

categorical! {
    /// Kind of work the request performs.
    Task {
        Chat => "chat",
        Summarization => "summarization",
        Code => "code",
        Qa => "qa",
        Classification => "classification",
    } default Chat
}

categorical! {
    /// Subject-matter domain of the request.
    Domain {
        General => "general",
        Legal => "legal",
        Medical => "medical",
        Finance => "finance",
    } default General
}

categorical! {
    /// Scale of the caller's dataset.
    DatasetSize {
        Tiny => "tiny",
        Small => "small",
        Medium => "medium",
        Large => "large",
    } default Small
}

categorical! {
    /// Budget tier shared by the latency and cost fields.
    Budget {
        VeryLow => "very_low",
        Low => "low",
        Medium => "medium",
        High => "high",
    } default Medium
}

/// Situational description of a single request.
///
/// Missing fields fall back to their documented defaults; keys outside the record are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Context {
    pub task: Task,
    pub domain: Domain,
    pub dataset_size: DatasetSize,
    pub latency_budget: Budget,
    pub cost_budget: Budget,
    pub multilingual: bool,
    pub needs_coding: bool,
    pub needs_reasoning: bool,
    pub safety_sensitive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            task: Task::default(),
            domain: Domain::default(),
            dataset_size: DatasetSize::default(),
            latency_budget: Budget::default(),
            cost_budget: Budget::default(),
            multilingual: false,
            needs_coding: false,
            needs_reasoning: true,
            safety_sensitive: false,
        }
    }
}

impl Context {
    const FIELDS: [&'static str; 9] = [
        "task",
        "domain",
        "dataset_size",
        "latency_budget",
        "cost_budget",
        "multilingual",
        "needs_coding",
        "needs_reasoning",
        "safety_sensitive",
    ];

    /// Parse a context from a JSON object.
    pub fn from_json(raw: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(raw)
            .map_err(|err| RecError::InvalidArgument(format!("invalid context: {err}")))?;
        Self::from_value(value)
    }

    /// Parse a JSON value (used by the serve loop).
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if let Some(object) = value.as_object() {
            let ignored: Vec<&str> = object
                .keys()
                .map(String::as_str)
                .filter(|key| !Self::FIELDS.iter().any(|field| field == key))
                .collect();
            if !ignored.is_empty() {
                debug!(?ignored, "ignoring unrecognised context keys");
            }
        }
        serde_json::from_value(value)
            .map_err(|err| RecError::InvalidArgument(format!("invalid context: {err}")))
    }
}

/// Width of the encoded vector: one-hot blocks plus one slot per flag.
pub const FEATURE_DIM: usize = Task::VOCAB.len()
    + Domain::VOCAB.len()
    + DatasetSize::VOCAB.len()
    + Budget::VOCAB.len() * 2
    + 4;

/// Turns a context into a fixed-length numeric vector.
pub trait FeatureEncoder: Send + Sync {
    /// Length of every vector this encoder produces.
    fn dim(&self) -> usize;

    fn encode(&self, context: &Context) -> Vec<f64>;
}

/// The version-1 one-hot encoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct OneHotEncoder;

impl FeatureEncoder for OneHotEncoder {
    fn dim(&self) -> usize {
        FEATURE_DIM
    }

    fn encode(&self, context: &Context) -> Vec<f64> {
        let mut x = Vec::with_capacity(FEATURE_DIM);
        push_one_hot(&mut x, context.task.slot(), Task::VOCAB.len());
        push_one_hot(&mut x, context.domain.slot(), Domain::VOCAB.len());
        push_one_hot(&mut x, context.dataset_size.slot(), DatasetSize::VOCAB.len());
        push_one_hot(&mut x, context.latency_budget.slot(), Budget::VOCAB.len());
        push_one_hot(&mut x, context.cost_budget.slot(), Budget::VOCAB.len());
        for flag in [
            context.multilingual,
            context.needs_coding,
            context.needs_reasoning,
            context.safety_sensitive,
        ] {
            x.push(if flag { 1.0 } else { 0.0 });
        }
        debug_assert_eq!(x.len(), FEATURE_DIM);
        x
    }
}

fn push_one_hot(x: &mut Vec<f64>, slot: Option<usize>, width: usize) {
    x.extend((0..width).map(|i| if slot == Some(i) { 1.0 } else { 0.0 }));
}

/// Human-readable name of every coordinate, in encoding order.
#[must_use]
pub fn feature_names() -> Vec<String> {
    let mut names = Vec::with_capacity(FEATURE_DIM);
    let blocks: [(&str, &[&str]); 5] = [
        ("task", Task::VOCAB),
        ("domain", Domain::VOCAB),
        ("dataset_size", DatasetSize::VOCAB),
        ("latency_budget", Budget::VOCAB),
        ("cost_budget", Budget::VOCAB),
    ];
    for (field, vocab) in blocks {
        names.extend(vocab.iter().map(|label| format!("{field}={label}")));
    }
    names.extend(
        ["multilingual", "needs_coding", "needs_reasoning", "safety_sensitive"]
            .iter()
            .map(ToString::to_string),
    );
    names
}
