//! V8 heap node kinds.
//!
//! The `type` field of a node indexes into the first entry of
//! `meta.node_types`, which lists these names.

use serde::{Deserialize, Serialize};

/// Kind of a heap node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Hidden,
    Array,
    String,
    Object,
    Code,
    Closure,
    RegExp,
    Number,
    Native,
    Synthetic,
    ConcatenatedString,
    SlicedString,
    Symbol,
    BigInt,
    ObjectShape,
    Other,
}

impl std::str::FromStr for NodeKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "hidden" => Self::Hidden,
            "array" => Self::Array,
            "string" => Self::String,
            "object" => Self::Object,
            "code" => Self::Code,
            "closure" => Self::Closure,
            "regexp" => Self::RegExp,
            "number" | "heap number" => Self::Number,
            "native" => Self::Native,
            "synthetic" => Self::Synthetic,
            "concatenated string" => Self::ConcatenatedString,
            "sliced string" => Self::SlicedString,
            "symbol" => Self::Symbol,
            "bigint" => Self::BigInt,
            "object shape" => Self::ObjectShape,
            _ => Self::Other,
        })
    }
}

impl NodeKind {
    /// Whether the node's `name` is a constructor or function name
    /// (as opposed to string contents or an internal label)
    pub fn is_object_like(self) -> bool {
        matches!(
            self,
            Self::Object | Self::Closure | Self::RegExp | Self::Native
        )
    }

    /// Summary bucket label for kinds that are not object-like
    pub fn bucket_label(self) -> &'static str {
        match self {
            Self::Hidden => "(system)",
            Self::Array => "(array)",
            Self::String | Self::ConcatenatedString | Self::SlicedString => "(string)",
            Self::Object => "(object)",
            Self::Code => "(compiled code)",
            Self::Closure => "(closure)",
            Self::RegExp => "(regexp)",
            Self::Number => "(number)",
            Self::Native => "(native)",
            Self::Synthetic => "(synthetic)",
            Self::Symbol => "(symbol)",
            Self::BigInt => "(bigint)",
            Self::ObjectShape => "(object shape)",
            Self::Other => "(other)",
        }
    }
}
