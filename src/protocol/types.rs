//! Value types carried inside requests and responses

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::WaddleError;

// =============================================================================
// Collections
// =============================================================================

/// Distance function a collection ranks vectors with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DistanceMetric {
    /// Euclidean distance
    #[default]
    L2,
    /// Cosine distance (1 - cosine similarity)
    Cosine,
    /// Negated inner product
    Ip,
}

impl DistanceMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
            DistanceMetric::Ip => "ip",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DistanceMetric {
    type Err = WaddleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            "ip" | "dot" => Ok(DistanceMetric::Ip),
            other => Err(WaddleError::Config(format!("unknown distance metric: {}", other))),
        }
    }
}

/// Collection metadata as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,

    /// Vector length every block must match (0 = no vectors)
    pub dimensions: u32,

    pub metric: DistanceMetric,
}

// =============================================================================
// Blocks
// =============================================================================

/// One stored record under a key
///
/// Equality treats keywords as a set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockData {
    /// Primary content (text is stored as its UTF-8 bytes)
    pub primary: Vec<u8>,

    /// Embedding, if the block has one
    pub vector: Option<Vec<f32>>,

    /// Keywords, `[a-z0-9_-]+` each
    pub keywords: Vec<String>,
}

impl BlockData {
    pub fn new(primary: impl Into<Vec<u8>>) -> Self {
        Self {
            primary: primary.into(),
            vector: None,
            keywords: Vec::new(),
        }
    }

    pub fn with_vector(mut self, vector: impl Into<Vec<f32>>) -> Self {
        self.vector = Some(vector.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Primary content as text, if it is valid UTF-8
    pub fn primary_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.primary).ok()
    }

    /// Keywords as a set; keyword order carries no meaning
    pub fn keyword_set(&self) -> BTreeSet<&str> {
        self.keywords.iter().map(String::as_str).collect()
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

impl PartialEq for BlockData {
    fn eq(&self, other: &Self) -> bool {
        self.primary == other.primary
            && self.vector == other.vector
            && self.keyword_set() == other.keyword_set()
    }
}

/// One entry of a batch append
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendItem {
    pub key: String,
    pub block: BlockData,
}

impl AppendItem {
    pub fn new(key: impl Into<String>, block: BlockData) -> Self {
        Self {
            key: key.into(),
            block,
        }
    }
}

/// Per-item outcome of a batch append
///
/// Empty when the server only reported the overall flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub applied: Vec<bool>,
}

impl BatchOutcome {
    pub fn applied_count(&self) -> usize {
        self.applied.iter().filter(|ok| **ok).count()
    }
}

// =============================================================================
// Search
// =============================================================================

/// How a keyword filter matches a block's keyword set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeywordMode {
    /// Every given keyword is present
    #[default]
    Exact,
    /// Every given keyword is a prefix of some block keyword
    Prefix,
    /// Every given keyword is a substring of some block keyword
    Partial,
    /// Every given keyword is within `max_distance` edits of some block keyword
    Levenshtein { max_distance: u32 },
}

impl fmt::Display for KeywordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordMode::Exact => f.write_str("exact"),
            KeywordMode::Prefix => f.write_str("prefix"),
            KeywordMode::Partial => f.write_str("partial"),
            KeywordMode::Levenshtein { max_distance } => write!(f, "levenshtein:{}", max_distance),
        }
    }
}

impl FromStr for KeywordMode {
    type Err = WaddleError;

    /// Accepts `exact`, `prefix`, `partial`, `levenshtein` and
    /// `levenshtein:<n>` (default distance 2)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let (name, arg) = match lower.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (lower.as_str(), None),
        };
        match (name, arg) {
            ("exact", None) => Ok(KeywordMode::Exact),
            ("prefix", None) => Ok(KeywordMode::Prefix),
            ("partial", None) => Ok(KeywordMode::Partial),
            ("levenshtein", None) => Ok(KeywordMode::Levenshtein { max_distance: 2 }),
            ("levenshtein", Some(n)) => n
                .parse()
                .map(|max_distance| KeywordMode::Levenshtein { max_distance })
                .map_err(|_| WaddleError::Config(format!("bad levenshtein distance: {}", n))),
            _ => Err(WaddleError::Config(format!("unknown keyword mode: {}", s))),
        }
    }
}

/// Which blocks a vector search considers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchScope {
    /// Every block in the collection
    #[default]
    Global,
    /// Only the blocks of one key
    Key(String),
}

/// One vector search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub key: String,
    pub index: u32,
    pub distance: f32,

    /// Block content, when the server attached it
    pub block: Option<BlockData>,
}

// =============================================================================
// Flat Generation
// =============================================================================

/// A value in the flat key -> value-list API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub id: u64,
    pub payload: Vec<u8>,
}

impl DataItem {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id: 0,
            payload: payload.into(),
        }
    }
}
