//! Request definitions
//!
//! A request is an envelope (version + id) around exactly one operation.

use serde::{Deserialize, Serialize};

use crate::correlator::RequestId;

use super::types::{AppendItem, BlockData, DistanceMetric, KeywordMode, SearchScope};
use super::PROTOCOL_VERSION;

/// Operation kinds with their wire tags
///
/// The tag of each kind equals the variant index of [`Operation`].
/// Variants are only ever appended, so these values never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OperationKind {
    // Administrative
    CreateCollection = 0x00,
    DeleteCollection = 0x01,
    ListCollections = 0x02,

    // Blocks
    AppendBlock = 0x03,
    BatchAppend = 0x04,
    GetBlock = 0x05,
    DeleteKey = 0x06,
    ListKeys = 0x07,
    ContainsKey = 0x08,
    GetNextBlock = 0x09,
    GetPreviousBlock = 0x0A,

    // Search
    Search = 0x0B,
    KeywordSearch = 0x0C,

    // Flat key -> value-list generation
    AddValue = 0x0D,
    GetValue = 0x0E,
    UpdateValue = 0x0F,
    GetLength = 0x10,
    SearchGlobal = 0x11,
    Snapshot = 0x12,
    GetKeys = 0x13,
    GetValueList = 0x14,
    CheckKey = 0x15,
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::CreateCollection => "create_collection",
            OperationKind::DeleteCollection => "delete_collection",
            OperationKind::ListCollections => "list_collections",
            OperationKind::AppendBlock => "append_block",
            OperationKind::BatchAppend => "batch_append",
            OperationKind::GetBlock => "get_block",
            OperationKind::DeleteKey => "delete_key",
            OperationKind::ListKeys => "list_keys",
            OperationKind::ContainsKey => "contains_key",
            OperationKind::GetNextBlock => "get_next_block",
            OperationKind::GetPreviousBlock => "get_previous_block",
            OperationKind::Search => "search",
            OperationKind::KeywordSearch => "keyword_search",
            OperationKind::AddValue => "add_value",
            OperationKind::GetValue => "get_value",
            OperationKind::UpdateValue => "update_value",
            OperationKind::GetLength => "get_length",
            OperationKind::SearchGlobal => "search_global",
            OperationKind::Snapshot => "snapshot",
            OperationKind::GetKeys => "get_keys",
            OperationKind::GetValueList => "get_value_list",
            OperationKind::CheckKey => "check_key",
        }
    }
}

/// One operation payload
///
/// NOTE: the declaration order is the wire tag. Add new operations at the
/// end only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    CreateCollection {
        name: String,
        dimensions: u32,
        metric: DistanceMetric,
    },
    DeleteCollection {
        name: String,
    },
    ListCollections,

    AppendBlock {
        collection: String,
        key: String,
        block: BlockData,
    },
    BatchAppend {
        collection: String,
        items: Vec<AppendItem>,
    },
    GetBlock {
        collection: String,
        key: String,
        index: u32,
    },
    DeleteKey {
        collection: String,
        key: String,
    },
    ListKeys {
        collection: String,
    },
    ContainsKey {
        collection: String,
        key: String,
    },
    GetNextBlock {
        collection: String,
        key: String,
        index: u32,
    },
    GetPreviousBlock {
        collection: String,
        key: String,
        index: u32,
    },

    Search {
        collection: String,
        query: Vec<f32>,
        top_k: u32,
        keywords: Vec<String>,
        mode: KeywordMode,
        scope: SearchScope,
    },
    KeywordSearch {
        collection: String,
        keywords: Vec<String>,
        mode: KeywordMode,
    },

    AddValue {
        key: String,
        payload: Vec<u8>,
    },
    GetValue {
        key: String,
        index: u32,
    },
    UpdateValue {
        key: String,
        index: u32,
        payload: Vec<u8>,
    },
    GetLength {
        key: String,
    },
    SearchGlobal {
        pattern: Vec<u8>,
    },
    Snapshot {
        name: String,
    },
    GetKeys,
    GetValueList {
        key: String,
    },
    CheckKey {
        key: String,
    },
}

impl Operation {
    /// Get the operation kind
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::CreateCollection { .. } => OperationKind::CreateCollection,
            Operation::DeleteCollection { .. } => OperationKind::DeleteCollection,
            Operation::ListCollections => OperationKind::ListCollections,
            Operation::AppendBlock { .. } => OperationKind::AppendBlock,
            Operation::BatchAppend { .. } => OperationKind::BatchAppend,
            Operation::GetBlock { .. } => OperationKind::GetBlock,
            Operation::DeleteKey { .. } => OperationKind::DeleteKey,
            Operation::ListKeys { .. } => OperationKind::ListKeys,
            Operation::ContainsKey { .. } => OperationKind::ContainsKey,
            Operation::GetNextBlock { .. } => OperationKind::GetNextBlock,
            Operation::GetPreviousBlock { .. } => OperationKind::GetPreviousBlock,
            Operation::Search { .. } => OperationKind::Search,
            Operation::KeywordSearch { .. } => OperationKind::KeywordSearch,
            Operation::AddValue { .. } => OperationKind::AddValue,
            Operation::GetValue { .. } => OperationKind::GetValue,
            Operation::UpdateValue { .. } => OperationKind::UpdateValue,
            Operation::GetLength { .. } => OperationKind::GetLength,
            Operation::SearchGlobal { .. } => OperationKind::SearchGlobal,
            Operation::Snapshot { .. } => OperationKind::Snapshot,
            Operation::GetKeys => OperationKind::GetKeys,
            Operation::GetValueList { .. } => OperationKind::GetValueList,
            Operation::CheckKey { .. } => OperationKind::CheckKey,
        }
    }
}

/// A request envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version the sender speaks
    pub version: u16,

    pub request_id: RequestId,

    pub operation: Operation,
}

impl Request {
    pub fn new(request_id: RequestId, operation: Operation) -> Self {
        Self {
            version: PROTOCOL_VERSION,
            request_id,
            operation,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.operation.kind()
    }
}
