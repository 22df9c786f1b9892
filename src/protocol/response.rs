//! Response definitions
//!
//! Represents responses from the server.

use serde::{Deserialize, Serialize};

use crate::correlator::RequestId;
use crate::error::{ApplicationError, Result, WaddleError};

use super::types::{BatchOutcome, BlockData, CollectionInfo, DataItem, SearchResultItem};

/// Result payload of a successful response
///
/// Same append-only rule as [`Operation`](super::Operation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResponseResult {
    Block(BlockData),
    BlockList(Vec<BlockData>),
    KeyList(Vec<String>),
    SearchList(Vec<SearchResultItem>),
    CollectionList(Vec<CollectionInfo>),
    BlockIndex(u32),
    BatchOutcome(BatchOutcome),
    Exists(bool),
    Length(u64),
    Item(DataItem),
    ValueList(Vec<DataItem>),
}

impl ResponseResult {
    pub fn name(&self) -> &'static str {
        match self {
            ResponseResult::Block(_) => "block",
            ResponseResult::BlockList(_) => "block_list",
            ResponseResult::KeyList(_) => "key_list",
            ResponseResult::SearchList(_) => "search_list",
            ResponseResult::CollectionList(_) => "collection_list",
            ResponseResult::BlockIndex(_) => "block_index",
            ResponseResult::BatchOutcome(_) => "batch_outcome",
            ResponseResult::Exists(_) => "exists",
            ResponseResult::Length(_) => "length",
            ResponseResult::Item(_) => "item",
            ResponseResult::ValueList(_) => "value_list",
        }
    }
}

/// A response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Id of the request this answers
    pub request_id: RequestId,

    pub success: bool,

    /// Server message when `success` is false
    pub error_message: Option<String>,

    pub result: Option<ResponseResult>,
}

impl Response {
    /// Create a successful response with optional result
    pub fn ok(request_id: RequestId, result: Option<ResponseResult>) -> Self {
        Self {
            request_id,
            success: true,
            error_message: None,
            result,
        }
    }

    /// Create a failed response
    pub fn error(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id,
            success: false,
            error_message: Some(message.into()),
            result: None,
        }
    }

    /// Turn `success = false` into an application error and hand back the
    /// result payload otherwise
    pub fn into_result(self) -> Result<Option<ResponseResult>> {
        if self.success {
            return Ok(self.result);
        }
        let message = self
            .error_message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "request failed without a message".to_string());
        Err(WaddleError::Application(ApplicationError::from_server(message)))
    }
}
