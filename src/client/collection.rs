//! Collection handle
//!
//! Block, key and search operations scoped to one named collection.
//!
//! ## Addressing
//! Each key owns an append-only list of blocks, addressed by zero-based
//! index. Relative reads clamp at the boundaries instead of failing:
//! ```text
//! blocks:            [b0] [b1] [b2] [b3]
//! next(1)          =      [b1, b2]
//! next(3)          =                [b3]
//! previous(0)      = [b0]
//! previous(2)      =      [b1, b2]
//! ```

use crate::error::{ApplicationError, ApplicationErrorKind, Result};
use crate::keywords::validate_keywords;
use crate::protocol::{
    AppendItem, BatchOutcome, BlockData, DistanceMetric, KeywordMode, Operation, OperationKind,
    ResponseResult, SearchResultItem, SearchScope,
};

use super::connection::{require_name, Client};

/// A collection bound to a client connection
///
/// The handle borrows the client, so its requests share the connection's
/// one-at-a-time ordering.
pub struct Collection<'c> {
    client: &'c mut Client,
    name: String,

    /// Known when the handle came from create/open; `None` otherwise
    dimensions: Option<u32>,
    metric: Option<DistanceMetric>,
}

impl<'c> Collection<'c> {
    pub(crate) fn known(
        client: &'c mut Client,
        name: &str,
        dimensions: u32,
        metric: DistanceMetric,
    ) -> Self {
        Self {
            client,
            name: name.to_string(),
            dimensions: Some(dimensions),
            metric: Some(metric),
        }
    }

    pub(crate) fn unknown(client: &'c mut Client, name: &str) -> Self {
        Self {
            client,
            name: name.to_string(),
            dimensions: None,
            metric: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimensions(&self) -> Option<u32> {
        self.dimensions
    }

    pub fn metric(&self) -> Option<DistanceMetric> {
        self.metric
    }

    // =========================================================================
    // Blocks
    // =========================================================================

    /// Append a block to `key`, creating the key if needed
    ///
    /// Returns the index the block was stored at.
    pub fn append_block(&mut self, key: &str, block: BlockData) -> Result<u32> {
        self.check_block(key, &block)?;
        let op = Operation::AppendBlock {
            collection: self.name.clone(),
            key: key.to_string(),
            block,
        };
        self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::BlockIndex(index)) => Ok(index),
            other => Err(other),
        })
    }

    /// Append several blocks in one request
    ///
    /// The response's single success flag covers the whole batch. Whether a
    /// failed batch was partially applied is up to the server; do not rely
    /// on all-or-nothing behavior.
    pub fn batch_append_blocks(&mut self, items: Vec<AppendItem>) -> Result<BatchOutcome> {
        if items.is_empty() {
            return Ok(BatchOutcome::default());
        }
        for item in &items {
            self.check_block(&item.key, &item.block)?;
        }

        let count = items.len();
        let op = Operation::BatchAppend {
            collection: self.name.clone(),
            items,
        };
        let outcome = self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::BatchOutcome(outcome)) => Ok(outcome),
            None => Ok(BatchOutcome::default()),
            other => Err(other),
        })?;

        tracing::debug!(
            collection = %self.name,
            items = count,
            applied = outcome.applied_count(),
            "batch appended"
        );
        Ok(outcome)
    }

    /// Get the block at `index`
    ///
    /// Fails with `NotFound` if the key is absent or the index is out of
    /// range.
    pub fn get_block(&mut self, key: &str, index: u32) -> Result<BlockData> {
        let op = Operation::GetBlock {
            collection: self.name.clone(),
            key: key.to_string(),
            index,
        };
        self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::Block(block)) => Ok(block),
            other => Err(other),
        })
    }

    /// `[block[index], block[index + 1]]`, or `[block[index]]` at the last block
    pub fn get_next_block(&mut self, key: &str, index: u32) -> Result<Vec<BlockData>> {
        let op = Operation::GetNextBlock {
            collection: self.name.clone(),
            key: key.to_string(),
            index,
        };
        self.relative_blocks(op)
    }

    /// `[block[index - 1], block[index]]`, or `[block[0]]` at index 0
    pub fn get_previous_block(&mut self, key: &str, index: u32) -> Result<Vec<BlockData>> {
        let op = Operation::GetPreviousBlock {
            collection: self.name.clone(),
            key: key.to_string(),
            index,
        };
        self.relative_blocks(op)
    }

    fn relative_blocks(&mut self, op: Operation) -> Result<Vec<BlockData>> {
        let kind = op.kind();
        let blocks = self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::BlockList(blocks)) => Ok(blocks),
            other => Err(other),
        })?;
        if blocks.is_empty() || blocks.len() > 2 {
            return Err(self.client.protocol_violation(format!(
                "{} returned {} blocks (expected 1 or 2)",
                kind.name(),
                blocks.len()
            )));
        }
        Ok(blocks)
    }

    // =========================================================================
    // Keys
    // =========================================================================

    /// Remove `key` and all of its blocks
    pub fn delete_key(&mut self, key: &str) -> Result<()> {
        self.client.call_unit(Operation::DeleteKey {
            collection: self.name.clone(),
            key: key.to_string(),
        })
    }

    /// Current keys, in no particular order
    pub fn list_keys(&mut self) -> Result<Vec<String>> {
        let op = Operation::ListKeys {
            collection: self.name.clone(),
        };
        self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::KeyList(keys)) => Ok(keys),
            other => Err(other),
        })
    }

    /// Whether `key` exists; an absent key is `false`, not an error
    pub fn contains_key(&mut self, key: &str) -> Result<bool> {
        let op = Operation::ContainsKey {
            collection: self.name.clone(),
            key: key.to_string(),
        };
        check_exists(self.client, op)
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Nearest blocks to `query`, closest first, at most `top_k`
    ///
    /// With keywords, only blocks matching the filter are ranked.
    pub fn search<S: AsRef<str>>(
        &mut self,
        query: &[f32],
        top_k: u32,
        keywords: &[S],
        mode: KeywordMode,
    ) -> Result<Vec<SearchResultItem>> {
        self.run_search(query, top_k, keywords, mode, SearchScope::Global)
    }

    /// Nearest blocks to `query` among the blocks of `key` only
    pub fn search_in_key(
        &mut self,
        key: &str,
        query: &[f32],
        top_k: u32,
    ) -> Result<Vec<SearchResultItem>> {
        require_name(key, "key")?;
        let scope = SearchScope::Key(key.to_string());
        self.run_search::<&str>(query, top_k, &[], KeywordMode::Exact, scope)
    }

    fn run_search<S: AsRef<str>>(
        &mut self,
        query: &[f32],
        top_k: u32,
        keywords: &[S],
        mode: KeywordMode,
        scope: SearchScope,
    ) -> Result<Vec<SearchResultItem>> {
        validate_keywords(keywords)?;
        self.check_vector_len(query.len())?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let op = Operation::Search {
            collection: self.name.clone(),
            query: query.to_vec(),
            top_k,
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            mode,
            scope,
        };
        let mut results = self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::SearchList(items)) => Ok(items),
            None => Ok(Vec::new()),
            other => Err(other),
        })?;

        if results.len() > top_k as usize {
            tracing::warn!(
                collection = %self.name,
                top_k,
                returned = results.len(),
                "server returned more results than requested"
            );
        }
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(top_k as usize);
        Ok(results)
    }

    /// Keys owning at least one block whose keywords satisfy the filter
    pub fn keyword_search<S: AsRef<str>>(
        &mut self,
        keywords: &[S],
        mode: KeywordMode,
    ) -> Result<Vec<String>> {
        if keywords.is_empty() {
            return Err(ApplicationError::new(
                ApplicationErrorKind::InvalidArgument,
                "invalid keyword search: no keywords given",
            )
            .into());
        }
        validate_keywords(keywords)?;

        let op = Operation::KeywordSearch {
            collection: self.name.clone(),
            keywords: keywords.iter().map(|k| k.as_ref().to_string()).collect(),
            mode,
        };
        self.client.call_expecting(op, |result| match result {
            Some(ResponseResult::KeyList(keys)) => Ok(keys),
            None => Ok(Vec::new()),
            other => Err(other),
        })
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Delete this collection; the handle is consumed
    pub fn delete(self) -> Result<()> {
        self.client.delete_collection(&self.name)
    }

    // =========================================================================
    // Validation
    // =========================================================================

    fn check_block(&self, key: &str, block: &BlockData) -> Result<()> {
        require_name(key, "key")?;
        validate_keywords(block.keywords.as_slice())?;
        if let Some(vector) = &block.vector {
            self.check_vector_len(vector.len())?;
        }
        Ok(())
    }

    fn check_vector_len(&self, len: usize) -> Result<()> {
        match self.dimensions {
            Some(dimensions) if dimensions as usize != len => {
                Err(ApplicationError::dimension_mismatch(dimensions, len).into())
            }
            _ => Ok(()),
        }
    }
}

/// Run an existence check
///
/// `Exists(b)` answers directly; a bare success means present; a `NotFound`
/// application error means absent. Every other failure propagates.
pub(crate) fn check_exists(client: &mut Client, op: Operation) -> Result<bool> {
    debug_assert!(matches!(op.kind(), OperationKind::ContainsKey | OperationKind::CheckKey));
    let outcome = client.call_expecting(op, |result| match result {
        Some(ResponseResult::Exists(exists)) => Ok(exists),
        None => Ok(true),
        other => Err(other),
    });
    match outcome {
        Err(e) if e.is_not_found() => Ok(false),
        other => other,
    }
}
