//! Flat key -> value-list API
//!
//! The older protocol generation: no collections, no vectors, each key maps
//! to a list of opaque payloads. Kept alongside the collection API and not
//! merged with it.

use crate::error::Result;
use crate::protocol::{DataItem, Operation, ResponseResult};

use super::collection::check_exists;
use super::connection::{require_name, Client};

impl Client {
    /// Append a payload to `key`'s value list
    pub fn add_value(&mut self, key: &str, payload: impl Into<Vec<u8>>) -> Result<()> {
        require_name(key, "key")?;
        self.call_unit(Operation::AddValue {
            key: key.to_string(),
            payload: payload.into(),
        })
    }

    /// Get the value at `index` in `key`'s list
    pub fn get_value(&mut self, key: &str, index: u32) -> Result<DataItem> {
        let op = Operation::GetValue {
            key: key.to_string(),
            index,
        };
        self.call_expecting(op, |result| match result {
            Some(ResponseResult::Item(item)) => Ok(item),
            other => Err(other),
        })
    }

    /// Overwrite the value at `index`
    pub fn update_value(
        &mut self,
        key: &str,
        index: u32,
        payload: impl Into<Vec<u8>>,
    ) -> Result<()> {
        self.call_unit(Operation::UpdateValue {
            key: key.to_string(),
            index,
            payload: payload.into(),
        })
    }

    /// Number of values stored under `key` (0 when absent)
    pub fn get_length(&mut self, key: &str) -> Result<u64> {
        let op = Operation::GetLength { key: key.to_string() };
        self.call_expecting(op, |result| match result {
            Some(ResponseResult::Length(len)) => Ok(len),
            other => Err(other),
        })
    }

    /// Values whose payload contains `pattern`
    pub fn search_global(&mut self, pattern: impl Into<Vec<u8>>) -> Result<Vec<DataItem>> {
        let op = Operation::SearchGlobal {
            pattern: pattern.into(),
        };
        self.call_expecting(op, |result| match result {
            Some(ResponseResult::ValueList(items)) => Ok(items),
            None => Ok(Vec::new()),
            other => Err(other),
        })
    }

    /// Ask the server to write a named snapshot
    pub fn snapshot(&mut self, name: &str) -> Result<()> {
        require_name(name, "snapshot name")?;
        self.call_unit(Operation::Snapshot { name: name.to_string() })
    }

    /// Every key of the flat store
    pub fn get_keys(&mut self) -> Result<Vec<String>> {
        self.call_expecting(Operation::GetKeys, |result| match result {
            Some(ResponseResult::KeyList(keys)) => Ok(keys),
            None => Ok(Vec::new()),
            other => Err(other),
        })
    }

    /// All values of `key`, in insertion order
    pub fn get_value_list(&mut self, key: &str) -> Result<Vec<DataItem>> {
        let op = Operation::GetValueList { key: key.to_string() };
        self.call_expecting(op, |result| match result {
            Some(ResponseResult::ValueList(items)) => Ok(items),
            other => Err(other),
        })
    }

    /// Whether `key` holds at least one value
    pub fn check_key(&mut self, key: &str) -> Result<bool> {
        check_exists(self, Operation::CheckKey { key: key.to_string() })
    }
}
