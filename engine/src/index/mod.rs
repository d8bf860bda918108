use std::collections::BTreeMap;

use crate::error::{Error, Result};

#[derive(Debug, Default, Clone)]
pub struct PrimaryIndex {
    // Key: the row's lookup key
    // Value: position of the row in the table
    pub map: BTreeMap<String, usize>,
}

impl PrimaryIndex {
    pub fn new() -> Self {
        Self {
            map: BTreeMap::new(),
        }
    }

    /// Indexes keys in row order. When a file carries the same key twice
    /// only the first row is reachable, matching a front-to-back scan.
    pub fn build<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::new();
        for (pos, key) in keys.into_iter().enumerate() {
            index.map.entry(key.to_string()).or_insert(pos);
        }
        index
    }

    pub fn insert(&mut self, key: String, pos: usize) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(Error::DuplicateKey(key));
        }
        self.map.insert(key, pos);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<usize> {
        self.map.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }
}
