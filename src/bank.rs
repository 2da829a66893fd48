// src/bank.rs

use crate::error::{ensure_finite, AssessmentError, Result};
use crate::models::{Category, Item, ItemId, ItemLevel};
use log::{debug, info};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::Path;
use std::str::FromStr;

// Wire shape of a question-bank export
#[derive(Deserialize, Debug)]
pub struct JsonItem {
    pub id: String,
    pub category: String,
    pub difficulty: f64,
    pub level: String,
}

impl TryFrom<JsonItem> for Item {
    type Error = AssessmentError;

    fn try_from(raw: JsonItem) -> Result<Self> {
        let difficulty = ensure_finite(&format!("difficulty of item {}", raw.id), raw.difficulty)?;
        Ok(Item {
            category: Category::from_str(&raw.category)?,
            level: ItemLevel::from_str(&raw.level)?,
            id: ItemId::from(raw.id),
            difficulty,
        })
    }
}

/// Read-only candidate pool handed to the selector.
#[derive(Debug, Clone)]
pub struct ItemBank {
    items: Vec<Item>,
    index: HashMap<ItemId, usize>,
}

impl ItemBank {
    pub fn from_items(items: Vec<Item>) -> Result<Self> {
        let mut index = HashMap::with_capacity(items.len());
        for (pos, item) in items.iter().enumerate() {
            ensure_finite(&format!("difficulty of item {}", item.id), item.difficulty)?;
            if index.insert(item.id.clone(), pos).is_some() {
                return Err(AssessmentError::InvalidInput(format!(
                    "duplicate item id {} in bank",
                    item.id
                )));
            }
        }
        debug!("Item bank built with {} items", items.len());
        Ok(ItemBank { items, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: Vec<JsonItem> = serde_json::from_str(json)?;
        let items = raw
            .into_iter()
            .map(Item::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::from_items(items)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading item bank from {:?}", path);
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Built-in starter bank: seven items per category spread over [-2.6, 2.6].
    pub fn sample() -> Result<Self> {
        Self::from_json_str(include_str!("data/sample_bank.json"))
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.index.get(id).map(|&pos| &self.items[pos])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn categories(&self) -> BTreeSet<Category> {
        self.items.iter().map(|i| i.category).collect()
    }

    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for item in &self.items {
            *counts.entry(item.category).or_insert(0) += 1;
        }
        counts
    }
}
