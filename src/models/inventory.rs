//! Pharmacy inventory
//!
//! Stock is decremented when a chemist dispenses a prescription. A dispense is
//! all-or-nothing: either every item is taken or nothing changes.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::error::{Result, TriageError};
use crate::models::diagnosis::PrescriptionItem;

/// A stocked drug
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Drug name as shown on prescriptions
    pub drug_name: String,
    /// Units in stock
    pub quantity: u32,
    /// Unit of issue (tablets, sachets, vials, ...)
    pub unit: String,
    /// Stock level at or below which a reorder alert is raised
    pub reorder_level: u32,
}

impl InventoryItem {
    /// Create a new inventory item with the default reorder level
    #[must_use]
    pub fn new(drug_name: impl Into<String>, quantity: u32, unit: impl Into<String>) -> Self {
        Self {
            drug_name: drug_name.into(),
            quantity,
            unit: unit.into(),
            reorder_level: 10,
        }
    }

    /// Set the reorder level
    #[must_use]
    pub fn with_reorder_level(mut self, level: u32) -> Self {
        self.reorder_level = level;
        self
    }

    /// Whether stock is at or below the reorder level
    #[must_use]
    pub const fn needs_reorder(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

fn stock_key(drug: &str) -> String {
    drug.trim().to_lowercase()
}

/// Thread-safe inventory keyed by normalized drug name
#[derive(Debug, Default)]
pub struct Inventory {
    items: Mutex<FxHashMap<String, InventoryItem>>,
}

impl Inventory {
    /// Create an empty inventory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an inventory from a list of items
    #[must_use]
    pub fn with_items(items: impl IntoIterator<Item = InventoryItem>) -> Self {
        let inventory = Self::new();
        for item in items {
            inventory.restock(item);
        }
        inventory
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, InventoryItem>> {
        // Stock updates never panic while holding the lock
        self.items.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Add stock, merging with an existing entry of the same drug
    pub fn restock(&self, item: InventoryItem) {
        let mut items = self.lock();
        items
            .entry(stock_key(&item.drug_name))
            .and_modify(|existing| {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                existing.reorder_level = item.reorder_level;
            })
            .or_insert(item);
    }

    /// Current quantity of a drug (0 when not stocked)
    #[must_use]
    pub fn quantity(&self, drug: &str) -> u32 {
        self.lock()
            .get(&stock_key(drug))
            .map_or(0, |item| item.quantity)
    }

    /// Take every prescribed item out of stock, or nothing at all
    ///
    /// Returns the items that dropped to or below their reorder level.
    pub fn dispense(&self, items: &[PrescriptionItem]) -> Result<Vec<InventoryItem>> {
        let mut stock = self.lock();

        // Sum requests per drug so repeated lines cannot overdraw
        let mut requested: FxHashMap<String, (String, u32)> = FxHashMap::default();
        for item in items {
            let entry = requested
                .entry(stock_key(&item.drug))
                .or_insert_with(|| (item.drug.clone(), 0));
            entry.1 = entry.1.saturating_add(item.quantity);
        }

        for (key, (drug, quantity)) in &requested {
            let available = stock.get(key).map_or(0, |s| s.quantity);
            if available < *quantity {
                return Err(TriageError::InsufficientInventory {
                    drug: drug.clone(),
                    requested: *quantity,
                    available,
                });
            }
        }

        let mut low = Vec::new();
        for (key, (_, quantity)) in requested {
            if let Some(item) = stock.get_mut(&key) {
                item.quantity -= quantity;
                if item.needs_reorder() {
                    low.push(item.clone());
                }
            }
        }
        low.sort_by(|a, b| a.drug_name.cmp(&b.drug_name));
        Ok(low)
    }

    /// Put previously dispensed items back (used when a dispense is abandoned)
    pub fn return_items(&self, items: &[PrescriptionItem]) {
        let mut stock = self.lock();
        for item in items {
            if let Some(existing) = stock.get_mut(&stock_key(&item.drug)) {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
        }
    }

    /// Items at or below their reorder level, sorted by name
    #[must_use]
    pub fn low_stock(&self) -> Vec<InventoryItem> {
        let mut low: Vec<_> = self
            .lock()
            .values()
            .filter(|item| item.needs_reorder())
            .cloned()
            .collect();
        low.sort_by(|a, b| a.drug_name.cmp(&b.drug_name));
        low
    }
}
