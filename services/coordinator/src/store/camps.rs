//! Camp records: location, capacity, inventory and derived urgency.
//!
//! Two urgency scores exist and are deliberately kept apart:
//!
//! - [`inventory_priority_score`] is stored on the camp and recomputed
//!   inside every inventory write: `min(100, 25 * critical_items)`.
//! - [`presentation_priority_score`] is computed at read time for the
//!   priority list: 50 if occupancy exceeds 90%, plus 50 if any item is
//!   critical.
//!
//! Capacity writes never touch the stored score.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use relief_events::InventoryStatus;
use relief_id::CampId;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use super::CoordinationError;
use crate::geo::GeoPoint;

/// Items with fewer units than this are critical.
pub const CRITICAL_STOCK_THRESHOLD: u64 = 20;

/// Unit recorded when an item is first added without one.
pub const DEFAULT_UNIT: &str = "units";

const SCORE_PER_CRITICAL_ITEM: u32 = 25;
const MAX_PRIORITY_SCORE: u32 = 100;
const OVERCROWDED_RATIO: f64 = 0.9;

// =============================================================================
// Records
// =============================================================================

/// Where a camp is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampLocation {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub address: String,
}

impl CampLocation {
    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lng, self.lat)
    }
}

/// Beds and how many are taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Capacity {
    pub total: u32,
    pub current_occupancy: u32,
}

impl Capacity {
    /// `occupancy / total`; a camp with no beds is overcrowded as soon as
    /// anyone is in it.
    pub fn occupancy_ratio(&self) -> f64 {
        match (self.total, self.current_occupancy) {
            (0, 0) => 0.0,
            (0, _) => f64::INFINITY,
            (total, occupied) => f64::from(occupied) / f64::from(total),
        }
    }
}

/// One tracked supply at a camp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item: String,
    pub quantity: u64,
    pub unit: String,
    pub status: InventoryStatus,
}

/// A relief shelter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camp {
    pub id: CampId,
    pub name: String,
    pub location: CampLocation,
    pub capacity: Capacity,
    pub inventory: Vec<InventoryItem>,
    pub inventory_priority_score: u32,
    pub last_updated: DateTime<Utc>,
}

impl Camp {
    fn item_index(&self, name: &str) -> Option<usize> {
        let wanted = name.to_lowercase();
        self.inventory
            .iter()
            .position(|i| i.item.to_lowercase() == wanted)
    }

    pub fn item(&self, name: &str) -> Option<&InventoryItem> {
        self.item_index(name).map(|i| &self.inventory[i])
    }

    pub fn critical_item_count(&self) -> usize {
        self.inventory
            .iter()
            .filter(|i| i.status.is_critical())
            .count()
    }

    fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

/// Input for creating a camp.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCamp {
    pub name: String,
    pub location: CampLocation,
    #[serde(default)]
    pub capacity: Capacity,
    #[serde(default)]
    pub inventory: Vec<NewInventoryItem>,
}

/// Initial stock line for [`NewCamp`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewInventoryItem {
    pub item: String,
    pub quantity: u64,
    #[serde(default)]
    pub unit: Option<String>,
}

/// A camp with its read-time presentation score attached.
#[derive(Debug, Clone, Serialize)]
pub struct PrioritizedCamp {
    #[serde(flatten)]
    pub camp: Camp,
    pub presentation_priority_score: u32,
}

// =============================================================================
// Scoring
// =============================================================================

/// Status is a pure function of quantity; no hysteresis.
pub fn inventory_status(quantity: u64) -> InventoryStatus {
    if quantity < CRITICAL_STOCK_THRESHOLD {
        InventoryStatus::Critical
    } else {
        InventoryStatus::Stable
    }
}

/// Stored score: 25 per critical item, capped at 100.
pub fn inventory_priority_score(inventory: &[InventoryItem]) -> u32 {
    let critical = inventory.iter().filter(|i| i.status.is_critical()).count() as u32;
    critical
        .saturating_mul(SCORE_PER_CRITICAL_ITEM)
        .min(MAX_PRIORITY_SCORE)
}

/// Read-time score used by the priority list.
pub fn presentation_priority_score(camp: &Camp) -> u32 {
    let overcrowded = camp.capacity.occupancy_ratio() > OVERCROWDED_RATIO;
    let shortage = camp.inventory.iter().any(|i| i.status.is_critical());
    (if overcrowded { 50 } else { 0 }) + (if shortage { 50 } else { 0 })
}

fn validate_item_name(name: &str) -> Result<String, CoordinationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(CoordinationError::validation(
            "item",
            "item name cannot be empty",
        ));
    }
    Ok(name.to_string())
}

// =============================================================================
// Store
// =============================================================================

/// Owns every camp record.
///
/// Each camp sits behind its own mutex, so a write and the status/score
/// recompute it triggers happen in one critical section while writes to
/// different camps proceed independently.
#[derive(Debug, Default)]
pub struct CampStore {
    camps: RwLock<HashMap<CampId, Arc<Mutex<Camp>>>>,
}

impl CampStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: CampId) -> Result<Arc<Mutex<Camp>>, CoordinationError> {
        self.camps
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoordinationError::not_found(CampId::KIND, id))
    }

    /// Creates a camp (seed/admin action).
    pub async fn create(&self, new: NewCamp) -> Result<Camp, CoordinationError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(CoordinationError::validation("name", "camp name cannot be empty"));
        }
        new.location.point().validate("location")?;

        let mut inventory: Vec<InventoryItem> = Vec::with_capacity(new.inventory.len());
        for line in new.inventory {
            let item = validate_item_name(&line.item)?;
            if inventory
                .iter()
                .any(|i| i.item.to_lowercase() == item.to_lowercase())
            {
                return Err(CoordinationError::validation(
                    "inventory",
                    format!("duplicate item '{item}'"),
                ));
            }
            inventory.push(InventoryItem {
                item,
                quantity: line.quantity,
                unit: line.unit.unwrap_or_else(|| DEFAULT_UNIT.to_string()),
                status: inventory_status(line.quantity),
            });
        }

        let camp = Camp {
            id: CampId::new(),
            name,
            location: new.location,
            capacity: new.capacity,
            inventory_priority_score: inventory_priority_score(&inventory),
            inventory,
            last_updated: Utc::now(),
        };

        self.camps
            .write()
            .await
            .insert(camp.id, Arc::new(Mutex::new(camp.clone())));

        info!(camp_id = %camp.id, name = %camp.name, "Camp created");
        Ok(camp)
    }

    pub async fn get(&self, id: CampId) -> Result<Camp, CoordinationError> {
        let entry = self.entry(id).await?;
        let camp = entry.lock().await;
        Ok(camp.clone())
    }

    pub async fn contains(&self, id: CampId) -> bool {
        self.camps.read().await.contains_key(&id)
    }

    /// All camps in creation order.
    pub async fn list(&self) -> Vec<Camp> {
        let entries: Vec<_> = self.camps.read().await.values().cloned().collect();
        let mut camps = Vec::with_capacity(entries.len());
        for entry in entries {
            camps.push(entry.lock().await.clone());
        }
        camps.sort_by_key(|c| c.id);
        camps
    }

    /// Upserts one inventory line (case-insensitive on the item name) and
    /// recomputes the item status and the stored score under the camp lock.
    pub async fn set_inventory_item(
        &self,
        id: CampId,
        item: &str,
        quantity: i64,
        unit: Option<&str>,
    ) -> Result<Camp, CoordinationError> {
        let item = validate_item_name(item)?;
        let quantity = u64::try_from(quantity).map_err(|_| {
            debug!(camp_id = %id, quantity, "Rejected negative inventory quantity");
            CoordinationError::validation("quantity", "quantity must be >= 0")
        })?;
        let unit = unit.map(str::trim).filter(|u| !u.is_empty());

        let entry = self.entry(id).await?;
        let mut camp = entry.lock().await;

        let index = match camp.item_index(&item) {
            Some(index) => {
                let line = &mut camp.inventory[index];
                line.quantity = quantity;
                if let Some(unit) = unit {
                    line.unit = unit.to_string();
                }
                index
            }
            None => {
                camp.inventory.push(InventoryItem {
                    item: item.clone(),
                    quantity,
                    unit: unit.unwrap_or(DEFAULT_UNIT).to_string(),
                    status: InventoryStatus::Stable,
                });
                camp.inventory.len() - 1
            }
        };

        camp.inventory[index].status = inventory_status(quantity);
        camp.inventory_priority_score = inventory_priority_score(&camp.inventory);
        camp.touch();

        info!(
            camp_id = %id,
            item = %camp.inventory[index].item,
            quantity,
            status = %camp.inventory[index].status,
            priority_score = camp.inventory_priority_score,
            "Inventory updated"
        );
        Ok(camp.clone())
    }

    /// Partial capacity update. The stored score is left alone.
    pub async fn set_capacity(
        &self,
        id: CampId,
        total: Option<u32>,
        current_occupancy: Option<u32>,
    ) -> Result<Camp, CoordinationError> {
        let entry = self.entry(id).await?;
        let mut camp = entry.lock().await;

        if let Some(total) = total {
            camp.capacity.total = total;
        }
        if let Some(occupancy) = current_occupancy {
            camp.capacity.current_occupancy = occupancy;
        }
        camp.touch();

        info!(
            camp_id = %id,
            total = camp.capacity.total,
            current_occupancy = camp.capacity.current_occupancy,
            "Capacity updated"
        );
        Ok(camp.clone())
    }

    /// Camps ranked by presentation score, highest first. Ties keep
    /// creation order.
    pub async fn priority_view(&self) -> Vec<PrioritizedCamp> {
        let mut ranked: Vec<PrioritizedCamp> = self
            .list()
            .await
            .into_iter()
            .map(|camp| PrioritizedCamp {
                presentation_priority_score: presentation_priority_score(&camp),
                camp,
            })
            .collect();
        ranked.sort_by(|a, b| b.presentation_priority_score.cmp(&a.presentation_priority_score));
        ranked
    }

    pub async fn len(&self) -> usize {
        self.camps.read().await.len()
    }
}
