//! Volunteer records and their spatial index.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use relief_events::VolunteerStatus;
use relief_id::VolunteerId;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use super::CoordinationError;
use crate::geo::{GeoPoint, GridIndex};

/// Field personnel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Volunteer {
    pub id: VolunteerId,
    pub name: String,
    pub phone: String,
    pub skills: Vec<String>,
    pub status: VolunteerStatus,
    pub current_location: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Volunteer {
    /// Exact, case-sensitive skill tag match.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// Registration input.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVolunteer {
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Starting position; the placeholder point when absent.
    #[serde(default)]
    pub current_location: Option<GeoPoint>,
}

/// Optional filters for [`VolunteerRegistry::list`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VolunteerFilter {
    pub skill: Option<String>,
    pub status: Option<VolunteerStatus>,
}

/// Exclusive hold on one volunteer record.
///
/// Only the status can be changed through it; moving a volunteer goes
/// through [`VolunteerRegistry::set_status`] so the index stays in sync.
pub struct VolunteerLock {
    guard: OwnedMutexGuard<Volunteer>,
}

impl VolunteerLock {
    pub fn record(&self) -> &Volunteer {
        &self.guard
    }

    pub fn set_status(&mut self, status: VolunteerStatus) {
        self.guard.status = status;
        self.guard.updated_at = Utc::now();
    }
}

/// Owns every volunteer record.
#[derive(Debug, Default)]
pub struct VolunteerRegistry {
    records: RwLock<HashMap<VolunteerId, Arc<Mutex<Volunteer>>>>,
    index: RwLock<GridIndex>,
    phones: Mutex<HashMap<String, VolunteerId>>,
}

impl VolunteerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, id: VolunteerId) -> Result<Arc<Mutex<Volunteer>>, CoordinationError> {
        self.records
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| CoordinationError::not_found(VolunteerId::KIND, id))
    }

    /// Registers a volunteer as `Available`.
    pub async fn register(&self, new: NewVolunteer) -> Result<Volunteer, CoordinationError> {
        let name = new.name.trim().to_string();
        if name.is_empty() {
            return Err(CoordinationError::validation("name", "name cannot be empty"));
        }

        let location = new.current_location.unwrap_or(GeoPoint::PLACEHOLDER);
        location.validate("current_location")?;

        let mut skills: Vec<String> = Vec::with_capacity(new.skills.len());
        for skill in new.skills {
            let skill = skill.trim();
            if !skill.is_empty() && !skills.iter().any(|s| s == skill) {
                skills.push(skill.to_string());
            }
        }

        let phone = new.phone.trim().to_string();
        let now = Utc::now();
        let volunteer = Volunteer {
            id: VolunteerId::new(),
            name,
            phone: phone.clone(),
            skills,
            status: VolunteerStatus::Available,
            current_location: location,
            created_at: now,
            updated_at: now,
        };

        if !phone.is_empty() {
            let mut phones = self.phones.lock().await;
            if phones.contains_key(&phone) {
                debug!(phone = %phone, "Rejected duplicate volunteer phone");
                return Err(CoordinationError::validation(
                    "phone",
                    format!("phone {phone} is already registered"),
                ));
            }
            phones.insert(phone, volunteer.id);
        }

        self.records
            .write()
            .await
            .insert(volunteer.id, Arc::new(Mutex::new(volunteer.clone())));
        self.index.write().await.upsert(volunteer.id, &location);

        info!(volunteer_id = %volunteer.id, name = %volunteer.name, "Volunteer registered");
        Ok(volunteer)
    }

    pub async fn get(&self, id: VolunteerId) -> Result<Volunteer, CoordinationError> {
        let entry = self.entry(id).await?;
        let volunteer = entry.lock().await;
        Ok(volunteer.clone())
    }

    /// Volunteers in registration order, optionally filtered.
    pub async fn list(&self, filter: &VolunteerFilter) -> Vec<Volunteer> {
        let entries: Vec<_> = self.records.read().await.values().cloned().collect();
        let mut out = Vec::new();
        for entry in entries {
            let v = entry.lock().await;
            let skill_ok = filter.skill.as_deref().is_none_or(|s| v.has_skill(s));
            let status_ok = filter.status.is_none_or(|s| v.status == s);
            if skill_ok && status_ok {
                out.push(v.clone());
            }
        }
        out.sort_by_key(|v| v.id);
        out
    }

    /// Sets availability and, if given, moves the volunteer.
    pub async fn set_status(
        &self,
        id: VolunteerId,
        status: VolunteerStatus,
        location: Option<GeoPoint>,
    ) -> Result<Volunteer, CoordinationError> {
        if let Some(location) = &location {
            location.validate("current_location")?;
        }

        let entry = self.entry(id).await?;
        let mut volunteer = entry.lock().await;

        volunteer.status = status;
        if let Some(location) = location {
            volunteer.current_location = location;
            self.index.write().await.upsert(id, &location);
        }
        volunteer.updated_at = Utc::now();

        info!(volunteer_id = %id, status = %status, "Volunteer status updated");
        Ok(volunteer.clone())
    }

    /// Locks one record for a multi-record write.
    ///
    /// Callers that also hold other record locks must take them in a fixed
    /// order (task first, then volunteer).
    pub async fn lock(&self, id: VolunteerId) -> Result<VolunteerLock, CoordinationError> {
        let entry = self.entry(id).await?;
        Ok(VolunteerLock {
            guard: entry.lock_owned().await,
        })
    }

    /// Snapshots of every volunteer the index places near `origin`.
    ///
    /// This is a superset; callers still apply the exact distance check.
    pub async fn candidates_near(&self, origin: &GeoPoint, radius_km: f64) -> Vec<Volunteer> {
        let ids = self.index.read().await.candidates_within(origin, radius_km);
        let entries: Vec<_> = {
            let records = self.records.read().await;
            ids.iter().filter_map(|id| records.get(id).cloned()).collect()
        };

        let mut out = Vec::with_capacity(entries.len());
        for entry in entries {
            out.push(entry.lock().await.clone());
        }
        out
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}
