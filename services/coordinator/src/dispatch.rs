//! Skill- and distance-constrained volunteer matching.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::geo::GeoPoint;
use crate::store::{CoordinationError, Volunteer, VolunteerRegistry};
use relief_events::VolunteerStatus;

/// Most candidates returned for one need.
pub const MAX_MATCHES: usize = 10;

/// A need to be staffed.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchQuery {
    pub required_skill: String,
    pub origin: GeoPoint,
    pub max_distance_km: f64,
}

impl MatchQuery {
    fn validate(&self) -> Result<(), CoordinationError> {
        if self.required_skill.trim().is_empty() {
            return Err(CoordinationError::validation(
                "required_skill",
                "required skill cannot be empty",
            ));
        }
        self.origin.validate("camp_location")?;
        if !self.max_distance_km.is_finite() || self.max_distance_km < 0.0 {
            return Err(CoordinationError::validation(
                "max_distance_km",
                "max distance must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// A ranked match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub volunteer: Volunteer,
    pub distance_km: f64,
}

/// Filters and ranks a candidate pool against `query`.
///
/// Keeps only Available volunteers holding the skill within the radius,
/// nearest first, at most [`MAX_MATCHES`].
pub fn rank(pool: impl IntoIterator<Item = Volunteer>, query: &MatchQuery) -> Vec<Candidate> {
    let mut ranked: Vec<Candidate> = pool
        .into_iter()
        .filter(|v| v.status == VolunteerStatus::Available && v.has_skill(&query.required_skill))
        .filter_map(|volunteer| {
            let distance_km = query.origin.distance_km(&volunteer.current_location);
            (distance_km <= query.max_distance_km).then_some(Candidate {
                volunteer,
                distance_km,
            })
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.volunteer.id.cmp(&b.volunteer.id))
    });
    ranked.truncate(MAX_MATCHES);
    ranked
}

/// Answers "who can go?" for a need.
#[derive(Debug, Clone)]
pub struct DispatchMatcher {
    registry: Arc<VolunteerRegistry>,
}

impl DispatchMatcher {
    pub fn new(registry: Arc<VolunteerRegistry>) -> Self {
        Self { registry }
    }

    /// Ranked candidates; empty when nobody qualifies.
    pub async fn find_matches(&self, query: &MatchQuery) -> Result<Vec<Candidate>, CoordinationError> {
        query.validate()?;

        let pool = self
            .registry
            .candidates_near(&query.origin, query.max_distance_km)
            .await;
        let pool_size = pool.len();
        let matches = rank(pool, query);

        debug!(
            skill = %query.required_skill,
            max_distance_km = query.max_distance_km,
            pool_size,
            matched = matches.len(),
            "Dispatch match computed"
        );
        Ok(matches)
    }
}
