//! Demo data for dev mode.

use rand::Rng;
use tracing::info;

use crate::geo::GeoPoint;
use crate::state::AppState;
use crate::store::camps::{CampLocation, Capacity, NewInventoryItem};
use crate::store::{CoordinationError, NewCamp, NewVolunteer};
use relief_events::VolunteerStatus;

pub const CAMP_COUNT: usize = 10;
pub const VOLUNTEER_COUNT: usize = 30;

const CAMP_CAPACITY: u32 = 500;
const SKILLS: [&str; 5] = ["Medical", "Cooking", "Driving", "Construction", "Translation"];
const SUPPLIES: [(&str, &str); 5] = [
    ("Water", "liters"),
    ("Blankets", "units"),
    ("First Aid Kits", "units"),
    ("Food Rations", "units"),
    ("Flashlights", "units"),
];
const FIRST_NAMES: [&str; 10] = [
    "Asha", "Bikash", "Chandan", "Dipika", "Farhan", "Gita", "Hemanta", "Ishita", "Jyoti", "Kabir",
];
const LAST_NAMES: [&str; 6] = ["Das", "Bora", "Gogoi", "Saikia", "Kalita", "Baruah"];

/// Everything the seeder inserts, decided up front.
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub camps: Vec<NewCamp>,
    pub volunteers: Vec<(NewVolunteer, VolunteerStatus)>,
}

fn random_point(rng: &mut impl Rng) -> GeoPoint {
    GeoPoint::new(rng.random_range(92.9..93.4), rng.random_range(26.2..26.7))
}

/// Draws a plan. Every third camp is short on water.
pub fn plan(rng: &mut impl Rng) -> SeedPlan {
    let camps = (0..CAMP_COUNT)
        .map(|i| {
            let letter = char::from(b'A' + i as u8);
            let point = random_point(rng);
            let inventory = SUPPLIES
                .iter()
                .map(|(item, unit)| {
                    let quantity = if *item == "Water" && i % 3 == 0 {
                        5
                    } else {
                        rng.random_range(10..500)
                    };
                    NewInventoryItem {
                        item: item.to_string(),
                        quantity,
                        unit: Some(unit.to_string()),
                    }
                })
                .collect();
            NewCamp {
                name: format!("Relief Camp {letter}"),
                location: CampLocation {
                    lat: point.lat,
                    lng: point.lng,
                    address: format!("Sector {}, Assam", i + 1),
                },
                capacity: Capacity {
                    total: CAMP_CAPACITY,
                    current_occupancy: rng.random_range(0..=CAMP_CAPACITY),
                },
                inventory,
            }
        })
        .collect();

    let volunteers = (0..VOLUNTEER_COUNT)
        .map(|i| {
            let first = FIRST_NAMES[rng.random_range(0..FIRST_NAMES.len())];
            let last = LAST_NAMES[rng.random_range(0..LAST_NAMES.len())];
            let skill = SKILLS[rng.random_range(0..SKILLS.len())];
            let status = if rng.random_bool(0.8) {
                VolunteerStatus::Available
            } else {
                VolunteerStatus::OnMission
            };
            let volunteer = NewVolunteer {
                name: format!("{first} {last}"),
                phone: format!("+91-98000-{:05}", i + 1),
                skills: vec![skill.to_string()],
                current_location: Some(random_point(rng)),
            };
            (volunteer, status)
        })
        .collect();

    SeedPlan { camps, volunteers }
}

/// Inserts a random plan into `state`.
pub async fn seed(state: &AppState) -> Result<(), CoordinationError> {
    let plan = plan(&mut rand::rng());
    apply(state, plan).await
}

pub async fn apply(state: &AppState, plan: SeedPlan) -> Result<(), CoordinationError> {
    let camp_count = plan.camps.len();
    for camp in plan.camps {
        state.camps().create(camp).await?;
    }

    let volunteer_count = plan.volunteers.len();
    for (new, status) in plan.volunteers {
        let volunteer = state.volunteers().register(new).await?;
        if status != VolunteerStatus::Available {
            state.volunteers().set_status(volunteer.id, status, None).await?;
        }
    }

    info!(camps = camp_count, volunteers = volunteer_count, "Seeded demo data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::camps::CRITICAL_STOCK_THRESHOLD;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_plan_shape() {
        let plan = plan(&mut StdRng::seed_from_u64(7));
        assert_eq!(plan.camps.len(), CAMP_COUNT);
        assert_eq!(plan.volunteers.len(), VOLUNTEER_COUNT);
        assert_eq!(plan.camps[0].name, "Relief Camp A");
        assert_eq!(plan.camps[9].name, "Relief Camp J");

        for camp in &plan.camps {
            assert!((26.2..26.7).contains(&camp.location.lat));
            assert!((92.9..93.4).contains(&camp.location.lng));
            assert_eq!(camp.capacity.total, CAMP_CAPACITY);
            assert_eq!(camp.inventory.len(), SUPPLIES.len());
        }
        let water = plan.camps[3]
            .inventory
            .iter()
            .find(|i| i.item == "Water")
            .unwrap();
        assert_eq!(water.quantity, 5);
        assert!(water.quantity < CRITICAL_STOCK_THRESHOLD);
    }

    #[tokio::test]
    async fn test_apply_populates_state() {
        let state = AppState::default();
        apply(&state, plan(&mut StdRng::seed_from_u64(11)))
            .await
            .unwrap();
        assert_eq!(state.camps().len().await, CAMP_COUNT);
        assert_eq!(state.volunteers().len().await, VOLUNTEER_COUNT);

        let ranked = state.camps().priority_view().await;
        assert!(ranked[0].presentation_priority_score >= 50);
    }
}
