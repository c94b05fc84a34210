use rayon::prelude::*;

use crate::geo::DistanceSpace;
use crate::model::{
    BudgetTier, Facility, FacilityDirectory, FacilityScore, LatencySensitivity, RedundancyTier,
    RequirementsProfile, ScoreBreakdown, Site,
};

/// Distance beyond which a facility contributes nothing to the distance
/// component.
const MAX_MEANINGFUL_DISTANCE_MILES: f64 = 2_500.0;
const DISTANCE_WEIGHT: f64 = 40.0;

/// Cost bonus for low-cost facilities under a minimal budget, and the flat
/// bonus applied otherwise.
const LOW_COST_BONUS: f64 = 20.0;
const BASE_COST_BONUS: f64 = 8.0;

const PERFORMANCE_BONUS: f64 = 25.0;
const PERFORMANCE_NEAR_MILES: f64 = 800.0;

const REDUNDANCY_BONUS: f64 = 15.0;
const REDUNDANCY_NEARBY_MILES: f64 = 1_200.0;

const ONRAMP_BONUS: f64 = 30.0;

const MAX_SCORE: f64 = 100.0;

/// Score every (site, facility) pair for heat-map rendering.
///
/// Returns one entry per pair, grouped by site in input order and sorted by
/// score descending within each site. Sites without usable coordinates are
/// skipped. Weights are fixed constants; the per-component breakdown is
/// kept on each entry for auditability.
pub fn score_all(
    sites: &[Site],
    facilities: &[Facility],
    requirements: &RequirementsProfile,
    directory: &FacilityDirectory,
    space: DistanceSpace,
) -> Vec<FacilityScore> {
    // Whether some other facility sits close enough to back each one up.
    let has_backup: Vec<bool> = facilities
        .iter()
        .map(|f| {
            facilities.iter().any(|g| {
                g.id != f.id
                    && space.distance_miles(f.location, g.location) <= REDUNDANCY_NEARBY_MILES
            })
        })
        .collect();

    let per_site: Vec<Vec<FacilityScore>> = sites
        .par_iter()
        .filter_map(|site| {
            site.location
                .filter(|p| space.contains(*p))
                .map(|location| (site, location))
        })
        .map(|(site, location)| {
            let mut rows: Vec<FacilityScore> = facilities
                .iter()
                .enumerate()
                .map(|(idx, facility)| {
                    let distance = space.distance_miles(location, facility.location);
                    let breakdown = ScoreBreakdown {
                        distance: distance_component(distance),
                        cost: cost_component(requirements, directory, &facility.id),
                        performance: performance_component(requirements, distance),
                        redundancy: redundancy_component(requirements, has_backup[idx]),
                        onramp: if directory.onramp_eligible(site, facility, space) {
                            ONRAMP_BONUS
                        } else {
                            0.0
                        },
                    };
                    FacilityScore {
                        site_id: site.id.clone(),
                        facility_id: facility.id.clone(),
                        score: breakdown.total().clamp(0.0, MAX_SCORE),
                        distance_miles: distance,
                        breakdown,
                    }
                })
                .collect();
            rows.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then_with(|| a.facility_id.cmp(&b.facility_id))
            });
            rows
        })
        .collect();

    per_site.into_iter().flatten().collect()
}

fn distance_component(distance_miles: f64) -> f64 {
    ((MAX_MEANINGFUL_DISTANCE_MILES - distance_miles) / MAX_MEANINGFUL_DISTANCE_MILES).max(0.0)
        * DISTANCE_WEIGHT
}

fn cost_component(
    requirements: &RequirementsProfile,
    directory: &FacilityDirectory,
    facility_id: &str,
) -> f64 {
    if requirements.budget == BudgetTier::Minimal && directory.is_low_cost(facility_id) {
        LOW_COST_BONUS
    } else {
        BASE_COST_BONUS
    }
}

fn performance_component(requirements: &RequirementsProfile, distance_miles: f64) -> f64 {
    let sensitive = matches!(
        requirements.latency_sensitivity,
        LatencySensitivity::Low | LatencySensitivity::Critical
    );
    if sensitive && distance_miles < PERFORMANCE_NEAR_MILES {
        PERFORMANCE_BONUS
    } else {
        0.0
    }
}

fn redundancy_component(requirements: &RequirementsProfile, has_backup: bool) -> f64 {
    let wants = matches!(
        requirements.redundancy,
        RedundancyTier::High | RedundancyTier::MissionCritical
    );
    if wants && has_backup {
        REDUNDANCY_BONUS
    } else {
        0.0
    }
}
