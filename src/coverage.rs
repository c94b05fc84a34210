use std::collections::{BTreeSet, HashMap};

use crate::geo::{DistanceSpace, GeoPoint};
use crate::model::{
    Assignment, BudgetTier, Facility, FacilityDirectory, PrimaryGoal, RedundancyTier,
    RequirementsProfile, SelectionResult, Site,
};
use crate::nearest::resolve_nearest;

/// Active facilities further apart than this from every other active
/// facility count as geographically diverse.
pub const DIVERSITY_THRESHOLD_MILES: f64 = 1_200.0;

/// Minimum previously-uncovered sites a facility must capture before the
/// expansion step activates it (1 when the primary goal is performance).
const EXPANSION_MIN_CAPTURE: usize = 2;

/// Select the minimal set of active facilities for the given sites and
/// requirements profile.
///
/// Policy, in priority order: dedicated-onramp guarantees, efficiency-first
/// base selection, budget-gated coverage expansion, redundancy expansion.
/// Deterministic for identical inputs; passes are bounded by the number of
/// candidate facilities.
pub fn select_facilities(
    sites: &[Site],
    facilities: &[Facility],
    requirements: &RequirementsProfile,
    directory: &FacilityDirectory,
    space: DistanceSpace,
) -> SelectionResult {
    let mut active: BTreeSet<String> = BTreeSet::new();
    if sites.is_empty() || facilities.is_empty() {
        return SelectionResult {
            active_facility_ids: active,
        };
    }

    let threshold = requirements.clamped_threshold_miles();
    let pairs: Vec<(&Site, Assignment)> = sites
        .iter()
        .filter_map(|site| {
            resolve_nearest(site, facilities, directory, space, Some(threshold))
                .map(|assignment| (site, assignment))
        })
        .collect();

    // 1. Dedicated-onramp guarantee: an onramp-qualified site always brings
    // its nearest facility into the active set, regardless of budget.
    for (site, assignment) in &pairs {
        if facilities
            .iter()
            .any(|f| directory.onramp_eligible(site, f, space))
        {
            log::debug!(
                "coverage: onramp guarantee site={} facility={}",
                site.id,
                assignment.facility_id
            );
            active.insert(assignment.facility_id.clone());
        }
    }

    // 2. Efficiency-first base selection: the facility that is nearest for
    // the most sites within the threshold. If nothing is within threshold,
    // recount ignoring it so the selection is never empty.
    let mut counts = nearest_counts(&pairs, Some(threshold));
    if counts.is_empty() {
        counts = nearest_counts(&pairs, None);
    }
    match top_facility(&counts, directory) {
        Some(base) => {
            active.insert(base);
        }
        None => {
            // No site has usable coordinates; fall back to the hub or the
            // first facility by id so one site and one facility still yield
            // a non-empty selection.
            let fallback = directory
                .primary_hub_id
                .clone()
                .filter(|id| facilities.iter().any(|f| &f.id == id))
                .or_else(|| facilities.iter().map(|f| f.id.clone()).min());
            if let Some(id) = fallback {
                active.insert(id);
            }
        }
    }

    // 3. Budget-gated expansion. Minimal budgets skip coverage expansion
    // entirely; their single permitted extra facility is the redundancy
    // addition below.
    if requirements.budget != BudgetTier::Minimal {
        let min_capture = if requirements.primary_goal == PrimaryGoal::Performance {
            1
        } else {
            EXPANSION_MIN_CAPTURE
        };
        for _ in 0..facilities.len() {
            let uncovered: Vec<(&Site, Assignment)> = pairs
                .iter()
                .filter(|(_, a)| !active.contains(&a.facility_id))
                .map(|(s, a)| (*s, a.clone()))
                .collect();
            if uncovered.is_empty() {
                break;
            }
            let capture = nearest_counts(&uncovered, Some(threshold));
            let Some(next) = top_facility(&capture, directory) else {
                break;
            };
            let captured = capture.get(next.as_str()).copied().unwrap_or(0);
            if captured < min_capture {
                break;
            }
            log::debug!("coverage: expansion facility={next} captures={captured}");
            active.insert(next);
        }
    }

    // 4. Redundancy expansion: one geographically diverse extra facility
    // for high/mission-critical profiles (high only outside minimal
    // budgets). Mission-critical falls back to the farthest available
    // candidate when nothing clears the diversity bar.
    let wants_diverse = match requirements.redundancy {
        RedundancyTier::MissionCritical => true,
        RedundancyTier::High => requirements.budget != BudgetTier::Minimal,
        RedundancyTier::Basic => false,
    };
    if wants_diverse {
        let active_points: Vec<GeoPoint> = facilities
            .iter()
            .filter(|f| active.contains(&f.id))
            .map(|f| f.location)
            .collect();

        let mut diverse: Option<(&Facility, f64)> = None;
        let mut farthest: Option<(&Facility, f64)> = None;
        for facility in facilities.iter().filter(|f| !active.contains(&f.id)) {
            let min_d = active_points
                .iter()
                .map(|p| space.distance_miles(*p, facility.location))
                .fold(f64::INFINITY, f64::min);
            update_max_min(&mut farthest, facility, min_d);
            if min_d > DIVERSITY_THRESHOLD_MILES {
                update_max_min(&mut diverse, facility, min_d);
            }
        }

        let pick = diverse.or(if requirements.redundancy == RedundancyTier::MissionCritical {
            farthest
        } else {
            None
        });
        if let Some((facility, min_d)) = pick {
            log::debug!(
                "coverage: redundancy facility={} min_dist_mi={min_d:.0}",
                facility.id
            );
            active.insert(facility.id.clone());
        }
    }

    log::info!(
        "coverage: sites={} facilities={} threshold_mi={threshold:.0} active={}",
        sites.len(),
        facilities.len(),
        active.len()
    );

    SelectionResult {
        active_facility_ids: active,
    }
}

/// Candidate keeps the greater minimum distance to the active set; ties go
/// to the lexicographically smaller id.
fn update_max_min<'a>(slot: &mut Option<(&'a Facility, f64)>, facility: &'a Facility, min_d: f64) {
    let replace = match slot {
        None => true,
        Some((current, best)) => {
            min_d > *best || (min_d == *best && facility.id < current.id)
        }
    };
    if replace {
        *slot = Some((facility, min_d));
    }
}

fn nearest_counts<'a>(
    pairs: &[(&'a Site, Assignment)],
    threshold: Option<f64>,
) -> HashMap<String, usize> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for (_, assignment) in pairs {
        if let Some(t) = threshold
            && assignment.distance_miles > t
        {
            continue;
        }
        *counts.entry(assignment.facility_id.clone()).or_default() += 1;
    }
    counts
}

/// Highest-count facility; ties prefer the designated primary hub, then
/// the lexicographically smaller id.
fn top_facility(counts: &HashMap<String, usize>, directory: &FacilityDirectory) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for (id, &n) in counts {
        let replace = match best {
            None => true,
            Some((best_id, best_n)) => {
                if n != best_n {
                    n > best_n
                } else if directory.is_primary_hub(id) {
                    true
                } else if directory.is_primary_hub(best_id) {
                    false
                } else {
                    id.as_str() < best_id
                }
            }
        };
        if replace {
            best = Some((id.as_str(), n));
        }
    }
    best.map(|(id, _)| id.to_string())
}
