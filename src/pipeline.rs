use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geo::DistanceSpace;
use crate::layout::{LayoutProjection, NodePosition};
use crate::model::{
    Assignment, Facility, FacilityDirectory, FacilityScore, RegionCluster, RequirementsProfile,
    SelectionResult, Site,
};
use crate::{coverage, nearest, regions, score};

/// Everything one optimization run consumes. Constructed fresh per
/// invocation from caller-supplied data; the engine never mutates it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanInput {
    pub sites: Vec<Site>,
    pub facilities: Vec<Facility>,
    pub requirements: RequirementsProfile,
    #[serde(default)]
    pub directory: FacilityDirectory,
    #[serde(default)]
    pub space: DistanceSpace,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanOutput {
    pub assignments: Vec<Assignment>,
    pub regions: Vec<RegionCluster>,
    pub selection: SelectionResult,
    pub scores: Vec<FacilityScore>,
    pub layout: Vec<NodePosition>,
    /// Sites excluded from distance-based computations for missing or
    /// non-finite coordinates.
    pub skipped_sites: Vec<String>,
    /// Candidate facilities excluded for unusable coordinates.
    pub skipped_facilities: Vec<String>,
}

/// Run the full pipeline: nearest-facility assignments, regional clusters,
/// active facility selection, suitability scores, and render layout.
///
/// Pure over its input; repeated invocation with identical input yields
/// identical output.
pub fn plan(input: &PlanInput) -> Result<PlanOutput> {
    validate_ids(&input.sites, &input.facilities)?;

    // Unusable facility coordinates degrade the run like unusable site
    // coordinates do: the facility is excluded and reported, never
    // defaulted and never a hard failure.
    let (facilities, skipped_facilities): (Vec<Facility>, Vec<String>) = {
        let mut usable = Vec::with_capacity(input.facilities.len());
        let mut skipped = Vec::new();
        for facility in &input.facilities {
            if input.space.contains(facility.location) {
                usable.push(facility.clone());
            } else {
                skipped.push(facility.id.clone());
            }
        }
        (usable, skipped)
    };
    if !skipped_facilities.is_empty() {
        log::warn!(
            "plan: skipped={} facilities without usable coordinates",
            skipped_facilities.len()
        );
    }

    let threshold = input.requirements.clamped_threshold_miles();
    if threshold != input.requirements.distance_threshold_miles {
        log::warn!(
            "plan: threshold_mi={} clamped to {threshold}",
            input.requirements.distance_threshold_miles
        );
    }

    log::info!(
        "plan: start sites={} facilities={} space={:?} threshold_mi={threshold:.0}",
        input.sites.len(),
        input.facilities.len(),
        input.space
    );

    let skipped_sites: Vec<String> = input
        .sites
        .iter()
        .filter(|s| !s.location.is_some_and(|p| input.space.contains(p)))
        .map(|s| s.id.clone())
        .collect();
    if !skipped_sites.is_empty() {
        log::warn!(
            "plan: skipped={} sites without usable coordinates",
            skipped_sites.len()
        );
    }

    let assignments: Vec<Assignment> = input
        .sites
        .iter()
        .filter_map(|site| {
            nearest::resolve_nearest(
                site,
                &facilities,
                &input.directory,
                input.space,
                Some(threshold),
            )
        })
        .collect();

    let regions = regions::cluster_by_region(&input.sites, input.space);

    let selection = coverage::select_facilities(
        &input.sites,
        &facilities,
        &input.requirements,
        &input.directory,
        input.space,
    );

    let scores = score::score_all(
        &input.sites,
        &facilities,
        &input.requirements,
        &input.directory,
        input.space,
    );

    let layout_points = input
        .sites
        .iter()
        .filter_map(|s| {
            s.location
                .filter(|p| input.space.contains(*p))
                .map(|p| (s.id.clone(), p))
        })
        .chain(
            facilities
                .iter()
                .filter(|f| selection.active_facility_ids.contains(&f.id))
                .map(|f| (f.id.clone(), f.location)),
        );
    let layout = LayoutProjection::new(layout_points).project();

    log::info!(
        "plan: done assignments={} regions={} active={} scores={}",
        assignments.len(),
        regions.len(),
        selection.active_facility_ids.len(),
        scores.len()
    );

    Ok(PlanOutput {
        assignments,
        regions,
        selection,
        scores,
        layout,
        skipped_sites,
        skipped_facilities,
    })
}

/// Ids key maps throughout the engine; empty or duplicate ids are the one
/// hard failure for otherwise-degenerate input.
fn validate_ids(sites: &[Site], facilities: &[Facility]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for site in sites {
        if site.id.is_empty() {
            return Err(Error::invalid_data("site with empty id"));
        }
        if !seen.insert(&site.id) {
            return Err(Error::invalid_data(format!("duplicate site id: {}", site.id)));
        }
    }
    seen.clear();
    for facility in facilities {
        if facility.id.is_empty() {
            return Err(Error::invalid_data("facility with empty id"));
        }
        if !seen.insert(&facility.id) {
            return Err(Error::invalid_data(format!(
                "duplicate facility id: {}",
                facility.id
            )));
        }
    }
    Ok(())
}
