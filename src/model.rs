use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::geo::{DistanceSpace, GeoPoint};

/// Sites must be within this distance of an onramp-metro facility to
/// qualify for a dedicated onramp there.
pub const ONRAMP_METRO_RADIUS_MILES: f64 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SiteCategory {
    Branch,
    Corporate,
    DataCenter,
    Cloud,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryGoal {
    CostReduction,
    Performance,
    Agility,
    Modernization,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BudgetTier {
    Minimal,
    Moderate,
    Substantial,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RedundancyTier {
    Basic,
    High,
    MissionCritical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LatencySensitivity {
    Normal,
    Low,
    Critical,
}

/// A customer site. Read-only input; sites without a usable `location`
/// are excluded from distance-based computations, never defaulted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub id: String,
    pub name: String,
    pub category: SiteCategory,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A candidate interconnection facility (POP).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub id: String,
    pub name: String,
    pub location: GeoPoint,
    #[serde(default)]
    pub metro: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsProfile {
    pub primary_goal: PrimaryGoal,
    pub budget: BudgetTier,
    pub redundancy: RedundancyTier,
    pub latency_sensitivity: LatencySensitivity,
    #[serde(default = "default_threshold_miles")]
    pub distance_threshold_miles: f64,
}

fn default_threshold_miles() -> f64 {
    RequirementsProfile::MAX_THRESHOLD_MILES
}

impl RequirementsProfile {
    pub const MIN_THRESHOLD_MILES: f64 = 500.0;
    pub const MAX_THRESHOLD_MILES: f64 = 2_500.0;

    /// Threshold clamped to the supported range. Out-of-range values are
    /// clamped rather than rejected; a non-finite value falls back to the
    /// most permissive bound.
    pub fn clamped_threshold_miles(&self) -> f64 {
        if !self.distance_threshold_miles.is_finite() {
            return Self::MAX_THRESHOLD_MILES;
        }
        self.distance_threshold_miles
            .clamp(Self::MIN_THRESHOLD_MILES, Self::MAX_THRESHOLD_MILES)
    }
}

/// One row of the regional bias table: for sites whose longitude falls in
/// `[lng_min, lng_max]`, every facility other than `preferred_facility_id`
/// has its distance multiplied by `competitor_weight` before comparison.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionalBias {
    pub lng_min: f64,
    pub lng_max: f64,
    pub preferred_facility_id: String,
    pub competitor_weight: f64,
}

/// Declarative per-run facility policy, decided at data-ingestion time.
/// The engine never re-derives any of this by matching on facility names.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FacilityDirectory {
    /// Designated primary hub; wins efficiency-count ties.
    pub primary_hub_id: Option<String>,
    /// Tier-1 / low-cost facility ids.
    pub low_cost_ids: HashSet<String>,
    /// Metro codes with dedicated-onramp presence.
    pub onramp_metros: HashSet<String>,
    /// Regional bias rows keyed by longitude band.
    pub bias: Vec<RegionalBias>,
}

impl FacilityDirectory {
    pub fn is_primary_hub(&self, facility_id: &str) -> bool {
        self.primary_hub_id.as_deref() == Some(facility_id)
    }

    pub fn is_low_cost(&self, facility_id: &str) -> bool {
        self.low_cost_ids.contains(facility_id)
    }

    /// Multiplier applied to `facility_id`'s distance for a site at
    /// `site_lng`. 1.0 when no bias row applies.
    pub fn weight_for(&self, site_lng: f64, facility_id: &str) -> f64 {
        for row in &self.bias {
            if (row.lng_min..=row.lng_max).contains(&site_lng)
                && row.preferred_facility_id != facility_id
            {
                return row.competitor_weight;
            }
        }
        1.0
    }

    /// Whether `site` qualifies for a dedicated onramp at `facility`:
    /// a data-center site within the metro radius of a facility whose
    /// metro code is listed as having onramp presence.
    pub fn onramp_eligible(
        &self,
        site: &Site,
        facility: &Facility,
        space: DistanceSpace,
    ) -> bool {
        if site.category != SiteCategory::DataCenter {
            return false;
        }
        let Some(metro) = facility.metro.as_deref() else {
            return false;
        };
        if !self.onramp_metros.contains(metro) {
            return false;
        }
        let Some(location) = site.location.filter(|p| space.contains(*p)) else {
            return false;
        };
        space.distance_miles(location, facility.location) <= ONRAMP_METRO_RADIUS_MILES
    }
}

/// Nearest-eligible-facility result for one site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub site_id: String,
    pub facility_id: String,
    pub distance_miles: f64,
}

/// Sites grouped under one named geographic region, ordered west to east.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCluster {
    pub region_name: String,
    pub site_ids: Vec<String>,
    pub average_longitude: f64,
}

/// Per-component contributions to one suitability score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub distance: f64,
    pub cost: f64,
    pub performance: f64,
    pub redundancy: f64,
    pub onramp: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.distance + self.cost + self.performance + self.redundancy + self.onramp
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilityScore {
    pub site_id: String,
    pub facility_id: String,
    /// Aggregate suitability in [0,100].
    pub score: f64,
    pub distance_miles: f64,
    pub breakdown: ScoreBreakdown,
}

/// Output of the coverage optimizer. A `BTreeSet` keeps the serialized
/// order stable across runs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionResult {
    pub active_facility_ids: BTreeSet<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(threshold: f64) -> RequirementsProfile {
        RequirementsProfile {
            primary_goal: PrimaryGoal::CostReduction,
            budget: BudgetTier::Minimal,
            redundancy: RedundancyTier::Basic,
            latency_sensitivity: LatencySensitivity::Normal,
            distance_threshold_miles: threshold,
        }
    }

    #[test]
    fn threshold_is_clamped_to_bounds() {
        assert_eq!(profile(100.0).clamped_threshold_miles(), 500.0);
        assert_eq!(profile(9_000.0).clamped_threshold_miles(), 2_500.0);
        assert_eq!(profile(800.0).clamped_threshold_miles(), 800.0);
        assert_eq!(profile(f64::NAN).clamped_threshold_miles(), 2_500.0);
    }

    #[test]
    fn bias_weight_applies_only_inside_band_and_to_competitors() {
        let directory = FacilityDirectory {
            bias: vec![RegionalBias {
                lng_min: -125.0,
                lng_max: -115.0,
                preferred_facility_id: "sjc".into(),
                competitor_weight: 1.5,
            }],
            ..Default::default()
        };
        assert_eq!(directory.weight_for(-122.0, "lax"), 1.5);
        assert_eq!(directory.weight_for(-122.0, "sjc"), 1.0);
        assert_eq!(directory.weight_for(-90.0, "lax"), 1.0);
    }

    #[test]
    fn onramp_requires_category_metro_and_proximity() {
        let directory = FacilityDirectory {
            onramp_metros: ["IAD".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let facility = Facility {
            id: "iad1".into(),
            name: "Ashburn".into(),
            location: GeoPoint::new(39.0438, -77.4874),
            metro: Some("IAD".into()),
        };
        let mut site = Site {
            id: "dc1".into(),
            name: "Ashburn DC".into(),
            category: SiteCategory::DataCenter,
            location: Some(GeoPoint::new(39.0, -77.5)),
            state: Some("VA".into()),
        };
        let space = DistanceSpace::Geographic;
        assert!(directory.onramp_eligible(&site, &facility, space));

        site.category = SiteCategory::Branch;
        assert!(!directory.onramp_eligible(&site, &facility, space));

        site.category = SiteCategory::DataCenter;
        site.location = Some(GeoPoint::new(32.7767, -96.7970));
        assert!(!directory.onramp_eligible(&site, &facility, space));
    }

    #[test]
    fn requirements_enums_use_kebab_case_wire_names() {
        let profile: RequirementsProfile = serde_json::from_str(
            r#"{
                "primaryGoal": "cost-reduction",
                "budget": "minimal",
                "redundancy": "mission-critical",
                "latencySensitivity": "critical",
                "distanceThresholdMiles": 600.0
            }"#,
        )
        .unwrap();
        assert_eq!(profile.primary_goal, PrimaryGoal::CostReduction);
        assert_eq!(profile.redundancy, RedundancyTier::MissionCritical);
    }
}
