use crate::geo::DistanceSpace;
use crate::model::{RegionCluster, Site};

struct RegionDef {
    name: &'static str,
    states: &'static [&'static str],
    /// Longitude fallback band for sites without a `state`, and the band
    /// midpoint used to order regions that hold no located sites.
    lng_min: f64,
    lng_max: f64,
}

// Fallback bands are a display heuristic: they cannot separate coastal
// states that share a meridian, so `state` is always the preferred signal.
const REGIONS: &[RegionDef] = &[
    RegionDef {
        name: "Pacific Northwest",
        states: &["WA", "OR", "ID", "AK"],
        lng_min: -180.0,
        lng_max: -122.5,
    },
    RegionDef {
        name: "California",
        states: &["CA", "NV"],
        lng_min: -122.5,
        lng_max: -114.0,
    },
    RegionDef {
        name: "Mountain West",
        states: &["MT", "WY", "UT", "CO", "AZ", "NM"],
        lng_min: -114.0,
        lng_max: -104.0,
    },
    RegionDef {
        name: "South Central",
        states: &["TX", "OK", "AR", "LA"],
        lng_min: -104.0,
        lng_max: -94.0,
    },
    RegionDef {
        name: "Midwest",
        states: &["ND", "SD", "NE", "KS", "MN", "IA", "MO", "WI", "IL", "IN", "MI", "OH"],
        lng_min: -94.0,
        lng_max: -84.0,
    },
    RegionDef {
        name: "Southeast",
        states: &["KY", "TN", "MS", "AL", "GA", "FL", "SC", "NC", "VA", "WV"],
        lng_min: -84.0,
        lng_max: -78.0,
    },
    RegionDef {
        name: "Northeast",
        states: &["ME", "NH", "VT", "MA", "RI", "CT", "NY", "NJ", "PA", "DE", "MD", "DC"],
        lng_min: -78.0,
        lng_max: -66.0,
    },
];

const OTHER_REGION: &str = "Other";
const WEST_COAST_LABEL: &str = "West Coast";

// Base-region indices merged under the West Coast label when both are
// populated (Pacific Northwest + California).
const COASTAL_MERGE: (usize, usize) = (0, 1);

const STATE_NAMES: &[(&str, &str)] = &[
    ("AL", "Alabama"),
    ("AK", "Alaska"),
    ("AZ", "Arizona"),
    ("AR", "Arkansas"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("DC", "District of Columbia"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("IA", "Iowa"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("ME", "Maine"),
    ("MD", "Maryland"),
    ("MA", "Massachusetts"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MS", "Mississippi"),
    ("MO", "Missouri"),
    ("MT", "Montana"),
    ("NE", "Nebraska"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NY", "New York"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VT", "Vermont"),
    ("VA", "Virginia"),
    ("WA", "Washington"),
    ("WV", "West Virginia"),
    ("WI", "Wisconsin"),
    ("WY", "Wyoming"),
];

fn state_name(abbrev: &str) -> Option<&'static str> {
    STATE_NAMES
        .iter()
        .find(|(abbr, _)| *abbr == abbrev)
        .map(|(_, name)| *name)
}

/// Group sites into named geographic regions ordered west to east.
///
/// Classification prefers the site's `state`; sites without one fall back
/// to a longitude band (Geographic runs only). Sites with neither signal
/// are dropped from clustering. Within a region, sites are ordered by
/// longitude west to east; sites without coordinates sort last by id.
pub fn cluster_by_region(sites: &[Site], space: DistanceSpace) -> Vec<RegionCluster> {
    let mut buckets: Vec<Vec<&Site>> = vec![Vec::new(); REGIONS.len() + 1];
    for site in sites {
        let Some(idx) = classify(site, space) else {
            log::debug!("regions: site={} has no state or coordinates, dropped", site.id);
            continue;
        };
        buckets[idx].push(site);
    }

    let merge_coastal = !buckets[COASTAL_MERGE.0].is_empty() && !buckets[COASTAL_MERGE.1].is_empty();
    if merge_coastal {
        let moved = std::mem::take(&mut buckets[COASTAL_MERGE.1]);
        buckets[COASTAL_MERGE.0].extend(moved);
    }

    let mut clusters: Vec<RegionCluster> = Vec::new();
    for (idx, mut members) in buckets.into_iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        members.sort_by(|a, b| match (longitude(a, space), longitude(b, space)) {
            (Some(la), Some(lb)) => la.total_cmp(&lb).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });

        clusters.push(RegionCluster {
            region_name: region_name(idx, &members, merge_coastal),
            site_ids: members.iter().map(|s| s.id.clone()).collect(),
            average_longitude: average_longitude(idx, &members, space),
        });
    }

    clusters.sort_by(|a, b| {
        a.average_longitude
            .total_cmp(&b.average_longitude)
            .then_with(|| a.region_name.cmp(&b.region_name))
    });
    clusters
}

fn classify(site: &Site, space: DistanceSpace) -> Option<usize> {
    if let Some(state) = site.state.as_deref() {
        let state = state.trim().to_ascii_uppercase();
        for (idx, region) in REGIONS.iter().enumerate() {
            if region.states.contains(&state.as_str()) {
                return Some(idx);
            }
        }
        return Some(REGIONS.len());
    }

    let lng = longitude(site, space)?;
    if space == DistanceSpace::Geographic {
        for (idx, region) in REGIONS.iter().enumerate() {
            if (region.lng_min..region.lng_max).contains(&lng) {
                return Some(idx);
            }
        }
    }
    Some(REGIONS.len())
}

fn longitude(site: &Site, space: DistanceSpace) -> Option<f64> {
    site.location.filter(|p| space.contains(*p)).map(|p| p.lng)
}

fn region_name(idx: usize, members: &[&Site], merged_coastal: bool) -> String {
    if idx == REGIONS.len() {
        return OTHER_REGION.to_string();
    }
    if merged_coastal && idx == COASTAL_MERGE.0 {
        return WEST_COAST_LABEL.to_string();
    }

    // Single-state refinement: a region whose sites all share one state is
    // displayed under that state's full name.
    let mut shared: Option<&str> = None;
    for site in members {
        match (shared, site.state.as_deref()) {
            (_, None) => return REGIONS[idx].name.to_string(),
            (None, Some(s)) => shared = Some(s),
            (Some(prev), Some(s)) if !prev.eq_ignore_ascii_case(s) => {
                return REGIONS[idx].name.to_string();
            }
            _ => {}
        }
    }
    shared
        .and_then(|s| state_name(&s.trim().to_ascii_uppercase()))
        .map(str::to_string)
        .unwrap_or_else(|| REGIONS[idx].name.to_string())
}

fn average_longitude(idx: usize, members: &[&Site], space: DistanceSpace) -> f64 {
    let lngs: Vec<f64> = members.iter().filter_map(|s| longitude(s, space)).collect();
    if lngs.is_empty() {
        // State-only membership; order by the band midpoint instead.
        return if idx < REGIONS.len() {
            (REGIONS[idx].lng_min + REGIONS[idx].lng_max) / 2.0
        } else {
            0.0
        };
    }
    lngs.iter().sum::<f64>() / lngs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::GeoPoint;
    use crate::model::SiteCategory;

    fn site(id: &str, state: Option<&str>, lat: f64, lng: f64) -> Site {
        Site {
            id: id.into(),
            name: id.into(),
            category: SiteCategory::Branch,
            location: Some(GeoPoint::new(lat, lng)),
            state: state.map(str::to_string),
        }
    }

    fn stateless_site(id: &str) -> Site {
        Site {
            id: id.into(),
            name: id.into(),
            category: SiteCategory::Branch,
            location: None,
            state: None,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(cluster_by_region(&[], DistanceSpace::Geographic).is_empty());
    }

    #[test]
    fn single_state_region_is_renamed_to_state() {
        let sites = vec![
            site("sf", Some("CA"), 37.7749, -122.4194),
            site("la", Some("CA"), 34.0522, -118.2437),
        ];
        let clusters = cluster_by_region(&sites, DistanceSpace::Geographic);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].region_name, "California");
        // West to east within the region.
        assert_eq!(clusters[0].site_ids, vec!["sf", "la"]);
    }

    #[test]
    fn coastal_regions_merge_under_west_coast() {
        let sites = vec![
            site("sea", Some("WA"), 47.6062, -122.3321),
            site("sf", Some("CA"), 37.7749, -122.4194),
        ];
        let clusters = cluster_by_region(&sites, DistanceSpace::Geographic);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].region_name, "West Coast");
        assert_eq!(clusters[0].site_ids.len(), 2);
    }

    #[test]
    fn regions_ordered_west_to_east() {
        let sites = vec![
            site("nyc", Some("NY"), 40.7128, -74.0060),
            site("dfw", Some("TX"), 32.7767, -96.7970),
            site("sf", Some("CA"), 37.7749, -122.4194),
        ];
        let clusters = cluster_by_region(&sites, DistanceSpace::Geographic);
        let names: Vec<&str> = clusters.iter().map(|c| c.region_name.as_str()).collect();
        assert_eq!(names, vec!["California", "Texas", "New York"]);
    }

    #[test]
    fn unknown_state_falls_into_other() {
        let sites = vec![site("yyz", Some("ON"), 43.6532, -79.3832)];
        let clusters = cluster_by_region(&sites, DistanceSpace::Geographic);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].region_name, "Other");
    }

    #[test]
    fn longitude_fallback_classifies_stateless_sites() {
        let sites = vec![site("dfw", None, 32.7767, -96.7970)];
        let clusters = cluster_by_region(&sites, DistanceSpace::Geographic);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].region_name, "South Central");
    }

    #[test]
    fn site_without_state_or_coordinates_is_dropped() {
        let sites = vec![stateless_site("ghost"), site("sf", Some("CA"), 37.7749, -122.4194)];
        let clusters = cluster_by_region(&sites, DistanceSpace::Geographic);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].site_ids, vec!["sf"]);
    }

    #[test]
    fn clustering_is_deterministic() {
        let sites = vec![
            site("nyc", Some("NY"), 40.7128, -74.0060),
            site("sea", Some("WA"), 47.6062, -122.3321),
            site("sf", Some("CA"), 37.7749, -122.4194),
            site("chi", Some("IL"), 41.8781, -87.6298),
        ];
        let a = cluster_by_region(&sites, DistanceSpace::Geographic);
        let b = cluster_by_region(&sites, DistanceSpace::Geographic);
        assert_eq!(a, b);
    }
}
