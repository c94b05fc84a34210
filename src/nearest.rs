use crate::geo::DistanceSpace;
use crate::model::{Assignment, Facility, FacilityDirectory, Site};

/// Facilities whose bias-weighted distance is within this of the minimum
/// are treated as equidistant and tie-broken by id.
const TIE_EPSILON_MILES: f64 = 0.5;

/// Resolve the nearest eligible facility for one site.
///
/// Distances are weighted by the directory's regional bias table before
/// comparison; the reported `distance_miles` is always the raw distance.
/// An over-threshold nearest facility is still returned (connectivity is
/// never dropped for being far), callers treat it as extended range.
/// Returns `None` for sites without a usable location or when no
/// facilities exist.
pub fn resolve_nearest(
    site: &Site,
    facilities: &[Facility],
    directory: &FacilityDirectory,
    space: DistanceSpace,
    threshold_miles: Option<f64>,
) -> Option<Assignment> {
    let location = site.location.filter(|p| space.contains(*p))?;

    let candidates: Vec<(&Facility, f64, f64)> = facilities
        .iter()
        .map(|facility| {
            let raw = space.distance_miles(location, facility.location);
            let weighted = raw * directory.weight_for(location.lng, &facility.id);
            (facility, raw, weighted)
        })
        .collect();

    // Tie-break against the true minimum, not the scan order: every
    // candidate within epsilon of it competes, smallest id wins.
    let min_weighted = candidates
        .iter()
        .map(|(_, _, weighted)| *weighted)
        .fold(f64::INFINITY, f64::min);
    let (facility, raw, _) = candidates
        .into_iter()
        .filter(|(_, _, weighted)| *weighted <= min_weighted + TIE_EPSILON_MILES)
        .min_by(|(a, _, _), (b, _, _)| a.id.cmp(&b.id))?;
    if let Some(threshold) = threshold_miles
        && raw > threshold
    {
        log::debug!(
            "nearest: site={} facility={} dist_mi={raw:.1} over threshold_mi={threshold:.0} (extended range)",
            site.id,
            facility.id
        );
    }

    Some(Assignment {
        site_id: site.id.clone(),
        facility_id: facility.id.clone(),
        distance_miles: raw,
    })
}
