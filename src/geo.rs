use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius in miles, used by every haversine call site.
pub const EARTH_RADIUS_MILES: f64 = 3_958.8;

/// Extents assigned to the unit square in normalized-plane runs. Roughly
/// continental-US proportions; an approximation, not geodesy.
pub const PLANE_WIDTH_MILES: f64 = 2_800.0;
pub const PLANE_HEIGHT_MILES: f64 = 1_600.0;

const NINETY: f64 = 90.0;
const ONE_EIGHTY: f64 = NINETY * 2.0;

/// A coordinate pair. In `Geographic` space `lat`/`lng` are degrees; in
/// `NormalizedPlane` space `lat=y` and `lng=x`, both in [0,1].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut b1 = ryu::Buffer::new();
        let mut b2 = ryu::Buffer::new();
        write!(f, "{},{}", b1.format(self.lat), b2.format(self.lng))
    }
}

/// Coordinate system for one optimization run. Chosen once by the caller
/// and threaded through every component; the two spaces are never mixed
/// within a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceSpace {
    #[default]
    Geographic,
    NormalizedPlane,
}

impl DistanceSpace {
    /// Distance in miles between two points in this space.
    pub fn distance_miles(self, a: GeoPoint, b: GeoPoint) -> f64 {
        match self {
            Self::Geographic => haversine_miles(a, b),
            Self::NormalizedPlane => {
                let dx = (b.lng - a.lng) * PLANE_WIDTH_MILES;
                let dy = (b.lat - a.lat) * PLANE_HEIGHT_MILES;
                (dx * dx + dy * dy).sqrt()
            }
        }
    }

    /// Whether `p` is a usable coordinate in this space. Non-finite values
    /// are rejected in both spaces.
    pub fn contains(self, p: GeoPoint) -> bool {
        if !p.is_finite() {
            return false;
        }
        match self {
            Self::Geographic => {
                (-NINETY..=NINETY).contains(&p.lat) && (-ONE_EIGHTY..=ONE_EIGHTY).contains(&p.lng)
            }
            Self::NormalizedPlane => {
                (0.0..=1.0).contains(&p.lat) && (0.0..=1.0).contains(&p.lng)
            }
        }
    }
}

fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let s1 = (dlat / 2.0).sin();
    let s2 = (dlng / 2.0).sin();
    // Rounding can push h fractionally above 1.0 for near-antipodal
    // points, which would make asin return NaN.
    let h = (s1 * s1 + lat1.cos() * lat2.cos() * s2 * s2).min(1.0);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}
