use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

const DEFAULT_PADDING: f64 = 0.05;
const MAX_PADDING: f64 = 0.45;

/// A node placed in the unit square for rendering. `x` grows west to east,
/// `y` grows north to south.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodePosition {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Maps a set of identified points into normalized [0,1]x[0,1] rendering
/// coordinates. Pure and deterministic; consumes the optimizer's output,
/// the renderer does the rest.
pub struct LayoutProjection {
    points: Vec<(String, GeoPoint)>,
    padding: f64,
}

impl LayoutProjection {
    pub fn new(points: impl IntoIterator<Item = (String, GeoPoint)>) -> Self {
        Self {
            points: points.into_iter().collect(),
            padding: DEFAULT_PADDING,
        }
    }

    /// Fraction of the unit square reserved as a margin on each side.
    pub fn padding(mut self, padding: f64) -> Self {
        self.padding = padding.clamp(0.0, MAX_PADDING);
        self
    }

    pub fn project(&self) -> Vec<NodePosition> {
        if self.points.is_empty() {
            return Vec::new();
        }

        let mut lng_min = f64::INFINITY;
        let mut lng_max = f64::NEG_INFINITY;
        let mut lat_min = f64::INFINITY;
        let mut lat_max = f64::NEG_INFINITY;
        for (_, p) in &self.points {
            lng_min = lng_min.min(p.lng);
            lng_max = lng_max.max(p.lng);
            lat_min = lat_min.min(p.lat);
            lat_max = lat_max.max(p.lat);
        }

        let span = 1.0 - 2.0 * self.padding;
        let lng_extent = lng_max - lng_min;
        let lat_extent = lat_max - lat_min;

        self.points
            .iter()
            .map(|(id, p)| {
                // Zero-extent axes center their coordinate.
                let x = if lng_extent > 0.0 {
                    self.padding + (p.lng - lng_min) / lng_extent * span
                } else {
                    0.5
                };
                let y = if lat_extent > 0.0 {
                    self.padding + (lat_max - p.lat) / lat_extent * span
                } else {
                    0.5
                };
                NodePosition {
                    id: id.clone(),
                    x,
                    y,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<(String, GeoPoint)> {
        vec![
            ("sf".to_string(), GeoPoint::new(37.7749, -122.4194)),
            ("dfw".to_string(), GeoPoint::new(32.7767, -96.7970)),
            ("nyc".to_string(), GeoPoint::new(40.7128, -74.0060)),
        ]
    }

    #[test]
    fn positions_stay_inside_the_unit_square() {
        for position in LayoutProjection::new(points()).project() {
            assert!((0.0..=1.0).contains(&position.x));
            assert!((0.0..=1.0).contains(&position.y));
        }
    }

    #[test]
    fn west_maps_left_and_north_maps_up() {
        let positions = LayoutProjection::new(points()).project();
        let by_id = |id: &str| positions.iter().find(|p| p.id == id).unwrap();
        assert!(by_id("sf").x < by_id("dfw").x);
        assert!(by_id("dfw").x < by_id("nyc").x);
        // NYC is the northernmost point, so it sits highest.
        assert!(by_id("nyc").y < by_id("dfw").y);
    }

    #[test]
    fn single_point_is_centered() {
        let positions =
            LayoutProjection::new(vec![("only".to_string(), GeoPoint::new(30.0, -90.0))])
                .project();
        assert_eq!(positions[0].x, 0.5);
        assert_eq!(positions[0].y, 0.5);
    }

    #[test]
    fn padding_bounds_the_extremes() {
        let positions = LayoutProjection::new(points()).padding(0.1).project();
        for position in &positions {
            assert!(position.x >= 0.1 - 1e-9 && position.x <= 0.9 + 1e-9);
        }
    }

    #[test]
    fn projection_is_deterministic() {
        let a = LayoutProjection::new(points()).project();
        let b = LayoutProjection::new(points()).project();
        assert_eq!(a, b);
    }
}
