use serde::Serialize;

use crate::domain::Month;
use crate::projection::{month_angle, ChartGeometry, Point};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingCircle {
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spoke {
    pub month: Month,
    pub start: Point,
    pub end: Point,
    pub label_at: Point,
    pub label: &'static str,
}

/// Reference rings and month spokes; independent of any data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisScaffold {
    pub rings: Vec<RingCircle>,
    pub spokes: Vec<Spoke>,
}

impl AxisScaffold {
    pub fn build(geometry: &ChartGeometry) -> Self {
        let center = geometry.center();
        let ring_count = geometry.rings.max(1);

        let rings = (1..=ring_count)
            .map(|ring| RingCircle {
                center,
                radius: geometry.max_radius * f64::from(ring) / f64::from(ring_count),
            })
            .collect();

        let spokes = Month::ALL
            .iter()
            .map(|&month| {
                let angle = month_angle(month);
                let label_anchor =
                    geometry.polar(geometry.max_radius + geometry.label_offset, angle);
                Spoke {
                    month,
                    start: center,
                    end: geometry.polar(geometry.max_radius, angle),
                    label_at: Point {
                        x: label_anchor.x,
                        y: label_anchor.y + geometry.label_baseline,
                    },
                    label: month.abbrev(),
                }
            })
            .collect();

        Self { rings, spokes }
    }
}

#[cfg(test)]
mod tests {
    use super::AxisScaffold;
    use crate::projection::ChartGeometry;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual}, diff {diff}");
    }

    #[test]
    fn four_equal_rings_up_to_max_radius() {
        let scaffold = AxisScaffold::build(&ChartGeometry::default());
        let radii: Vec<f64> = scaffold.rings.iter().map(|ring| ring.radius).collect();
        assert_eq!(radii, vec![35.0, 70.0, 105.0, 140.0]);
    }

    #[test]
    fn first_spoke_points_straight_up_with_offset_label() {
        let scaffold = AxisScaffold::build(&ChartGeometry::default());
        let january = &scaffold.spokes[0];

        assert_eq!(scaffold.spokes.len(), 12);
        assert_eq!(january.label, "J");
        assert_close(january.end.x, 200.0);
        assert_close(january.end.y, 60.0);
        assert_close(january.label_at.x, 200.0);
        assert_close(january.label_at.y, 200.0 - 156.0 + 4.0);
    }

    #[test]
    fn quarter_spokes_land_on_the_axes() {
        let scaffold = AxisScaffold::build(&ChartGeometry::default());
        assert_close(scaffold.spokes[3].end.x, 340.0);
        assert_close(scaffold.spokes[6].end.y, 340.0);
        assert_close(scaffold.spokes[9].end.x, 60.0);
    }
}
