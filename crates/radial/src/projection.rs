use std::f64::consts::{FRAC_PI_2, TAU};

use serde::Serialize;

use crate::domain::{Month, SeriesDataset, MONTHS_PER_YEAR};

/// Fixed drawing frame shared by every chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub max_radius: f64,
    pub rings: u32,
    pub label_offset: f64,
    pub label_baseline: f64,
    pub dot_radius: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 400.0,
            max_radius: 140.0,
            rings: 4,
            label_offset: 16.0,
            label_baseline: 4.0,
            dot_radius: 3.0,
        }
    }
}

impl ChartGeometry {
    pub fn center(&self) -> Point {
        Point {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    pub fn view_box(&self) -> String {
        format!("0 0 {} {}", self.width, self.height)
    }

    pub fn polar(&self, radius: f64, angle: f64) -> Point {
        let center = self.center();
        Point {
            x: angle.cos().mul_add(radius, center.x),
            y: angle.sin().mul_add(radius, center.y),
        }
    }
}

/// Angle of a month spoke in radians, January at -π/2, clockwise.
pub fn month_angle(month: Month) -> f64 {
    (month.index() as f64 / MONTHS_PER_YEAR as f64).mul_add(TAU, -FRAC_PI_2)
}

/// Radius for a value; a zero or negative maximum collapses to the centre.
pub fn scaled_radius(value: f64, global_max: f64, max_radius: f64) -> f64 {
    if global_max > 0.0 {
        value / global_max * max_radius
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: (other.x - self.x).mul_add(t, self.x),
            y: (other.y - self.y).mul_add(t, self.y),
        }
    }
}

/// One projected month of a series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vertex {
    pub month: Month,
    pub value: f64,
    pub radius: f64,
    pub angle: f64,
    pub point: Point,
}

/// Closed twelve-vertex outline of one series for one year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    vertices: [Vertex; MONTHS_PER_YEAR],
}

impl Polygon {
    pub const fn vertices(&self) -> &[Vertex; MONTHS_PER_YEAR] {
        &self.vertices
    }

    pub fn vertex(&self, month: Month) -> &Vertex {
        &self.vertices[month.index()]
    }

    /// SVG path data, `M x y L x y ... Z`.
    pub fn path_data(&self) -> String {
        let mut data = String::new();
        for (index, vertex) in self.vertices.iter().enumerate() {
            let command = if index == 0 { "M" } else { "L" };
            data.push_str(&format!(
                "{command} {} {} ",
                format_coord(vertex.point.x),
                format_coord(vertex.point.y)
            ));
        }
        data.push('Z');
        data
    }

    /// Length of the closed outline including the closing edge.
    pub fn perimeter(&self) -> f64 {
        self.edges().map(|(from, to)| from.distance(to)).sum()
    }

    /// Points of the outline drawn so far when `fraction` of its length is
    /// visible, starting at January and following the drawing direction.
    pub fn partial_outline(&self, fraction: f64) -> Vec<Point> {
        let fraction = fraction.clamp(0.0, 1.0);
        let first = self.vertices[0].point;
        let mut remaining = self.perimeter() * fraction;
        let mut points = vec![first];

        if fraction <= 0.0 {
            return points;
        }
        if fraction >= 1.0 {
            points.extend(self.edges().map(|(_, to)| to));
            return points;
        }

        for (from, to) in self.edges() {
            let length = from.distance(to);
            if remaining >= length {
                points.push(to);
                remaining -= length;
                continue;
            }
            if remaining > 0.0 && length > 0.0 {
                points.push(from.lerp(to, remaining / length));
            }
            break;
        }

        points
    }

    fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        let count = self.vertices.len();
        (0..count).map(move |index| {
            (
                self.vertices[index].point,
                self.vertices[(index + 1) % count].point,
            )
        })
    }
}

/// Projects one series for one year onto the chart frame.
///
/// Months missing from the dataset (or the whole year) project at radius 0,
/// so the polygon always has twelve vertices.
pub fn project_year(
    dataset: &SeriesDataset,
    year: i32,
    global_max: f64,
    geometry: &ChartGeometry,
) -> Polygon {
    let record = dataset.year(year);
    let vertices = Month::ALL.map(|month| {
        let value = record.map_or(0.0, |record| record.value_or_zero(month));
        let radius = scaled_radius(value, global_max, geometry.max_radius);
        let angle = month_angle(month);
        Vertex {
            month,
            value,
            radius,
            angle,
            point: geometry.polar(radius, angle),
        }
    });

    Polygon { vertices }
}

/// Compact coordinate text: at most three decimals, no trailing zeros.
pub fn format_coord(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    let text = format!("{rounded:.3}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_coord, month_angle, project_year, ChartGeometry};
    use crate::domain::{Month, SeriesDataset};

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual}, diff {diff}");
    }

    fn sample() -> SeriesDataset {
        let mut dataset = SeriesDataset::new();
        dataset.insert(2000, Month::January, 5.0);
        dataset.insert(2000, Month::February, 10.0);
        dataset
    }

    #[test]
    fn january_sits_at_half_radius_above_centre() {
        let geometry = ChartGeometry::default();
        let polygon = project_year(&sample(), 2000, 10.0, &geometry);
        let january = polygon.vertex(Month::January);

        assert_close(january.radius, 70.0);
        assert_close(january.angle.to_degrees(), -90.0);
        assert_close(january.point.x, 200.0);
        assert_close(january.point.y, 130.0);
    }

    #[test]
    fn february_reaches_full_radius_at_minus_sixty_degrees() {
        let geometry = ChartGeometry::default();
        let polygon = project_year(&sample(), 2000, 10.0, &geometry);
        let february = polygon.vertex(Month::February);

        assert_close(february.radius, 140.0);
        assert_close(february.angle.to_degrees(), -60.0);
        assert_close(february.point.x, 200.0 + 140.0 * 0.5);
        assert_close(february.point.y, 200.0 - 140.0 * 3.0_f64.sqrt() / 2.0);
    }

    #[test]
    fn missing_months_collapse_to_centre_but_keep_twelve_vertices() {
        let geometry = ChartGeometry::default();
        let polygon = project_year(&sample(), 2000, 10.0, &geometry);

        assert_eq!(polygon.vertices().len(), 12);
        for vertex in &polygon.vertices()[2..] {
            assert_close(vertex.radius, 0.0);
            assert_close(vertex.point.x, 200.0);
            assert_close(vertex.point.y, 200.0);
        }
    }

    #[test]
    fn zero_global_max_projects_everything_to_centre() {
        let geometry = ChartGeometry::default();
        let polygon = project_year(&sample(), 2000, 0.0, &geometry);
        assert!(polygon.vertices().iter().all(|vertex| vertex.radius == 0.0));
    }

    #[test]
    fn unknown_year_is_a_centre_polygon() {
        let geometry = ChartGeometry::default();
        let polygon = project_year(&sample(), 1850, 10.0, &geometry);
        assert!(polygon.vertices().iter().all(|vertex| vertex.value == 0.0));
    }

    #[test]
    fn spokes_proceed_clockwise_in_thirty_degree_steps() {
        for month in Month::ALL {
            let expected = -90.0 + 30.0 * month.index() as f64;
            assert_close(month_angle(month).to_degrees(), expected);
        }
    }

    #[test]
    fn path_data_is_closed_with_twelve_commands() {
        let polygon = project_year(&sample(), 2000, 10.0, &ChartGeometry::default());
        let data = polygon.path_data();

        assert!(data.starts_with("M 200 130 L "));
        assert!(data.ends_with('Z'));
        assert_eq!(data.matches('L').count(), 11);
    }

    #[test]
    fn partial_outline_walks_the_perimeter() {
        let polygon = project_year(&sample(), 2000, 10.0, &ChartGeometry::default());

        assert_eq!(polygon.partial_outline(0.0).len(), 1);

        let full = polygon.partial_outline(1.0);
        assert_eq!(full.len(), 13);
        assert_eq!(full.first(), full.last());

        let half = polygon.partial_outline(0.5);
        let drawn: f64 = half.windows(2).map(|pair| pair[0].distance(pair[1])).sum();
        assert_close(drawn, polygon.perimeter() / 2.0);
    }

    #[test]
    fn coordinates_are_trimmed() {
        assert_eq!(format_coord(200.0), "200");
        assert_eq!(format_coord(129.99999999), "130");
        assert_eq!(format_coord(78.753_87), "78.754");
        assert_eq!(format_coord(-0.000_1), "0");
    }
}
