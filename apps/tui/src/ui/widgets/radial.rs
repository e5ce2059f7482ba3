use monsoon_radial::axes::AxisScaffold;
use monsoon_radial::entrance::EntranceFrame;
use monsoon_radial::projection::{ChartGeometry, Point};
use monsoon_radial::{ChartFrame, Month};
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Line as CanvasLine};
use ratatui::Frame;

/// Dots render once they are more than half faded in.
const DOT_VISIBLE: f64 = 0.5;

pub const fn series_color(index: usize) -> Color {
    match index % 4 {
        0 => Color::Cyan,
        1 => Color::Yellow,
        2 => Color::Magenta,
        _ => Color::Green,
    }
}

const fn fill_color(index: usize) -> Color {
    match index % 4 {
        0 => Color::Rgb(0, 70, 90),
        1 => Color::Rgb(90, 80, 0),
        2 => Color::Rgb(80, 0, 80),
        _ => Color::Rgb(0, 80, 30),
    }
}

/// Largest area with the chart's aspect, assuming cells twice as tall as wide.
pub fn chart_area(area: Rect, geometry: &ChartGeometry) -> Rect {
    if area.width < 4 || area.height < 4 {
        return Rect::default();
    }

    let aspect = geometry.width / geometry.height;
    let by_height = (f64::from(area.height) * 2.0 * aspect) as u16;
    let (width, height) = if by_height <= area.width {
        (by_height.max(1), area.height)
    } else {
        let height = (f64::from(area.width) / (2.0 * aspect)) as u16;
        (area.width, height.max(1))
    };

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub struct RadialView<'a> {
    pub geometry: &'a ChartGeometry,
    pub axes: &'a AxisScaffold,
    pub frame: &'a ChartFrame,
    pub entrance: EntranceFrame,
    pub cursor: Month,
}

pub fn render_radial(f: &mut Frame<'_>, area: Rect, view: &RadialView<'_>) {
    let square = chart_area(area, view.geometry);
    if square.width == 0 {
        return;
    }

    let geometry = view.geometry;
    // Canvas y grows upwards, SVG y grows downwards
    let flip = |point: Point| (point.x, geometry.height - point.y);

    f.render_widget(
        Canvas::default()
            .marker(Marker::Braille)
            .paint(|ctx| {
                for ring in &view.axes.rings {
                    let (x, y) = flip(ring.center);
                    ctx.draw(&Circle {
                        x,
                        y,
                        radius: ring.radius,
                        color: Color::DarkGray,
                    });
                }

                for spoke in &view.axes.spokes {
                    let (x1, y1) = flip(spoke.start);
                    let (x2, y2) = flip(spoke.end);
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: Color::DarkGray,
                    });
                }

                ctx.layer();

                let (center_x, center_y) = flip(geometry.center());
                if view.entrance.fill_opacity > 0.0 {
                    for (index, shape) in view.frame.shapes.iter().enumerate() {
                        for vertex in shape.polygon.vertices() {
                            let (x, y) = flip(vertex.point);
                            ctx.draw(&CanvasLine {
                                x1: center_x,
                                y1: center_y,
                                x2: x,
                                y2: y,
                                color: fill_color(index),
                            });
                        }
                    }
                    ctx.layer();
                }

                for (index, shape) in view.frame.shapes.iter().enumerate() {
                    let color = series_color(index);
                    let outline = shape.polygon.partial_outline(view.entrance.outline_progress);
                    for pair in outline.windows(2) {
                        let (x1, y1) = flip(pair[0]);
                        let (x2, y2) = flip(pair[1]);
                        ctx.draw(&CanvasLine {
                            x1,
                            y1,
                            x2,
                            y2,
                            color,
                        });
                    }

                    for (month, vertex) in shape.polygon.vertices().iter().enumerate() {
                        if view.entrance.dot_opacity[month] <= DOT_VISIBLE {
                            continue;
                        }
                        let (x, y) = flip(vertex.point);
                        let highlighted = vertex.month == view.cursor;
                        ctx.draw(&Circle {
                            x,
                            y,
                            radius: geometry.dot_radius
                                * view.entrance.dot_scale[month]
                                * if highlighted { 2.0 } else { 1.0 },
                            color: if highlighted { Color::White } else { color },
                        });
                    }
                }

                for spoke in &view.axes.spokes {
                    let (x, y) = flip(spoke.label_at);
                    let color = if spoke.month == view.cursor {
                        Color::White
                    } else {
                        Color::Gray
                    };
                    ctx.print(x, y, ratatui::text::Span::styled(spoke.label, color));
                }
            })
            .x_bounds([0.0, geometry.width])
            .y_bounds([0.0, geometry.height]),
        square,
    );
}

#[cfg(test)]
mod tests {
    use super::{chart_area, series_color};
    use monsoon_radial::projection::ChartGeometry;
    use ratatui::layout::Rect;
    use ratatui::style::Color;

    #[test]
    fn square_chart_is_twice_as_wide_in_cells() {
        let area = chart_area(Rect::new(0, 0, 100, 20), &ChartGeometry::default());
        assert_eq!((area.width, area.height), (40, 20));
        assert_eq!(area.x, 30);
    }

    #[test]
    fn narrow_area_limits_by_width() {
        let area = chart_area(Rect::new(0, 0, 20, 40), &ChartGeometry::default());
        assert_eq!((area.width, area.height), (20, 10));
        assert_eq!(area.y, 15);
    }

    #[test]
    fn tiny_area_renders_nothing() {
        assert_eq!(chart_area(Rect::new(0, 0, 3, 3), &ChartGeometry::default()), Rect::default());
    }

    #[test]
    fn palette_cycles() {
        assert_eq!(series_color(0), Color::Cyan);
        assert_eq!(series_color(4), Color::Cyan);
    }
}
