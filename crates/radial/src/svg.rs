//! Standalone SVG rendering of a chart frame.
//!
//! Element classes match the ones the page stylesheet targets, so an exported
//! file looks like the live chart once that stylesheet is applied.

use std::fmt::Write as _;

use crate::axes::AxisScaffold;
use crate::chart::ChartFrame;
use crate::entrance::EntranceFrame;
use crate::projection::{format_coord, ChartGeometry};
use crate::tooltip::Tooltip;

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";

pub fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_axes(axes: &AxisScaffold) -> String {
    let mut out = String::from("<g class=\"radial-axes\">");

    for ring in &axes.rings {
        let _ = write!(
            out,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" class=\"radial-ring\"/>",
            format_coord(ring.center.x),
            format_coord(ring.center.y),
            format_coord(ring.radius)
        );
    }

    for spoke in &axes.spokes {
        let _ = write!(
            out,
            "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" class=\"radial-spoke\"/>",
            format_coord(spoke.start.x),
            format_coord(spoke.start.y),
            format_coord(spoke.end.x),
            format_coord(spoke.end.y)
        );
        let _ = write!(
            out,
            "<text x=\"{}\" y=\"{}\" class=\"radial-month-label\">{}</text>",
            format_coord(spoke.label_at.x),
            format_coord(spoke.label_at.y),
            spoke.label
        );
    }

    out.push_str("</g>");
    out
}

/// Data layer; `entrance` applies a sampled reveal state, `None` draws at rest.
pub fn render_frame(
    geometry: &ChartGeometry,
    frame: &ChartFrame,
    entrance: Option<&EntranceFrame>,
) -> String {
    let resting = EntranceFrame::SHOWN;
    let visual = entrance.unwrap_or(&resting);
    let mut out = String::from("<g class=\"radial-data\">");

    for shape in &frame.shapes {
        let length = shape.polygon.perimeter();
        let _ = write!(
            out,
            "<path d=\"{}\" class=\"{}\" fill-opacity=\"{}\"",
            shape.polygon.path_data(),
            escape_attr(&shape.path_class),
            format_coord(visual.fill_opacity)
        );
        if entrance.is_some() && length > 0.0 {
            let _ = write!(
                out,
                " stroke-dasharray=\"{}\" stroke-dashoffset=\"{}\"",
                format_coord(length),
                format_coord(visual.dash_offset(length))
            );
        }
        out.push_str("/>");

        out.push_str("<g class=\"radial-dots\">");
        for (index, vertex) in shape.polygon.vertices().iter().enumerate() {
            let _ = write!(
                out,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" class=\"{}\" opacity=\"{}\"><title>{}</title></circle>",
                format_coord(vertex.point.x),
                format_coord(vertex.point.y),
                format_coord(geometry.dot_radius * visual.dot_scale[index]),
                escape_attr(&shape.dot_class),
                format_coord(visual.dot_opacity[index]),
                escape_attr(&Tooltip::text(vertex.month, frame.year, vertex.value))
            );
        }
        out.push_str("</g>");
    }

    out.push_str("</g>");
    out
}

/// Complete document with axes, data and a year caption.
pub fn render_document(geometry: &ChartGeometry, axes: &AxisScaffold, frame: &ChartFrame) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<svg xmlns=\"{SVG_NS}\" viewBox=\"{}\" width=\"{}\" height=\"{}\">",
        geometry.view_box(),
        format_coord(geometry.width),
        format_coord(geometry.height)
    );
    let _ = write!(out, "<title>{}</title>", frame.label());
    out.push_str(&render_axes(axes));
    out.push_str(&render_frame(geometry, frame, None));
    let _ = write!(
        out,
        "<text x=\"{}\" y=\"{}\" class=\"radial-year-label\" text-anchor=\"middle\">{}</text>",
        format_coord(geometry.center().x),
        format_coord(geometry.height - 8.0),
        frame.label()
    );
    out.push_str("</svg>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::{escape_attr, render_document, render_frame};
    use crate::axes::AxisScaffold;
    use crate::chart::RadialChart;
    use crate::config::ChartConfig;
    use crate::domain::Series;
    use crate::entrance::EntranceFrame;
    use crate::ingest::parse_csv;
    use crate::projection::ChartGeometry;

    fn chart() -> RadialChart {
        let (dataset, _) = parse_csv("year,month,pr\n2000,1,5\n2000,2,10\n").unwrap();
        let mut chart = RadialChart::new(ChartConfig {
            svg_id: "svg".to_string(),
            slider_id: "slider".to_string(),
            label_id: "label".to_string(),
            play_id: "play".to_string(),
            title: None,
            series: vec![Series::new("a.csv").with_classes("path \"a\"", "dot")],
        });
        chart.load(vec![dataset]);
        chart
    }

    #[test]
    fn document_contains_scaffold_and_data() {
        let geometry = ChartGeometry::default();
        let frame = chart().current_frame().unwrap();
        let svg = render_document(&geometry, &AxisScaffold::build(&geometry), &frame);

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 400 400\""));
        assert_eq!(svg.matches("class=\"radial-ring\"").count(), 4);
        assert_eq!(svg.matches("class=\"radial-spoke\"").count(), 12);
        assert_eq!(svg.matches("class=\"dot\"").count(), 12);
        assert!(svg.contains("class=\"path &quot;a&quot;\""));
        assert!(svg.contains("d=\"M 200 130 L "));
        assert!(svg.contains("<title>Jan 2000: 5000.00 mm/day</title>"));
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn hidden_entrance_frame_dashes_the_outline() {
        let frame = chart().current_frame().unwrap();
        let length = frame.outline_length();
        let svg = render_frame(&ChartGeometry::default(), &frame, Some(&EntranceFrame::HIDDEN));

        assert!(svg.contains(&format!(
            "stroke-dashoffset=\"{}\"",
            crate::projection::format_coord(length)
        )));
        assert!(svg.contains("fill-opacity=\"0\""));
        assert!(svg.contains("opacity=\"0\""));
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_attr("a<b>&'\""), "a&lt;b&gt;&amp;&apos;&quot;");
    }
}
