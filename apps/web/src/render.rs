use monsoon_radial::axes::AxisScaffold;
use monsoon_radial::projection::format_coord;
use monsoon_radial::svg::SVG_NS;
use monsoon_radial::tooltip::Tooltip;
use monsoon_radial::{ChartFrame, Series};
use wasm_bindgen::prelude::wasm_bindgen;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element};

#[wasm_bindgen]
extern "C" {
    /// SVG geometry element measured with exceptions surfaced as `Err`.
    type MeasuredPath;

    #[wasm_bindgen(catch, method, js_name = getTotalLength)]
    fn total_length(this: &MeasuredPath) -> Result<f64, JsValue>;
}

/// Attribute carrying a dot's tooltip text.
pub const TOOLTIP_ATTR: &str = "data-tooltip";

fn svg_element(document: &Document, tag: &str) -> Result<Element, JsValue> {
    document.create_element_ns(Some(SVG_NS), tag)
}

pub fn append_axes(document: &Document, svg: &Element, axes: &AxisScaffold) -> Result<(), JsValue> {
    let group = svg_element(document, "g")?;
    group.set_attribute("class", "radial-axes")?;

    for ring in &axes.rings {
        let circle = svg_element(document, "circle")?;
        circle.set_attribute("cx", &format_coord(ring.center.x))?;
        circle.set_attribute("cy", &format_coord(ring.center.y))?;
        circle.set_attribute("r", &format_coord(ring.radius))?;
        circle.set_attribute("class", "radial-ring")?;
        group.append_child(&circle)?;
    }

    for spoke in &axes.spokes {
        let line = svg_element(document, "line")?;
        line.set_attribute("x1", &format_coord(spoke.start.x))?;
        line.set_attribute("y1", &format_coord(spoke.start.y))?;
        line.set_attribute("x2", &format_coord(spoke.end.x))?;
        line.set_attribute("y2", &format_coord(spoke.end.y))?;
        line.set_attribute("class", "radial-spoke")?;
        group.append_child(&line)?;

        let text = svg_element(document, "text")?;
        text.set_attribute("x", &format_coord(spoke.label_at.x))?;
        text.set_attribute("y", &format_coord(spoke.label_at.y))?;
        text.set_attribute("class", "radial-month-label")?;
        text.set_attribute("text-anchor", "middle")?;
        text.set_text_content(Some(spoke.label));
        group.append_child(&text)?;
    }

    svg.append_child(&group)?;
    Ok(())
}

pub struct SeriesLayer {
    pub path: Element,
    pub dots: Element,
}

/// Data nodes of one chart; paths persist across years, dots are rebuilt.
pub struct SvgLayers {
    pub series: Vec<SeriesLayer>,
}

impl SvgLayers {
    pub fn create(document: &Document, svg: &Element, series: &[Series]) -> Result<Self, JsValue> {
        let group = svg_element(document, "g")?;
        group.set_attribute("class", "radial-data")?;

        let mut layers = Vec::with_capacity(series.len());
        for series in series {
            let path = svg_element(document, "path")?;
            path.set_attribute("class", &series.path_class)?;
            let dots = svg_element(document, "g")?;
            dots.set_attribute("class", "radial-dots")?;

            group.append_child(&path)?;
            group.append_child(&dots)?;
            layers.push(SeriesLayer { path, dots });
        }

        svg.append_child(&group)?;
        Ok(Self { series: layers })
    }

    pub fn draw(
        &self,
        document: &Document,
        frame: &ChartFrame,
        dot_radius: f64,
    ) -> Result<(), JsValue> {
        for (layer, shape) in self.series.iter().zip(&frame.shapes) {
            layer.path.set_attribute("d", &shape.polygon.path_data())?;
            layer.dots.set_inner_html("");

            for vertex in shape.polygon.vertices() {
                let dot = svg_element(document, "circle")?;
                dot.set_attribute("cx", &format_coord(vertex.point.x))?;
                dot.set_attribute("cy", &format_coord(vertex.point.y))?;
                dot.set_attribute("r", &format_coord(dot_radius))?;
                dot.set_attribute("class", &shape.dot_class)?;
                dot.set_attribute(
                    TOOLTIP_ATTR,
                    &Tooltip::text(vertex.month, frame.year, vertex.value),
                )?;
                layer.dots.append_child(&dot)?;
            }
        }
        Ok(())
    }

    /// Rendered length of every outline; `None` when any cannot be measured.
    pub fn outline_lengths(&self) -> Option<Vec<f64>> {
        collect_lengths(
            self.series
                .iter()
                .map(|layer| layer.path.unchecked_ref::<MeasuredPath>().total_length()),
        )
    }

    pub fn dots_at(&self, index: u32) -> impl Iterator<Item = Element> + '_ {
        self.series
            .iter()
            .filter_map(move |layer| layer.dots.children().item(index))
    }

    pub fn all_dots(&self) -> impl Iterator<Item = Element> + '_ {
        self.series.iter().flat_map(|layer| {
            let children = layer.dots.children();
            (0..children.length()).filter_map(move |index| children.item(index))
        })
    }
}

/// A thrown or non-finite measurement voids the whole set.
fn collect_lengths<E>(measured: impl IntoIterator<Item = Result<f64, E>>) -> Option<Vec<f64>> {
    measured
        .into_iter()
        .map(|length| length.ok().filter(|length| length.is_finite()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::collect_lengths;

    #[test]
    fn keeps_lengths_in_series_order() {
        let measured: [Result<f64, ()>; 2] = [Ok(640.5), Ok(120.0)];
        assert_eq!(collect_lengths(measured), Some(vec![640.5, 120.0]));
    }

    #[test]
    fn failed_measurement_voids_the_set() {
        assert_eq!(collect_lengths([Ok(640.5), Err(())]), None);
        assert_eq!(collect_lengths::<()>([Ok(640.5), Ok(f64::NAN)]), None);
    }
}
