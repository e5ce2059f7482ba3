use monsoon_radial::{ChartConfig, SkipReason};
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

/// Page elements one chart binds to.
pub struct ChartElements {
    pub svg: Element,
    pub slider: HtmlInputElement,
    pub label: Element,
    pub play: HtmlElement,
}

pub fn bind(document: &Document, config: &ChartConfig) -> Result<ChartElements, SkipReason> {
    Ok(ChartElements {
        svg: by_id(document, &config.svg_id)?,
        slider: by_id::<HtmlInputElement>(document, &config.slider_id)?,
        label: by_id(document, &config.label_id)?,
        play: by_id::<HtmlElement>(document, &config.play_id)?,
    })
}

/// An element of the wrong kind counts as missing.
fn by_id<T: JsCast>(document: &Document, id: &str) -> Result<T, SkipReason> {
    document
        .get_element_by_id(id)
        .and_then(|element| element.dyn_into::<T>().ok())
        .ok_or_else(|| SkipReason::MissingElement(id.to_string()))
}
