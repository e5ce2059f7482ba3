use monsoon_radial::tooltip::{CURSOR_OFFSET_X, CURSOR_OFFSET_Y};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlElement};

/// One floating tooltip element shared by every chart on the page.
#[derive(Clone)]
pub struct SharedTooltip {
    element: HtmlElement,
}

impl SharedTooltip {
    pub fn create(document: &Document) -> Result<Self, JsValue> {
        let element: HtmlElement = document.create_element("div")?.dyn_into()?;
        element.set_class_name("radial-tooltip");

        let style = element.style();
        style.set_property("position", "fixed")?;
        style.set_property("pointer-events", "none")?;
        style.set_property("opacity", "0")?;

        document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?
            .append_child(&element)?;
        Ok(Self { element })
    }

    pub fn show(&self, text: &str, client_x: f64, client_y: f64) -> Result<(), JsValue> {
        self.element.set_text_content(Some(text));
        let (left, top) = placement(client_x, client_y);
        let style = self.element.style();
        style.set_property("left", &left)?;
        style.set_property("top", &top)?;
        style.set_property("opacity", "1")
    }

    pub fn hide(&self) -> Result<(), JsValue> {
        self.element.style().set_property("opacity", "0")
    }
}

/// CSS `left` and `top` of the tooltip for a pointer position.
fn placement(client_x: f64, client_y: f64) -> (String, String) {
    (
        format!("{}px", client_x + CURSOR_OFFSET_X),
        format!("{}px", client_y + CURSOR_OFFSET_Y),
    )
}
