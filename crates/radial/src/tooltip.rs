use serde::Serialize;

use crate::domain::Month;

/// Source values are meters per day; tooltips read millimeters per day.
pub const DISPLAY_SCALE: f64 = 1000.0;
pub const DISPLAY_UNIT: &str = "mm/day";

/// Tooltip placement relative to the pointer.
pub const CURSOR_OFFSET_X: f64 = 12.0;
pub const CURSOR_OFFSET_Y: f64 = -28.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl Tooltip {
    pub fn text(month: Month, year: i32, value: f64) -> String {
        format!(
            "{} {year}: {:.2} {DISPLAY_UNIT}",
            month.label(),
            value * DISPLAY_SCALE
        )
    }

    pub fn at_cursor(month: Month, year: i32, value: f64, cursor_x: f64, cursor_y: f64) -> Self {
        Self {
            text: Self::text(month, year, value),
            x: cursor_x + CURSOR_OFFSET_X,
            y: cursor_y + CURSOR_OFFSET_Y,
        }
    }
}
