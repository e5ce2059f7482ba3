pub mod popup;
pub mod radial;
