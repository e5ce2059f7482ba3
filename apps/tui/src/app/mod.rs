// App module for monsoon-radial
// Handles chart panel state and key bindings

pub mod input;
pub mod state;

pub use input::handle_input;
pub use state::{App, ChartPanel, PanelStatus};
