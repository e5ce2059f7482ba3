mod setup;

pub use setup::{restore_terminal as restore, setup_terminal as setup, Tui};
