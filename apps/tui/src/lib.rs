// Export our modules for use in the binary and tests
pub mod config;
pub mod headless;
pub mod loader;
