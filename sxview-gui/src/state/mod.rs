//! Application state modules.

mod display;

pub use display::DisplayConfig;
