//! UI rendering modules.
//!
//! - `control_panel`: left sidebar with view and mode controls, plus
//!   the bottom status bar and profile plot panel
//! - `main_view`: central panel with the detector image and overlays

mod control_panel;
mod main_view;
