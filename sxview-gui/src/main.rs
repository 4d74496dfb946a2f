//! Sxview GUI application entry point.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod demo;
mod scene;
mod state;
mod ui;
mod util;
mod viewer;

use app::SxviewApp;
use eframe::egui;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let opts = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Sxview",
        opts,
        Box::new(|_cc| Ok(Box::new(SxviewApp::default()))),
    )
}
