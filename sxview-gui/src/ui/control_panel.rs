//! Control panel (left sidebar), status bar, and profile plot panel.

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use log::warn;

use crate::app::SxviewApp;
use crate::demo;
use crate::scene::tooltip::CursorMode;
use crate::scene::InteractionMode;
use crate::util::usize_to_f64;
use crate::viewer::Colormap;

const MODES: &[(InteractionMode, &str)] = &[
    (InteractionMode::Zoom, "Zoom"),
    (InteractionMode::Select, "Select"),
    (InteractionMode::Line, "Line cut"),
    (InteractionMode::HorizontalSlice, "Horizontal slice"),
    (InteractionMode::VerticalSlice, "Vertical slice"),
    (InteractionMode::BoxMask, "Box mask"),
    (InteractionMode::EllipseMask, "Ellipse mask"),
    (InteractionMode::Indexing, "Indexing"),
];

const CURSOR_MODES: &[(CursorMode, &str)] = &[
    (CursorMode::Pixel, "Pixel"),
    (CursorMode::GammaNu, "Gamma/Nu"),
    (CursorMode::TwoTheta, "2-Theta"),
    (CursorMode::DSpacing, "d-Spacing"),
    (CursorMode::MillerIndices, "Miller indices"),
];

impl SxviewApp {
    /// Render the left sidebar with all view controls.
    pub(crate) fn render_side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("controls")
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("SXVIEW");
                ui.separator();

                ui.label("Interaction mode");
                for &(mode, label) in MODES {
                    let mut current = self.scene.mode();
                    if ui.selectable_value(&mut current, mode, label).clicked() {
                        self.scene.set_mode(mode);
                    }
                }
                ui.separator();

                self.frame_scrubber(ui);
                self.intensity_controls(ui);
                ui.separator();

                self.cursor_mode_picker(ui);
                ui.separator();

                ui.label("Overlays");
                let mut integration = self.scene.integration_enabled();
                if ui.checkbox(&mut integration, "Integration regions").changed() {
                    self.scene.set_integration_enabled(integration);
                }
                ui.checkbox(&mut self.display.show_peak_areas, "Peak areas");
                ui.checkbox(&mut self.display.show_peak_labels, "Peak labels");
                ui.checkbox(&mut self.display.show_masks, "Masks");
                ui.separator();

                self.colormap_picker(ui);
                ui.separator();

                if ui.button("Reload demo data").clicked() {
                    match demo::demo_dataset() {
                        Ok(data) => self.scene.set_data(data, 0),
                        Err(err) => warn!("demo dataset unavailable: {err}"),
                    }
                }
            });

        self.render_status_bar(ctx);
    }

    fn frame_scrubber(&mut self, ui: &mut egui::Ui) {
        let Some(n_frames) = self.scene.data().map(sxview_core::DataSet::n_frames) else {
            return;
        };
        let mut frame = self.scene.frame_index();
        ui.label("Frame");
        if ui
            .add(egui::Slider::new(&mut frame, 0..=n_frames - 1))
            .changed()
        {
            self.scene.change_frame(frame);
        }
    }

    fn intensity_controls(&mut self, ui: &mut egui::Ui) {
        let mut intensity = self.scene.max_intensity();
        ui.label("Max intensity");
        if ui
            .add(egui::Slider::new(&mut intensity, 1..=10_000).logarithmic(true))
            .changed()
        {
            self.scene.set_max_intensity(intensity);
        }
        let mut log_scale = self.scene.logarithmic();
        if ui.checkbox(&mut log_scale, "Log scale").changed() {
            self.scene.set_logarithmic(log_scale);
        }
    }

    fn cursor_mode_picker(&mut self, ui: &mut egui::Ui) {
        let current = self.scene.cursor_mode();
        let current_label = CURSOR_MODES
            .iter()
            .find(|(m, _)| *m == current)
            .map_or("Pixel", |(_, l)| l);
        ui.label("Cursor readout");
        egui::ComboBox::from_id_salt("cursor_mode")
            .selected_text(current_label)
            .show_ui(ui, |ui| {
                for &(mode, label) in CURSOR_MODES {
                    let mut selected = current;
                    if ui.selectable_value(&mut selected, mode, label).clicked() {
                        self.scene.set_cursor_mode(mode);
                    }
                }
            });
    }

    fn colormap_picker(&mut self, ui: &mut egui::Ui) {
        ui.label("Colormap");
        let before = self.display.colormap;
        egui::ComboBox::from_id_salt("colormap")
            .selected_text(self.display.colormap.to_string())
            .show_ui(ui, |ui| {
                for map in [Colormap::Grayscale, Colormap::Hot, Colormap::Viridis] {
                    ui.selectable_value(&mut self.display.colormap, map, map.to_string());
                }
            });
        if self.display.colormap != before {
            self.texture = None;
        }
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if let Some(text) = &self.cursor_text {
                    ui.monospace(text);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(&self.status);
                });
            });
        });
    }

    /// Render the bottom panel with the latest 1-D profile, if any.
    pub(crate) fn render_profile_panel(&mut self, ctx: &egui::Context) {
        let Some(profile) = &self.profile else {
            return;
        };
        let mut keep_open = true;
        egui::TopBottomPanel::bottom("profile_panel")
            .default_height(160.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(profile.title);
                    if ui.button("Close").clicked() {
                        keep_open = false;
                    }
                });
                let points: PlotPoints = profile
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, &v)| [usize_to_f64(i), v])
                    .collect();
                Plot::new("profile_plot")
                    .height(120.0)
                    .show(ui, |plot_ui| plot_ui.line(Line::new(points)));
            });
        if !keep_open {
            self.profile = None;
        }
    }
}
