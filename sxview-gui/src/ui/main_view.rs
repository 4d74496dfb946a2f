//! Main view (central panel): detector image, overlays, and input
//! forwarding to the scene.
//!
//! Plot coordinates put y up while detector rows grow downward, so rows
//! are mirrored about the frame height on the way in and out.

use eframe::egui;
use egui_plot::{Line, Plot, PlotImage, PlotPoint, PlotPoints, PlotUi, Text};

use crate::app::SxviewApp;
use crate::scene::overlay::CutterKind;
use crate::scene::zoom::Rect;
use crate::scene::MouseButton;
use crate::util::usize_to_f64;
use sxview_core::mask::MaskShape;

const ELLIPSE_SEGMENTS: usize = 64;

impl SxviewApp {
    /// Render the central panel with the frame image and overlays.
    pub(crate) fn render_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(n_rows) = self.scene.data().map(sxview_core::DataSet::n_rows) else {
                ui.centered_and_justified(|ui| ui.label("No data"));
                return;
            };
            let n_rows = usize_to_f64(n_rows);
            let texture = self.texture.clone();
            let visible = self.scene.visible_rect().copied();

            let response = Plot::new("frame_plot")
                .data_aspect(1.0)
                .allow_drag(false)
                .allow_zoom(false)
                .allow_scroll(false)
                .allow_boxed_zoom(false)
                .show(ui, |plot_ui| {
                    if let (Some(tex), Some(rect)) = (&texture, &visible) {
                        let center = PlotPoint::new(
                            0.5 * (rect.left + rect.right),
                            n_rows - 0.5 * (rect.top + rect.bottom),
                        );
                        #[allow(clippy::cast_possible_truncation)]
                        plot_ui.image(PlotImage::new(
                            tex,
                            center,
                            [rect.width() as f32, rect.height() as f32],
                        ));
                    }
                    self.draw_overlays(plot_ui, n_rows);
                    plot_ui.pointer_coordinate()
                });

            let pointer = response.inner.map(|p| (p.x, n_rows - p.y));
            let hovered = response.response.hovered();
            self.forward_input(ui, hovered, pointer);
        });
    }

    /// Translate raw egui input into scene pointer/keyboard calls.
    fn forward_input(&mut self, ui: &egui::Ui, hovered: bool, pointer: Option<(f64, f64)>) {
        if ui.input(|i| i.key_pressed(egui::Key::Delete)) {
            self.scene.on_delete_key();
        }
        let Some(pos) = pointer.filter(|_| hovered) else {
            self.cursor_text = None;
            return;
        };
        self.cursor_text = self.scene.tooltip(pos.0, pos.1);

        let (primary_pressed, primary_down, primary_released, secondary_pressed, scroll) =
            ui.input(|i| {
                (
                    i.pointer.button_pressed(egui::PointerButton::Primary),
                    i.pointer.button_down(egui::PointerButton::Primary),
                    i.pointer.button_released(egui::PointerButton::Primary),
                    i.pointer.button_pressed(egui::PointerButton::Secondary),
                    i.raw_scroll_delta.y,
                )
            });

        if primary_pressed {
            self.scene.on_press(pos, MouseButton::Primary);
        }
        if secondary_pressed {
            self.scene.on_press(pos, MouseButton::Secondary);
        }
        self.scene.on_move(pos, primary_down);
        if primary_released {
            self.scene.on_release(pos, MouseButton::Primary);
        }
        if scroll > 0.0 {
            self.scene.on_wheel(pos, 1);
        } else if scroll < 0.0 {
            self.scene.on_wheel(pos, -1);
        }
    }

    fn draw_overlays(&self, plot_ui: &mut PlotUi, n_rows: f64) {
        if self.display.show_peak_areas || self.display.show_peak_labels {
            for overlay in self.scene.peak_overlays() {
                let color = if overlay.selected {
                    egui::Color32::WHITE
                } else if overlay.masked {
                    egui::Color32::DARK_GRAY
                } else {
                    egui::Color32::YELLOW
                };
                let (cx, cy) = overlay.ellipse.center;
                if self.display.show_peak_areas {
                    let (a, b) = overlay.ellipse.semi_axes;
                    plot_ui.line(ellipse_line(cx, cy, a, b, n_rows).color(color));
                }
                if self.display.show_peak_labels {
                    plot_ui.text(Text::new(
                        PlotPoint::new(cx, n_rows - cy),
                        format!("{}", overlay.peak.index()),
                    ));
                }
            }
        }

        if self.display.show_masks {
            for overlay in self.scene.mask_overlays() {
                let color = if overlay.selected {
                    egui::Color32::WHITE
                } else {
                    egui::Color32::LIGHT_BLUE
                };
                match overlay.shape {
                    MaskShape::Box => plot_ui.line(rect_line(&overlay.rect, n_rows).color(color)),
                    MaskShape::Ellipse => {
                        let cx = 0.5 * (overlay.rect.left + overlay.rect.right);
                        let cy = 0.5 * (overlay.rect.top + overlay.rect.bottom);
                        let a = 0.5 * overlay.rect.width();
                        let b = 0.5 * overlay.rect.height();
                        plot_ui.line(ellipse_line(cx, cy, a, b, n_rows).color(color));
                    }
                }
            }
        }

        if let Some(draft) = self.scene.mask_draft() {
            plot_ui.line(rect_line(&draft.rect(), n_rows).color(egui::Color32::GRAY));
        }

        if let Some(cutter) = self.scene.cutter() {
            let color = egui::Color32::LIGHT_GREEN;
            plot_ui.line(rect_line(&cutter.rect(), n_rows).color(color));
            if cutter.kind == CutterKind::Line {
                let points = PlotPoints::new(vec![
                    [cutter.from.0, n_rows - cutter.from.1],
                    [cutter.to.0, n_rows - cutter.to.1],
                ]);
                plot_ui.line(Line::new(points).color(color));
            }
        }

        if let Some(rect) = self.scene.zoom_draft_rect() {
            plot_ui.line(rect_line(&rect, n_rows).color(egui::Color32::WHITE));
        }
    }
}

/// Closed outline of a rectangle in plot coordinates.
fn rect_line(rect: &Rect, n_rows: f64) -> Line {
    let points = PlotPoints::new(vec![
        [rect.left, n_rows - rect.top],
        [rect.right, n_rows - rect.top],
        [rect.right, n_rows - rect.bottom],
        [rect.left, n_rows - rect.bottom],
        [rect.left, n_rows - rect.top],
    ]);
    Line::new(points)
}

/// Sampled outline of an axis-aligned ellipse in plot coordinates.
fn ellipse_line(cx: f64, cy: f64, a: f64, b: f64, n_rows: f64) -> Line {
    #[allow(clippy::cast_precision_loss)]
    let points: Vec<[f64; 2]> = (0..=ELLIPSE_SEGMENTS)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / ELLIPSE_SEGMENTS as f64;
            [cx + a * t.cos(), n_rows - (cy + b * t.sin())]
        })
        .collect();
    Line::new(PlotPoints::new(points))
}
