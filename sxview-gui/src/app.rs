//! Main application state and logic.
//!
//! Contains the `SxviewApp` struct which owns the detector scene,
//! per-view display options, and the cached frame texture.

use eframe::egui;
use log::{info, warn};

use crate::demo;
use crate::scene::event::{PlotSource, SceneEvent};
use crate::scene::overlay::CutterKind;
use crate::scene::DetectorScene;
use crate::state::DisplayConfig;
use crate::viewer::render_frame_image;

/// A 1-D profile shown in the plot panel.
pub(crate) struct ProfilePlot {
    /// Plot title, derived from the cut kind.
    pub(crate) title: &'static str,
    /// Projected intensities.
    pub(crate) values: Vec<f64>,
}

/// Main application state.
pub struct SxviewApp {
    /// The detector scene driving everything.
    pub(crate) scene: DetectorScene,
    /// Per-view display options.
    pub(crate) display: DisplayConfig,
    /// Cached frame texture; dropped whenever the scene reports a change.
    pub(crate) texture: Option<egui::TextureHandle>,
    /// Latest tooltip text for the cursor position.
    pub(crate) cursor_text: Option<String>,
    /// Latest requested 1-D profile, if any.
    pub(crate) profile: Option<ProfilePlot>,
    /// Status line shown at the bottom.
    pub(crate) status: String,
}

impl Default for SxviewApp {
    fn default() -> Self {
        let mut scene = DetectorScene::new();
        match demo::demo_dataset() {
            Ok(data) => scene.set_data(data, 0),
            Err(err) => warn!("demo dataset unavailable: {err}"),
        }
        Self {
            scene,
            display: DisplayConfig::default(),
            texture: None,
            cursor_text: None,
            profile: None,
            status: String::new(),
        }
    }
}

impl SxviewApp {
    /// Drain the scene's event queue and react to each event.
    pub(crate) fn handle_scene_events(&mut self, ctx: &egui::Context) {
        for event in self.scene.drain_events() {
            match event {
                SceneEvent::DataChanged => self.texture = None,
                SceneEvent::FrameChanged(index) => {
                    self.texture = None;
                    self.status = format!("frame {index}");
                }
                SceneEvent::MaskChanged => {
                    self.texture = None;
                    let n = self.scene.data().map_or(0, sxview_core::DataSet::n_masks);
                    self.status = format!("{n} mask(s)");
                }
                SceneEvent::PeakSelected(id) => {
                    info!("peak {} selected", id.index());
                    self.status = format!("peak {}", id.index());
                }
                SceneEvent::PlotRequest(source) => self.handle_plot_request(source),
            }
        }
        if self.texture.is_none() {
            self.refresh_texture(ctx);
        }
    }

    fn handle_plot_request(&mut self, source: PlotSource) {
        match source {
            PlotSource::Cutter { kind, profile } => {
                let title = match kind {
                    CutterKind::Line => "Line cut",
                    CutterKind::HorizontalSlice => "Horizontal slice",
                    CutterKind::VerticalSlice => "Vertical slice",
                };
                self.profile = Some(ProfilePlot {
                    title,
                    values: profile,
                });
            }
            PlotSource::Peak(id) => {
                self.status = format!("peak {} under cursor", id.index());
            }
        }
    }

    /// Re-render the visible part of the frame into the texture cache.
    fn refresh_texture(&mut self, ctx: &egui::Context) {
        let Some(visible) = self.scene.visible_rect().copied() else {
            return;
        };
        let max_intensity = self.scene.max_intensity();
        let log_scale = self.scene.logarithmic();
        let colormap = self.display.colormap;
        let raster = self.scene.integration_raster().cloned();
        let Some(counts) = self.scene.frame_counts() else {
            return;
        };
        let image = render_frame_image(
            counts,
            &visible,
            max_intensity,
            log_scale,
            colormap,
            raster.as_ref(),
        );
        self.texture = Some(ctx.load_texture("frame", image, egui::TextureOptions::NEAREST));
    }
}

impl eframe::App for SxviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_scene_events(ctx);
        self.render_side_panel(ctx);
        self.render_profile_panel(ctx);
        self.render_central_panel(ctx);
    }
}
