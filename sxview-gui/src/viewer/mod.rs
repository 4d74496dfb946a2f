//! Visualization modules for the detector image.

mod colormap;
mod texture;

pub use colormap::Colormap;
pub use texture::{render_frame_image, visible_window};
