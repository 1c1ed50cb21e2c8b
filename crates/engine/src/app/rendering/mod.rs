mod canvas;
mod overlay;
mod renderer;
mod transform;

pub use canvas::{measure_text, Canvas, FrameCanvas, Rgba, ScreenRect};
pub(crate) use overlay::{draw_overlay, OverlayData};
pub use renderer::Renderer;
pub use transform::{world_to_screen, Camera2D, Viewport};
