use std::sync::Arc;

use pixels::{Error, Pixels, PixelsBuilder, SurfaceTexture};
use winit::window::Window;

use super::canvas::{Canvas, FrameCanvas};
use super::Viewport;

/// Window-backed framebuffer; modes draw into it through [`Canvas`].
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    vsync: bool,
}

impl Renderer {
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height, vsync)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            vsync,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }

        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height, self.vsync)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    /// Hands the frame to `draw` as a canvas, then presents it.
    pub fn draw_frame(&mut self, draw: impl FnOnce(&mut dyn Canvas)) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let Viewport { width, height } = self.viewport;
        {
            let mut canvas = FrameCanvas::new(self.pixels.frame_mut(), width, height);
            draw(&mut canvas);
        }
        self.pixels.render()
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        PixelsBuilder::new(width, height, surface)
            .enable_vsync(vsync)
            .build()
    }
}
