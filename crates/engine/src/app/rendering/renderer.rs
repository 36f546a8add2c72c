use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::scene::SceneMachine;
use crate::assets::AssetRegistry;

use super::Canvas;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];

/// Presents a fixed-size logical frame, scaled to the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    frame_width: u32,
    frame_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, frame_width: u32, frame_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            frame_width,
            frame_height,
            size.width,
            size.height,
        )?;
        Ok(Self {
            window,
            pixels,
            frame_width,
            frame_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            self.frame_width,
            self.frame_height,
            width,
            height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        frame_width: u32,
        frame_height: u32,
        surface_width: u32,
        surface_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width.max(1), surface_height.max(1), window);
        Pixels::new(frame_width, frame_height, surface)
    }

    pub(crate) fn render(
        &mut self,
        scenes: &SceneMachine,
        assets: &AssetRegistry,
    ) -> Result<(), Error> {
        {
            let frame = self.pixels.frame_mut();
            let mut canvas = Canvas::new(frame, self.frame_width, self.frame_height, assets);
            canvas.clear(CLEAR_COLOR);
            scenes.draw_active(&mut canvas);
        }
        self.pixels.render()
    }
}
