use crate::assets::{AssetRegistry, FontHandle, TextureHandle};
use crate::geometry::Rect;

/// Software drawing surface over an RGBA8 frame. All drawing is clipped.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    assets: &'a AssetRegistry,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32, assets: &'a AssetRegistry) -> Self {
        Self {
            frame,
            width,
            height,
            assets,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn assets(&self) -> &AssetRegistry {
        self.assets
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let (x, y, w, h) = pixel_bounds(rect);
        self.fill_px(x, y, w, h, color);
    }

    pub fn outline_rect(&mut self, rect: Rect, color: [u8; 4]) {
        let (x, y, w, h) = pixel_bounds(rect);
        if w <= 1 || h <= 1 {
            return;
        }
        self.fill_px(x, y, w, 1, color);
        self.fill_px(x, y + h - 1, w, 1, color);
        self.fill_px(x, y, 1, h, color);
        self.fill_px(x + w - 1, y, 1, h, color);
    }

    /// Nearest-neighbour scale of the whole texture into `dest`. Unknown
    /// handles draw nothing.
    pub fn draw_texture(&mut self, texture: TextureHandle, dest: Rect) {
        let Some(texture) = self.assets.texture_data(texture) else {
            return;
        };
        let (left, top, dest_w, dest_h) = pixel_bounds(dest);
        if dest_w <= 0 || dest_h <= 0 || texture.width() == 0 || texture.height() == 0 {
            return;
        }

        let draw_left = left.max(0);
        let draw_top = top.max(0);
        let draw_right = (left + dest_w).min(self.width as i32);
        let draw_bottom = (top + dest_h).min(self.height as i32);

        for out_y in draw_top..draw_bottom {
            let src_y = ((out_y - top) as u64 * texture.height() as u64 / dest_h as u64) as u32;
            for out_x in draw_left..draw_right {
                let src_x =
                    ((out_x - left) as u64 * texture.width() as u64 / dest_w as u64) as u32;
                if let Some(color) = texture.pixel(src_x, src_y) {
                    self.blend_pixel(out_x, out_y, color);
                }
            }
        }
    }

    /// Draws a single line of text with its top-left corner at (`x`, `y`).
    /// Each font pixel becomes a `scale`×`scale` block.
    pub fn draw_text(
        &mut self,
        font: FontHandle,
        text: &str,
        x: i32,
        y: i32,
        scale: u32,
        color: [u8; 4],
    ) {
        let Some(font) = self.assets.font_data(font) else {
            return;
        };
        let scale = scale.max(1) as i32;
        let glyph_width = font.glyph_width();
        let glyph_height = font.glyph_height();
        let advance = (glyph_width as i32 + 1) * scale;

        let mut pen_x = x;
        for ch in text.chars() {
            for row in 0..glyph_height {
                for col in 0..glyph_width {
                    if font.is_lit(ch, col, row) {
                        self.fill_px(
                            pen_x + col as i32 * scale,
                            y + row as i32 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
            pen_x += advance;
        }
    }

    pub fn text_width(&self, font: FontHandle, text: &str, scale: u32) -> u32 {
        let Some(font) = self.assets.font_data(font) else {
            return 0;
        };
        let count = text.chars().count() as u32;
        if count == 0 {
            return 0;
        }
        (font.glyph_width() + 1) * scale.max(1) * count - scale.max(1)
    }

    pub fn line_height(&self, font: FontHandle, scale: u32) -> u32 {
        self.assets
            .font_data(font)
            .map(|font| (font.glyph_height() + 2) * scale.max(1))
            .unwrap_or(0)
    }

    fn fill_px(&mut self, x: i32, y: i32, w: i32, h: i32, color: [u8; 4]) {
        let start_x = x.max(0);
        let start_y = y.max(0);
        let end_x = x.saturating_add(w).min(self.width as i32);
        let end_y = y.saturating_add(h).min(self.height as i32);
        if end_x <= start_x || end_y <= start_y {
            return;
        }
        for py in start_y..end_y {
            for px in start_x..end_x {
                self.blend_pixel(px, py, color);
            }
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        if color[3] == 0 || x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        if color[3] == u8::MAX {
            dst.copy_from_slice(&color);
            return;
        }
        let alpha = color[3] as u32;
        for channel in 0..3 {
            let blended = (color[channel] as u32 * alpha + dst[channel] as u32 * (255 - alpha)) / 255;
            dst[channel] = blended as u8;
        }
        dst[3] = u8::MAX;
    }
}

fn pixel_bounds(rect: Rect) -> (i32, i32, i32, i32) {
    (
        rect.left.round() as i32,
        rect.top.round() as i32,
        rect.width.round() as i32,
        rect.height.round() as i32,
    )
}
