use crate::app::resources::Texture;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: i32 = 5;
const FIRST_GLYPH: u32 = ' ' as u32;
const FALLBACK_GLYPH: char = '?';

/// Printable ASCII, 3x5 cells packed row-major from the top, 3 bits per row.
#[rustfmt::skip]
const GLYPHS: [u16; 95] = [
    0x0000, 0x2482, 0x5A00, 0x5F7D, 0x7DDF, 0x52A5, 0x2AAB, 0x2400,
    0x1491, 0x4494, 0x0AA8, 0x05D0, 0x0014, 0x01C0, 0x0002, 0x12A4,
    0x7B6F, 0x2C97, 0x73E7, 0x73CF, 0x5BC9, 0x79CF, 0x79EF, 0x7292,
    0x7BEF, 0x7BCF, 0x0410, 0x0414, 0x1511, 0x0E38, 0x4454, 0x72C2,
    0x7BE7, 0x2BED, 0x6BAE, 0x7927, 0x6B6E, 0x79A7, 0x79A4, 0x796F,
    0x5BED, 0x7497, 0x726F, 0x5BAD, 0x4927, 0x5FED, 0x5FFD, 0x7B6F,
    0x6BA4, 0x7B79, 0x6BAD, 0x79CF, 0x7492, 0x5B6F, 0x5B6A, 0x5BFD,
    0x5AAD, 0x5A92, 0x72A7, 0x6926, 0x4889, 0x324B, 0x2A00, 0x0007,
    0x4400, 0x0E7F, 0x49AE, 0x0F27, 0x13EF, 0x0FA7, 0x39A4, 0x0F79,
    0x49AD, 0x2092, 0x106A, 0x4BAD, 0x4927, 0x0DED, 0x0D6D, 0x0F6F,
    0x0D74, 0x0F79, 0x0D64, 0x0F8F, 0x2E93, 0x0B6F, 0x0B6A, 0x0B7A,
    0x0A95, 0x0B79, 0x0E57, 0x3593, 0x2492, 0x64D6, 0x0780,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const BLACK: Rgba = Rgba([0, 0, 0, 255]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self([r, g, b, 255])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ScreenRect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Immediate-mode drawing surface in screen pixels, origin top-left.
pub trait Canvas {
    fn size(&self) -> (u32, u32);
    fn clear(&mut self, color: Rgba);
    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba);
    fn stroke_rect(&mut self, rect: ScreenRect, color: Rgba);
    fn draw_texture(&mut self, texture: &Texture, dest: ScreenRect);
    fn measure_text(&self, text: &str, scale: i32) -> (i32, i32) {
        measure_text(text, scale)
    }
    fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: Rgba);
}

/// Width and height of `text` drawn with the built-in font.
pub fn measure_text(text: &str, scale: i32) -> (i32, i32) {
    let scale = scale.max(1);
    let count = text.chars().count() as i32;
    if count == 0 {
        return (0, GLYPH_HEIGHT * scale);
    }
    (
        count * (GLYPH_WIDTH + 1) * scale - scale,
        GLYPH_HEIGHT * scale,
    )
}

fn glyph_bits(ch: char) -> u16 {
    let lookup = |ch: char| {
        (ch as u32)
            .checked_sub(FIRST_GLYPH)
            .and_then(|index| GLYPHS.get(index as usize).copied())
    };
    lookup(ch)
        .or_else(|| lookup(FALLBACK_GLYPH))
        .unwrap_or(0)
}

/// Canvas over a borrowed RGBA8 frame; every write is clipped.
pub struct FrameCanvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameCanvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return;
        }
        let Some(offset) = (y as usize)
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x as usize))
            .and_then(|pixel| pixel.checked_mul(4))
        else {
            return;
        };
        let Some(dst) = self.frame.get_mut(offset..offset + 4) else {
            return;
        };
        let [r, g, b, a] = color.0;
        match a {
            0 => {}
            255 => dst.copy_from_slice(&color.0),
            alpha => {
                let alpha = u16::from(alpha);
                let inverse = 255 - alpha;
                for (channel, source) in dst.iter_mut().zip([r, g, b]) {
                    *channel =
                        ((u16::from(source) * alpha + u16::from(*channel) * inverse) / 255) as u8;
                }
                dst[3] = 255;
            }
        }
    }
}

impl Canvas for FrameCanvas<'_> {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color.0);
        }
    }

    fn fill_rect(&mut self, rect: ScreenRect, color: Rgba) {
        let start_x = rect.x.max(0);
        let start_y = rect.y.max(0);
        let end_x = rect.x.saturating_add(rect.width).min(self.width as i32);
        let end_y = rect.y.saturating_add(rect.height).min(self.height as i32);
        for y in start_y..end_y {
            for x in start_x..end_x {
                self.blend_pixel(x, y, color);
            }
        }
    }

    fn stroke_rect(&mut self, rect: ScreenRect, color: Rgba) {
        if rect.width <= 1 || rect.height <= 1 {
            return;
        }
        let ScreenRect {
            x,
            y,
            width,
            height,
        } = rect;
        self.fill_rect(ScreenRect::new(x, y, width, 1), color);
        self.fill_rect(ScreenRect::new(x, y + height - 1, width, 1), color);
        self.fill_rect(ScreenRect::new(x, y + 1, 1, height - 2), color);
        self.fill_rect(ScreenRect::new(x + width - 1, y + 1, 1, height - 2), color);
    }

    /// Nearest-neighbour scaled to `dest`.
    fn draw_texture(&mut self, texture: &Texture, dest: ScreenRect) {
        if dest.width <= 0 || dest.height <= 0 {
            return;
        }
        let start_x = dest.x.max(0);
        let start_y = dest.y.max(0);
        let end_x = dest.x.saturating_add(dest.width).min(self.width as i32);
        let end_y = dest.y.saturating_add(dest.height).min(self.height as i32);
        for y in start_y..end_y {
            let v = ((y - dest.y) as i64 * texture.height() as i64 / dest.height as i64) as u32;
            for x in start_x..end_x {
                let u = ((x - dest.x) as i64 * texture.width() as i64 / dest.width as i64) as u32;
                if let Some(pixel) = texture.pixel(u, v) {
                    self.blend_pixel(x, y, Rgba(pixel));
                }
            }
        }
    }

    fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, color: Rgba) {
        let scale = scale.max(1);
        let advance = (GLYPH_WIDTH + 1) * scale;
        for (index, ch) in text.chars().enumerate() {
            let bits = glyph_bits(ch);
            let origin_x = x + index as i32 * advance;
            for row in 0..GLYPH_HEIGHT {
                for col in 0..GLYPH_WIDTH {
                    let bit = (GLYPH_HEIGHT - 1 - row) * GLYPH_WIDTH + (GLYPH_WIDTH - 1 - col);
                    if bits & (1 << bit) == 0 {
                        continue;
                    }
                    self.fill_rect(
                        ScreenRect::new(origin_x + col * scale, y + row * scale, scale, scale),
                        color,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    #[test]
    fn fill_rect_is_clipped_to_frame() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 4);
        canvas.fill_rect(ScreenRect::new(-2, -2, 4, 4), Rgba::WHITE);
        canvas.fill_rect(ScreenRect::new(3, 3, 100, 100), Rgba::opaque(1, 2, 3));
        assert_eq!(pixel(&frame, 4, 0, 0), Rgba::WHITE.0);
        assert_eq!(pixel(&frame, 4, 1, 1), Rgba::WHITE.0);
        assert_eq!(pixel(&frame, 4, 2, 2), [0, 0, 0, 0]);
        assert_eq!(pixel(&frame, 4, 3, 3), [1, 2, 3, 255]);
    }

    #[test]
    fn translucent_fill_blends_over_existing_pixels() {
        let mut frame = vec![0u8; 4];
        let mut canvas = FrameCanvas::new(&mut frame, 1, 1);
        canvas.clear(Rgba::opaque(0, 0, 200));
        canvas.fill_rect(ScreenRect::new(0, 0, 1, 1), Rgba::new(255, 0, 0, 0));
        assert_eq!(pixel(&frame, 1, 0, 0), [0, 0, 200, 255]);

        let mut canvas = FrameCanvas::new(&mut frame, 1, 1);
        canvas.fill_rect(ScreenRect::new(0, 0, 1, 1), Rgba::new(255, 0, 0, 255));
        assert_eq!(pixel(&frame, 1, 0, 0), [255, 0, 0, 255]);
    }

    #[test]
    fn text_metrics_follow_scale() {
        assert_eq!(measure_text("", 2), (0, 10));
        assert_eq!(measure_text("A", 1), (3, 5));
        assert_eq!(measure_text("AB", 3), (21, 15));
        assert_eq!(measure_text("AB", 0), measure_text("AB", 1));
    }

    #[test]
    fn glyph_lookup_covers_printable_ascii_and_falls_back() {
        assert_eq!(glyph_bits(' '), 0);
        assert_ne!(glyph_bits('A'), 0);
        assert_ne!(glyph_bits('~'), 0);
        assert_eq!(glyph_bits('\u{00e9}'), glyph_bits(FALLBACK_GLYPH));
    }

    #[test]
    fn draw_text_sets_glyph_pixels_and_is_safe_offscreen() {
        let (width, height) = (8u32, 8u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        let mut canvas = FrameCanvas::new(&mut frame, width, height);
        canvas.draw_text("|", 0, 0, 1, Rgba::WHITE);
        canvas.draw_text("WIDE TEXT", -50, -50, 4, Rgba::WHITE);
        canvas.draw_text("X", 7, 7, 9, Rgba::WHITE);
        // '|' is the centre column on every row.
        for y in 0..5 {
            assert_eq!(pixel(&frame, width, 1, y), Rgba::WHITE.0);
            assert_eq!(pixel(&frame, width, 0, y), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn draw_texture_scales_nearest_neighbour() {
        let texture = Texture::from_rgba(
            2,
            1,
            vec![10, 10, 10, 255, 20, 20, 20, 255],
        )
        .expect("texture");
        let mut frame = vec![0u8; 4 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 4, 1);
        canvas.draw_texture(&texture, ScreenRect::new(0, 0, 4, 1));
        assert_eq!(pixel(&frame, 4, 1, 0), [10, 10, 10, 255]);
        assert_eq!(pixel(&frame, 4, 2, 0), [20, 20, 20, 255]);
    }

    #[test]
    fn stroke_rect_leaves_interior_untouched() {
        let mut frame = vec![0u8; 5 * 5 * 4];
        let mut canvas = FrameCanvas::new(&mut frame, 5, 5);
        canvas.stroke_rect(ScreenRect::new(0, 0, 5, 5), Rgba::WHITE);
        assert_eq!(pixel(&frame, 5, 0, 0), Rgba::WHITE.0);
        assert_eq!(pixel(&frame, 5, 4, 4), Rgba::WHITE.0);
        assert_eq!(pixel(&frame, 5, 2, 2), [0, 0, 0, 0]);
    }
}
