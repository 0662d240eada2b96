// Demo window + overlay drawing.
// The window shows the sketch surface; the overlay helpers draw the cursor
// and a 5x7 bitmap HUD straight into the frame about to be presented.

use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use crate::error::{Error, Result};
use crate::types::{FrameBuffer, Tool};

const TOOL_KEYS: [Key; 6] = [Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5, Key::Key6];

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Open a resizable window capped at `fps` refreshes per second.
    pub fn new(title: &str, width: usize, height: usize, fps: usize) -> Result<Self> {
        let options = WindowOptions { resize: true, ..WindowOptions::default() };
        let mut window = Window::new(title, width, height, options).map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(fps);
        Ok(Self { window })
    }

    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Client area in window pixels.
    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    /// Mouse position in window pixels, clamped to the client area.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Clamp)
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    pub fn shift_down(&self) -> bool {
        self.window.is_key_down(Key::LeftShift) || self.window.is_key_down(Key::RightShift)
    }

    /// Edge-triggered key press (no auto-repeat).
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// Number keys 1..6 pick a tool in `Tool::ALL` order.
    pub fn tool_key(&self) -> Option<Tool> {
        TOOL_KEYS.iter().zip(Tool::ALL).find(|(key, _)| self.pressed_once(**key)).map(|(_, tool)| tool)
    }
}

/* ---------- Software overlay: pixels, cursor shapes, tiny bitmap font ---------- */

#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x < fb.width && y < fb.height {
        fb.pixels[y * fb.width + x] = color;
    }
}

/// Bresenham.
fn draw_line(fb: &mut FrameBuffer, mut x0: i32, mut y0: i32, x1: i32, y1: i32, color: u32) {
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// "+" with a small hole in the middle and a dot at the center.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// One-pixel circle outline (midpoint algorithm). Used as the eraser cursor.
pub fn draw_ring(fb: &mut FrameBuffer, cx: i32, cy: i32, radius: i32, color: u32) {
    if radius <= 0 {
        put_pixel(fb, cx, cy, color);
        return;
    }
    let (mut x, mut y, mut err) = (radius, 0, 1 - radius);
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            put_pixel(fb, cx + px, cy + py, color);
        }
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/* ---------- 5x7 bitmap font ---------- */

/// Each u8 is a row; the low 5 bits are the pixels (bit 4 = leftmost).
/// Lowercase input is drawn with the uppercase glyph.
fn glyph5x7(ch: char) -> Option<[u8; 7]> {
    macro_rules! g {
        ($a:expr, $b:expr, $c:expr, $d:expr, $e:expr, $f:expr, $g:expr) => {
            Some([$a, $b, $c, $d, $e, $f, $g])
        };
    }

    match ch.to_ascii_uppercase() {
        '0' => g!(0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110),
        '1' => g!(0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110),
        '2' => g!(0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111),
        '3' => g!(0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110),
        '4' => g!(0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010),
        '5' => g!(0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110),
        '6' => g!(0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110),
        '7' => g!(0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000),
        '8' => g!(0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110),
        '9' => g!(0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100),

        'A' => g!(0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001),
        'B' => g!(0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110),
        'C' => g!(0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110),
        'D' => g!(0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100),
        'E' => g!(0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111),
        'F' => g!(0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000),
        'G' => g!(0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111),
        'H' => g!(0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001),
        'I' => g!(0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110),
        'K' => g!(0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001),
        'L' => g!(0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111),
        'M' => g!(0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001),
        'N' => g!(0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001),
        'O' => g!(0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110),
        'P' => g!(0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000),
        'R' => g!(0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001),
        'S' => g!(0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110),
        'T' => g!(0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100),
        'U' => g!(0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110),
        'W' => g!(0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010),

        ' ' => g!(0, 0, 0, 0, 0, 0, 0),
        '|' => g!(0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100),
        ':' => g!(0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000, 0b00000),
        '.' => g!(0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b00000),
        '-' => g!(0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000),
        '/' => g!(0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000),
        '[' => g!(0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110),
        ']' => g!(0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110),

        _ => None,
    }
}

/// One glyph at (x,y) with a 1px dark drop shadow.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else {
        return;
    };
    for (offset, ink) in [(1, 0x00_00_00_00), (0, color)] {
        for (ry, bits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if bits & (1 << (4 - rx)) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, ink);
                }
            }
        }
    }
}

/// 6px advance per character (5px glyph + 1px spacing).
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Gesture;

    #[test]
    fn pixels_outside_are_ignored() {
        let mut fb = FrameBuffer::filled(4, 4, 0);
        put_pixel(&mut fb, -1, 2, 7);
        put_pixel(&mut fb, 4, 0, 7);
        put_pixel(&mut fb, 3, 3, 7);
        assert_eq!(fb.pixels.iter().filter(|&&p| p == 7).count(), 1);
    }

    #[test]
    fn crosshair_keeps_a_gap_around_center() {
        let mut fb = FrameBuffer::filled(32, 32, 0);
        draw_crosshair(&mut fb, 16, 16, 6, 1);
        assert_eq!(fb.pixels[16 * 32 + 16], 1);
        assert_eq!(fb.pixels[16 * 32 + 17], 0);
        assert_eq!(fb.pixels[16 * 32 + 22], 1);
        assert_eq!(fb.pixels[10 * 32 + 16], 1);
    }

    #[test]
    fn ring_touches_its_radius_only() {
        let mut fb = FrameBuffer::filled(41, 41, 0);
        draw_ring(&mut fb, 20, 20, 10, 1);
        assert_eq!(fb.pixels[20 * 41 + 30], 1);
        assert_eq!(fb.pixels[10 * 41 + 20], 1);
        assert_eq!(fb.pixels[20 * 41 + 20], 0);
    }

    #[test]
    fn hud_labels_have_glyphs() {
        let labels = Tool::ALL.iter().map(|t| t.label()).chain(
            [Gesture::None, Gesture::Drawing, Gesture::Erasing, Gesture::Selecting].map(Gesture::label),
        );
        for label in labels.chain(["HAND", "MOUSE", "FPS: 59.9", "W: 4 [ ]", "U: undo / C: clear"]) {
            for ch in label.chars() {
                assert!(glyph5x7(ch).is_some(), "missing glyph {ch:?} in {label}");
            }
        }
    }

    #[test]
    fn text_advances_six_pixels() {
        let mut fb = FrameBuffer::filled(20, 10, 0);
        draw_text_5x7(&mut fb, 0, 0, "II", 0x00_FF_FF_FF);
        // 'I' top row is 0b01110: columns 1..=3 of each glyph
        assert_eq!(fb.pixels[1], 0x00_FF_FF_FF);
        assert_eq!(fb.pixels[7], 0x00_FF_FF_FF);
        assert_eq!(fb.pixels[5], 0);
    }
}
