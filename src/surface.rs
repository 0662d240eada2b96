// Drawing-surface capability.
//
// The pipeline only ever talks to a canvas through `DrawingSurface`: a
// path API in logical pixels plus whole-raster capture/restore for undo.
// `crate::raster::RasterSurface` is the software implementation;
// `RecordingSurface` logs calls for headless inspection.

use serde::{Deserialize, Serialize};

/// How paths are stroked.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: u32, // 0x00RRGGBB
    pub width: f32, // logical pixels
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { color: 0x00_1E_1E_28, width: 4.0 }
    }
}

/// Axis-aligned rectangle in logical pixels. Width and height are never negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_corners((x, y), (x + width, y + height))
    }

    /// Bounding box of two opposite corners, in any order.
    pub fn from_corners(a: (f32, f32), b: (f32, f32)) -> Self {
        Self {
            x: a.0.min(b.0),
            y: a.1.min(b.1),
            width: (a.0 - b.0).abs(),
            height: (a.1 - b.1).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Opaque full-raster capture.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Snapshot {
    pub fn from_pixels(width: usize, height: usize, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Approximate heap footprint, for history accounting.
    pub fn byte_size(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<u32>()
    }
}

pub trait DrawingSurface {
    /// Logical size (what callers draw in).
    fn size(&self) -> (f32, f32);

    fn set_stroke_style(&mut self, style: StrokeStyle);
    fn stroke_style(&self) -> StrokeStyle;

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f32, y: f32);
    fn line_to(&mut self, x: f32, y: f32);
    fn quadratic_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32);
    /// Circular arc from `start` to `end` radians, clockwise in screen space.
    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32);
    /// Paint the current path with the current style. The path stays until `begin_path`.
    fn stroke(&mut self);

    /// Outline `rect` right away; the current path is not touched.
    fn stroke_rect(&mut self, rect: Rect);
    fn clear_rect(&mut self, rect: Rect);
    fn clear_disc(&mut self, cx: f32, cy: f32, radius: f32);

    fn capture_snapshot(&self) -> Snapshot;
    fn restore_snapshot(&mut self, snapshot: &Snapshot);

    /// Reallocate for a new logical size, keeping what is already drawn.
    fn resize(&mut self, width: usize, height: usize);

    /// Wipe everything.
    fn blank(&mut self) {
        let (w, h) = self.size();
        self.clear_rect(Rect::new(0.0, 0.0, w, h));
    }
}

/* ------------------------------- Recording surface ------------------------------- */

/// One logged call on a [`RecordingSurface`].
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    SetStyle(StrokeStyle),
    BeginPath,
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadraticCurveTo { cx: f32, cy: f32, x: f32, y: f32 },
    Arc { cx: f32, cy: f32, radius: f32, start: f32, end: f32 },
    Stroke,
    StrokeRect(Rect),
    ClearRect(Rect),
    ClearDisc { cx: f32, cy: f32, radius: f32 },
    Restore(u32),
    Resize(usize, usize),
}

/// Surface that paints nothing and remembers every call.
/// Each mutating call shows a fresh generation number; snapshots capture it,
/// so "restored to snapshot N" is observable without real pixels.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    width: usize,
    height: usize,
    style: StrokeStyle,
    generation: u32,
    counter: u32,
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, ..Self::default() }
    }

    /// Generation currently shown (0 = never drawn on, or blanked).
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Every path vertex (move/line/curve endpoints) in call order.
    pub fn path_vertices(&self) -> Vec<(f32, f32)> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                DrawCommand::MoveTo(x, y) | DrawCommand::LineTo(x, y) => Some((x, y)),
                DrawCommand::QuadraticCurveTo { x, y, .. } => Some((x, y)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, matches: impl Fn(&DrawCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| matches(c)).count()
    }

    fn touch(&mut self, cmd: DrawCommand) {
        self.counter += 1;
        self.generation = self.counter;
        self.commands.push(cmd);
    }
}

impl DrawingSurface for RecordingSurface {
    fn size(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.style = style;
        self.commands.push(DrawCommand::SetStyle(style));
    }

    fn stroke_style(&self) -> StrokeStyle {
        self.style
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(DrawCommand::LineTo(x, y));
    }

    fn quadratic_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        self.commands.push(DrawCommand::QuadraticCurveTo { cx, cy, x, y });
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) {
        self.commands.push(DrawCommand::Arc { cx, cy, radius, start, end });
    }

    fn stroke(&mut self) {
        self.touch(DrawCommand::Stroke);
    }

    fn stroke_rect(&mut self, rect: Rect) {
        self.touch(DrawCommand::StrokeRect(rect));
    }

    fn clear_rect(&mut self, rect: Rect) {
        let full = rect.x <= 0.0
            && rect.y <= 0.0
            && rect.right() >= self.width as f32
            && rect.bottom() >= self.height as f32;
        if full {
            self.commands.push(DrawCommand::ClearRect(rect));
            self.generation = 0;
        } else {
            self.touch(DrawCommand::ClearRect(rect));
        }
    }

    fn clear_disc(&mut self, cx: f32, cy: f32, radius: f32) {
        self.touch(DrawCommand::ClearDisc { cx, cy, radius });
    }

    fn capture_snapshot(&self) -> Snapshot {
        Snapshot::from_pixels(1, 1, vec![self.generation])
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        let generation = snapshot.pixels().first().copied().unwrap_or(0);
        self.generation = generation;
        self.commands.push(DrawCommand::Restore(generation));
    }

    fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.commands.push(DrawCommand::Resize(width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners((50.0, 10.0), (20.0, 40.0));
        assert_eq!(r, Rect { x: 20.0, y: 10.0, width: 30.0, height: 30.0 });
        assert_eq!(Rect::new(5.0, 5.0, -5.0, 10.0), Rect { x: 0.0, y: 5.0, width: 5.0, height: 10.0 });
    }

    #[test]
    fn recording_surface_tracks_generations() {
        let mut s = RecordingSurface::new(100, 100);
        s.begin_path();
        s.move_to(1.0, 1.0);
        s.line_to(5.0, 5.0);
        s.stroke();
        let snap = s.capture_snapshot();
        s.stroke();
        assert_eq!(s.generation(), 2);
        s.restore_snapshot(&snap);
        assert_eq!(s.generation(), 1);
        s.blank();
        assert_eq!(s.generation(), 0);
        assert_eq!(s.path_vertices(), vec![(1.0, 1.0), (5.0, 5.0)]);
    }
}
