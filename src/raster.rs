// Software canvas.
// Paths are flattened into polylines in device pixels. Stroking dabs a round,
// anti-aliased brush along every segment into a coverage mask, then blends the
// stroke color through the mask in one pass, so overlapping dabs never
// darken the stroke's soft edge. Sizes are logical pixels times the device
// pixel ratio.

use std::f32::consts::TAU;

use tracing::trace;

use crate::config::CanvasConfig;
use crate::gamma::GammaLut;
use crate::surface::{DrawingSurface, Rect, Snapshot, StrokeStyle};
use crate::types::FrameBuffer;

/// Per-pixel stroke coverage in [0,1] for the stroke being painted.
/// Only the dirty box is ever non-zero, so compositing skips the rest.
struct CoverageMask {
    width: usize,
    height: usize,
    alpha: Vec<f32>,
    dirty: Option<(usize, usize, usize, usize)>, // x0, y0, x1, y1 (inclusive)
}

impl CoverageMask {
    fn new(width: usize, height: usize) -> Self {
        Self { width, height, alpha: vec![0.0; width * height], dirty: None }
    }

    /// Stamp a round brush of `radius` at sub-pixel center (cx, cy).
    /// Coverage is the brush's signed distance mapped to a 1px ramp; the mask
    /// keeps the max so repeated dabs along a segment don't accumulate.
    fn dab(&mut self, cx: f32, cy: f32, radius: f32) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let reach = radius + 1.0;
        let x0 = (cx - reach).floor().max(0.0) as usize;
        let y0 = (cy - reach).floor().max(0.0) as usize;
        let x1 = ((cx + reach).ceil() as isize).min(self.width as isize - 1);
        let y1 = ((cy + reach).ceil() as isize).min(self.height as isize - 1);
        if x1 < 0 || y1 < 0 || x0 as isize > x1 || y0 as isize > y1 {
            return; // entirely off-surface
        }
        let (x1, y1) = (x1 as usize, y1 as usize);

        let mut touched = false;
        for y in y0..=y1 {
            let dy = y as f32 + 0.5 - cy;
            for x in x0..=x1 {
                let dx = x as f32 + 0.5 - cx;
                let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
                if coverage <= 0.0 {
                    continue;
                }
                let idx = y * self.width + x;
                if coverage > self.alpha[idx] {
                    self.alpha[idx] = coverage;
                }
                touched = true;
            }
        }
        if touched {
            self.dirty = Some(match self.dirty {
                None => (x0, y0, x1, y1),
                Some((a, b, c, d)) => (a.min(x0), b.min(y0), c.max(x1), d.max(y1)),
            });
        }
    }
}

pub struct RasterSurface {
    fb: FrameBuffer,
    logical: (usize, usize),
    pixel_ratio: f32,
    background: u32,
    style: StrokeStyle,
    path: Vec<Vec<(f32, f32)>>, // flattened subpaths, device pixels
    mask: CoverageMask,
    lut: GammaLut,
}

impl RasterSurface {
    /// Blank surface of `width` x `height` logical pixels.
    pub fn new(width: usize, height: usize, pixel_ratio: f32, background: u32) -> Self {
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        let (dw, dh) = device_size(width, height, pixel_ratio);
        Self {
            fb: FrameBuffer::filled(dw, dh, background),
            logical: (width, height),
            pixel_ratio,
            background,
            style: StrokeStyle::default(),
            path: Vec::new(),
            mask: CoverageMask::new(dw, dh),
            lut: GammaLut::new(),
        }
    }

    pub fn from_config(canvas: &CanvasConfig) -> Self {
        Self::new(canvas.width, canvas.height, canvas.pixel_ratio, canvas.background)
    }

    /// Device-pixel backing store (what gets presented).
    pub fn framebuffer(&self) -> &FrameBuffer {
        &self.fb
    }

    /// Device pixel at (x, y), if in bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        (x < self.fb.width && y < self.fb.height).then(|| self.fb.pixels[y * self.fb.width + x])
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn background(&self) -> u32 {
        self.background
    }

    #[inline]
    fn to_device(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.pixel_ratio, y * self.pixel_ratio)
    }

    fn current_point(&self) -> Option<(f32, f32)> {
        self.path.last().and_then(|sub| sub.last()).copied()
    }

    /// Brush the given polylines into the mask, then blend them onto the pixels.
    fn paint(&mut self, subpaths: &[Vec<(f32, f32)>]) {
        let radius = (self.style.width * self.pixel_ratio * 0.5).max(0.5);
        for sub in subpaths {
            match sub.as_slice() {
                [] => {}
                [only] => self.mask.dab(only.0, only.1, radius), // a tap leaves a dot
                pts => {
                    for seg in pts.windows(2) {
                        let (a, b) = (seg[0], seg[1]);
                        let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
                        let steps = (len / 0.5).ceil().max(1.0) as usize;
                        for i in 0..=steps {
                            let t = i as f32 / steps as f32;
                            self.mask.dab(a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t, radius);
                        }
                    }
                }
            }
        }
        self.composite(self.style.color);
    }

    /// Blend `color` through the mask's dirty box and reset the mask.
    fn composite(&mut self, color: u32) {
        let Some((x0, y0, x1, y1)) = self.mask.dirty.take() else {
            return;
        };
        for y in y0..=y1 {
            let row = y * self.fb.width;
            for x in x0..=x1 {
                let idx = row + x;
                let a = self.mask.alpha[idx];
                if a > 0.0 {
                    self.fb.pixels[idx] = self.lut.mix(self.fb.pixels[idx], color, a);
                    self.mask.alpha[idx] = 0.0;
                }
            }
        }
        trace!(x0, y0, x1, y1, "composited stroke");
    }
}

fn device_size(width: usize, height: usize, ratio: f32) -> (usize, usize) {
    (
        ((width as f32 * ratio).round() as usize).max(1),
        ((height as f32 * ratio).round() as usize).max(1),
    )
}

impl DrawingSurface for RasterSurface {
    fn size(&self) -> (f32, f32) {
        (self.logical.0 as f32, self.logical.1 as f32)
    }

    fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }

    fn stroke_style(&self) -> StrokeStyle {
        self.style
    }

    fn begin_path(&mut self) {
        self.path.clear();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        self.path.push(vec![p]);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.to_device(x, y);
        match self.path.last_mut() {
            Some(sub) => sub.push(p),
            None => self.path.push(vec![p]), // no current point: acts as move_to
        }
    }

    fn quadratic_curve_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) {
        if self.current_point().is_none() {
            self.move_to(cx, cy);
        }
        let Some(p0) = self.current_point() else { return };
        let c = self.to_device(cx, cy);
        let p1 = self.to_device(x, y);

        // control polygon length bounds the curve length; ~2px per flattened segment
        let hull = ((c.0 - p0.0).hypot(c.1 - p0.1) + (p1.0 - c.0).hypot(p1.1 - c.1)) / 2.0;
        let n = (hull.ceil() as usize).clamp(1, 256);
        if let Some(sub) = self.path.last_mut() {
            for i in 1..=n {
                let t = i as f32 / n as f32;
                let u = 1.0 - t;
                sub.push((
                    u * u * p0.0 + 2.0 * u * t * c.0 + t * t * p1.0,
                    u * u * p0.1 + 2.0 * u * t * c.1 + t * t * p1.1,
                ));
            }
        }
    }

    fn arc(&mut self, cx: f32, cy: f32, radius: f32, start: f32, end: f32) {
        let (dcx, dcy) = self.to_device(cx, cy);
        let r = radius.max(0.0) * self.pixel_ratio;
        let sweep = (end - start).clamp(-TAU, TAU);
        let n = ((sweep.abs() * r / 2.0).ceil() as usize).clamp(8, 1024);

        let pts = (0..=n).map(|i| {
            let a = start + sweep * i as f32 / n as f32;
            (dcx + r * a.cos(), dcy + r * a.sin())
        });
        match self.path.last_mut() {
            Some(sub) => sub.extend(pts), // joined to the current point by a straight line
            None => self.path.push(pts.collect()),
        }
    }

    fn stroke(&mut self) {
        let path = std::mem::take(&mut self.path);
        self.paint(&path);
        self.path = path;
    }

    fn stroke_rect(&mut self, rect: Rect) {
        let (x0, y0) = self.to_device(rect.x, rect.y);
        let (x1, y1) = self.to_device(rect.right(), rect.bottom());
        self.paint(&[vec![(x0, y0), (x1, y0), (x1, y1), (x0, y1), (x0, y0)]]);
    }

    fn clear_rect(&mut self, rect: Rect) {
        let clamp_x = |v: f32| (v.max(0.0) as usize).min(self.fb.width);
        let clamp_y = |v: f32| (v.max(0.0) as usize).min(self.fb.height);
        let x0 = clamp_x((rect.x * self.pixel_ratio).floor());
        let x1 = clamp_x((rect.right() * self.pixel_ratio).ceil());
        let y0 = clamp_y((rect.y * self.pixel_ratio).floor());
        let y1 = clamp_y((rect.bottom() * self.pixel_ratio).ceil());
        for y in y0..y1 {
            let row = y * self.fb.width;
            self.fb.pixels[row + x0..row + x1].fill(self.background);
        }
    }

    fn clear_disc(&mut self, cx: f32, cy: f32, radius: f32) {
        let (dcx, dcy) = self.to_device(cx, cy);
        self.mask.dab(dcx, dcy, radius * self.pixel_ratio);
        self.composite(self.background);
    }

    fn capture_snapshot(&self) -> Snapshot {
        Snapshot::from_pixels(self.fb.width, self.fb.height, self.fb.pixels.clone())
    }

    fn restore_snapshot(&mut self, snapshot: &Snapshot) {
        if snapshot.width() == self.fb.width && snapshot.height() == self.fb.height {
            self.fb.pixels.copy_from_slice(snapshot.pixels());
            return;
        }
        // different backing size: keep the overlapping top-left region
        self.fb.pixels.fill(self.background);
        let w = snapshot.width().min(self.fb.width);
        let h = snapshot.height().min(self.fb.height);
        for y in 0..h {
            let src = &snapshot.pixels()[y * snapshot.width()..y * snapshot.width() + w];
            let dst_row = y * self.fb.width;
            self.fb.pixels[dst_row..dst_row + w].copy_from_slice(src);
        }
    }

    fn resize(&mut self, width: usize, height: usize) {
        if (width, height) == self.logical {
            return;
        }
        let keep = self.capture_snapshot();
        let (dw, dh) = device_size(width, height, self.pixel_ratio);
        self.logical = (width, height);
        self.fb = FrameBuffer::filled(dw, dh, self.background);
        self.mask = CoverageMask::new(dw, dh);
        self.path.clear();
        self.restore_snapshot(&keep);
        trace!(width, height, dw, dh, "surface resized");
    }

    fn blank(&mut self) {
        self.fb.pixels.fill(self.background);
    }
}
