// Core types shared by the smoother, classifier, tessellator and surfaces.

use serde::{Deserialize, Serialize};

/// Raw pixel storage behind a raster surface and the demo window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: usize,      // backing-store width (device pixels)
    pub height: usize,     // backing-store height (device pixels)
    pub pixels: Vec<u32>,  // each entry is 0x00RRGGBB for minifb
}

impl FrameBuffer {
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }
}

/* ---------------------------------- Landmarks ---------------------------------- */

/// Number of keypoints the pose model reports per hand.
pub const LANDMARK_COUNT: usize = 21;

/// Anatomical indices into a [`LandmarkFrame`].
pub mod landmark {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    pub const INDEX_MCP: usize = 5;
    pub const INDEX_PIP: usize = 6;
    pub const INDEX_TIP: usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_TIP: usize = 12;
}

/// One normalized keypoint; x/y in [0,1] of the camera frame, z relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance in (x, y, z).
    #[inline]
    pub fn distance(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// `self * weight + other * (1 - weight)`
    #[inline]
    pub fn blend(&self, other: &Landmark, weight: f32) -> Landmark {
        let inv = 1.0 - weight;
        Landmark {
            x: self.x * weight + other.x * inv,
            y: self.y * weight + other.y * inv,
            z: self.z * weight + other.z * inv,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Ordered keypoints for one hand in one camera frame.
/// Any length is representable; the classifier rejects frames shorter than
/// [`LANDMARK_COUNT`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkFrame {
    points: Vec<Landmark>,
}

impl LandmarkFrame {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// True when the frame carries every keypoint the classifier reads.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    pub fn get(&self, index: usize) -> Option<&Landmark> {
        self.points.get(index)
    }

    pub fn points(&self) -> &[Landmark] {
        &self.points
    }

    /// Apply `f` to every keypoint (used to mirror/scale whole hands).
    pub fn map(&self, f: impl Fn(&Landmark) -> Landmark) -> LandmarkFrame {
        LandmarkFrame { points: self.points.iter().map(f).collect() }
    }
}

impl From<Vec<Landmark>> for LandmarkFrame {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

/* ------------------------------- Tools & gestures ------------------------------- */

/// Externally selected drawing tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Draw,
    Erase,
    Line,
    Rectangle,
    Circle,
    Select,
}

impl Tool {
    pub const ALL: [Tool; 6] =
        [Tool::Draw, Tool::Erase, Tool::Line, Tool::Rectangle, Tool::Circle, Tool::Select];

    /// The gesture a pressed pointer produces with this tool selected.
    pub fn pointer_gesture(self) -> Gesture {
        match self {
            Tool::Draw => Gesture::Drawing,
            Tool::Erase => Gesture::Erasing,
            Tool::Line => Gesture::Line,
            Tool::Rectangle => Gesture::Rectangle,
            Tool::Circle => Gesture::Circle,
            Tool::Select => Gesture::Selecting,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tool::Draw => "DRAW",
            Tool::Erase => "ERASE",
            Tool::Line => "LINE",
            Tool::Rectangle => "RECT",
            Tool::Circle => "CIRCLE",
            Tool::Select => "SELECT",
        }
    }
}

/// Classified intent for the current frame. `None` = no active input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    Drawing,
    Erasing,
    Line,
    Rectangle,
    Circle,
    Selecting,
}

impl Gesture {
    pub fn is_active(self) -> bool {
        self != Gesture::None
    }

    /// Shape gestures preview from a base snapshot instead of stroking incrementally.
    pub fn is_shape(self) -> bool {
        matches!(self, Gesture::Line | Gesture::Rectangle | Gesture::Circle)
    }

    /// Whether ending this gesture leaves a mark worth an undo step.
    pub fn marks_surface(self) -> bool {
        match self {
            Gesture::Drawing | Gesture::Erasing | Gesture::Line | Gesture::Rectangle | Gesture::Circle => true,
            Gesture::None | Gesture::Selecting => false,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gesture::None => "IDLE",
            Gesture::Drawing => "DRAWING",
            Gesture::Erasing => "ERASING",
            Gesture::Line => "LINE",
            Gesture::Rectangle => "RECT",
            Gesture::Circle => "CIRCLE",
            Gesture::Selecting => "SELECT",
        }
    }
}

/* -------------------------------- Stroke points -------------------------------- */

/// A pointer position in surface pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StrokePoint {
    pub x: f32,
    pub y: f32,
    pub pressure: Option<f32>,
}

impl StrokePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y, pressure: None }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[inline]
    pub fn distance(&self, other: &StrokePoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    #[inline]
    pub fn midpoint(&self, other: &StrokePoint) -> StrokePoint {
        StrokePoint::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }

    /// Point at fraction `t` of the way to `other`; pressure interpolates when both carry one.
    #[inline]
    pub fn lerp(&self, other: &StrokePoint, t: f32) -> StrokePoint {
        let pressure = match (self.pressure, other.pressure) {
            (Some(a), Some(b)) => Some(a + (b - a) * t),
            _ => None,
        };
        StrokePoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
            pressure,
        }
    }
}

/// Which input currently owns the stroke session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Hand,
    Pointer,
}
