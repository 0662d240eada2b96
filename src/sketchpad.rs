// One drawing pipeline: classifier, tessellator and undo history bound to a
// single surface.
//
// Hand frames and pointer events are two interchangeable ways to drive the
// same stroke session. Every entry point takes `&mut self`, so a push
// (including gap filling) is complete before the next render step sees the
// queue. A detached sketchpad (no surface yet, or surface dropped) keeps
// classifying but every drawing operation is a no-op.

use tracing::{debug, info};

use crate::clock::{Clock, MonotonicClock};
use crate::config::Config;
use crate::gesture::GestureClassifier;
use crate::history::{StrokeHistory, UndoOutcome};
use crate::surface::{DrawingSurface, StrokeStyle};
use crate::tessellator::StrokeTessellator;
use crate::types::{landmark, Gesture, InputSource, Landmark, LandmarkFrame, StrokePoint, Tool};

pub struct Sketchpad<S: DrawingSurface, C: Clock = MonotonicClock> {
    surface: Option<S>,
    classifier: GestureClassifier<C>,
    tessellator: StrokeTessellator,
    history: StrokeHistory,
    tool: Tool,
    style: StrokeStyle,
    mirror_x: bool,
    source: Option<InputSource>, // owner of the open session
    hand_gesture: Gesture,       // last stable gesture from the classifier
}

impl<S: DrawingSurface> Sketchpad<S, MonotonicClock> {
    pub fn new(config: &Config, surface: S) -> Self {
        Self::with_clock(config, Some(surface), MonotonicClock::new())
    }
}

impl<S: DrawingSurface, C: Clock> Sketchpad<S, C> {
    pub fn with_clock(config: &Config, surface: Option<S>, clock: C) -> Self {
        let style = StrokeStyle { color: config.stroke.color, width: config.stroke.width };
        let mut pad = Self {
            surface: None,
            classifier: GestureClassifier::with_clock(&config.gesture, &config.smoothing, clock),
            tessellator: StrokeTessellator::new(&config.stroke),
            history: StrokeHistory::new(config.history.max_snapshots),
            tool: config.stroke.tool,
            style,
            mirror_x: config.canvas.mirror_x,
            source: None,
            hand_gesture: Gesture::None,
        };
        if let Some(surface) = surface {
            pad.attach_surface(surface);
        }
        pad
    }

    /* ------------------------------ surface lifecycle ------------------------------ */

    pub fn attach_surface(&mut self, mut surface: S) {
        surface.set_stroke_style(self.style);
        self.surface = Some(surface);
    }

    /// Take the surface away; any open session is dropped unrecorded.
    pub fn detach_surface(&mut self) -> Option<S> {
        self.tessellator.abandon();
        self.source = None;
        self.surface.take()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    /// Resize the surface, keeping its pixels.
    pub fn resize(&mut self, width: usize, height: usize) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
        }
    }

    /* ---------------------------------- hand input ---------------------------------- */

    /// Classify one hand frame (or its absence) and drive the stroke session
    /// from the index fingertip. Returns the stable gesture.
    pub fn on_landmarks(&mut self, frame: Option<&LandmarkFrame>) -> Gesture {
        let gesture = self.classifier.classify(frame, self.tool);
        self.hand_gesture = gesture;

        if self.source == Some(InputSource::Pointer) {
            return gesture; // pointer holds the session until it lifts
        }

        let tip = frame
            .filter(|f| f.is_complete())
            .and_then(|_| self.classifier.smoothed())
            .and_then(|pts| pts.get(landmark::INDEX_TIP).copied());
        let point = tip.and_then(|lm| self.to_surface(&lm));

        let current = self.tessellator.gesture();
        match (current.is_active(), gesture.is_active(), point) {
            (true, true, Some(p)) if gesture == current => self.tessellator.add_point(p),
            (true, true, Some(p)) => {
                self.finish_session();
                self.start_session(gesture, p, InputSource::Hand);
            }
            (true, _, _) => self.finish_session(),
            (false, true, Some(p)) => self.start_session(gesture, p, InputSource::Hand),
            (false, _, _) => {}
        }
        gesture
    }

    /// Normalized landmark to surface pixels. `None` without a surface.
    fn to_surface(&self, lm: &Landmark) -> Option<StrokePoint> {
        let (w, h) = self.surface.as_ref()?.size();
        let x = if self.mirror_x { 1.0 - lm.x } else { lm.x };
        self.clamp_to_surface(StrokePoint::new(x * w, lm.y * h))
    }

    /// Pin `p` inside the surface bounds. `None` without a surface or when
    /// `p` is not finite.
    fn clamp_to_surface(&self, p: StrokePoint) -> Option<StrokePoint> {
        let (w, h) = self.surface.as_ref()?.size();
        if !p.is_finite() {
            debug!("non-finite point dropped");
            return None;
        }
        Some(StrokePoint { x: p.x.clamp(0.0, w), y: p.y.clamp(0.0, h), ..p })
    }

    /* -------------------------------- pointer input -------------------------------- */

    pub fn pointer_down(&mut self, point: StrokePoint) {
        let Some(point) = self.clamp_to_surface(point) else {
            return;
        };
        if self.tessellator.is_active() {
            self.finish_session(); // hand stroke in progress: pointer takes over
        }
        self.start_session(self.tool.pointer_gesture(), point, InputSource::Pointer);
    }

    pub fn pointer_move(&mut self, point: StrokePoint) {
        if self.source != Some(InputSource::Pointer) {
            return;
        }
        if let Some(point) = self.clamp_to_surface(point) {
            self.tessellator.add_point(point);
        }
    }

    pub fn pointer_up(&mut self) {
        if self.source == Some(InputSource::Pointer) {
            self.finish_session();
        }
    }

    /* ------------------------------------ render ------------------------------------ */

    /// Call once per display refresh. Returns whether anything was drawn;
    /// a no-op once no session is open.
    pub fn render_frame(&mut self) -> bool {
        match self.surface.as_mut() {
            Some(surface) if self.tessellator.is_active() => self.tessellator.render_frame(surface),
            _ => false,
        }
    }

    /* ----------------------------------- commands ----------------------------------- */

    pub fn select_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            info!(?tool, "tool selected");
            self.tool = tool;
        }
    }

    pub fn set_stroke_style(&mut self, color: u32, width: f32) {
        self.style = StrokeStyle { color, width: width.max(0.5) };
        if let Some(surface) = self.surface.as_mut() {
            surface.set_stroke_style(self.style);
        }
    }

    /// Wipe the surface and the undo history. An open session is dropped first.
    /// Without a surface only the history is emptied.
    pub fn clear(&mut self) {
        self.tessellator.abandon();
        self.source = None;
        match self.surface.as_mut() {
            Some(surface) => {
                self.history.clear(surface);
                debug!("surface cleared");
            }
            None => self.history.reset(),
        }
    }

    /// Undo the newest completed stroke. A stroke still in progress is
    /// committed first, so it is what gets undone.
    pub fn undo(&mut self) -> UndoOutcome {
        if self.tessellator.is_active() {
            self.finish_session();
        }
        match self.surface.as_mut() {
            Some(surface) => self.history.undo(surface),
            None => UndoOutcome::NothingToUndo,
        }
    }

    /* ----------------------------------- sessions ----------------------------------- */

    fn start_session(&mut self, gesture: Gesture, point: StrokePoint, source: InputSource) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        self.tessellator.begin(gesture, point, surface);
        if self.tessellator.is_active() {
            self.source = Some(source);
        }
    }

    fn finish_session(&mut self) {
        self.source = None;
        let Some(surface) = self.surface.as_mut() else {
            self.tessellator.abandon();
            return;
        };
        if let Some(snapshot) = self.tessellator.end(surface) {
            self.history.push(snapshot);
        }
    }

    /* ----------------------------------- accessors ----------------------------------- */

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        self.style
    }

    /// Gesture of the open session, `None` when idle.
    pub fn active_gesture(&self) -> Gesture {
        self.tessellator.gesture()
    }

    /// Last stable gesture reported by the hand classifier.
    pub fn hand_gesture(&self) -> Gesture {
        self.hand_gesture
    }

    pub fn input_source(&self) -> Option<InputSource> {
        self.source
    }

    pub fn is_drawing(&self) -> bool {
        self.tessellator.is_active()
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn tessellator(&self) -> &StrokeTessellator {
        &self.tessellator
    }
}
