// Hand-pose gesture classification.
//
// A frame goes through the smoother, gets measured against its own hand
// scale (index MCP to middle MCP), and is mapped to a `Gesture` for the
// active `Tool`. Raw results are then debounced: a change only surfaces
// once it has persisted for the configured delay.

use std::time::Duration;

use tracing::{debug, trace};

use crate::clock::{Clock, MonotonicClock};
use crate::config::{GestureConfig, SmoothingConfig};
use crate::smoothing::LandmarkSmoother;
use crate::types::{landmark, Gesture, Landmark, LandmarkFrame, Tool};

/// Geometry read off one smoothed frame. Distances are normalized units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandGeometry {
    pub hand_scale: f32,
    pub index_extended: bool,
    pub middle_extended: bool,
    pub pinch_distance: f32,
}

impl HandGeometry {
    /// Measure `frame`. `None` when a keypoint is missing, non-finite, or the
    /// hand scale collapses to zero.
    pub fn measure(frame: &LandmarkFrame) -> Option<HandGeometry> {
        let pt = |i: usize| frame.get(i).copied().filter(|p| p.is_finite());

        let index_mcp = pt(landmark::INDEX_MCP)?;
        let index_pip = pt(landmark::INDEX_PIP)?;
        let index_tip = pt(landmark::INDEX_TIP)?;
        let middle_mcp = pt(landmark::MIDDLE_MCP)?;
        let middle_pip = pt(landmark::MIDDLE_PIP)?;
        let middle_tip = pt(landmark::MIDDLE_TIP)?;
        let thumb_tip = pt(landmark::THUMB_TIP)?;

        let hand_scale = index_mcp.distance(&middle_mcp);
        if !(hand_scale > f32::EPSILON) {
            return None;
        }

        // y grows downwards: a raised fingertip has a smaller y than its knuckle
        let extended = |mcp: f32, pip: f32, tip: f32| {
            let segment = (mcp - pip).abs() * 2.0;
            mcp - tip > segment * 0.5
        };

        Some(HandGeometry {
            hand_scale,
            index_extended: extended(index_mcp.y, index_pip.y, index_tip.y),
            middle_extended: extended(middle_mcp.y, middle_pip.y, middle_tip.y),
            pinch_distance: thumb_tip.distance(&index_tip),
        })
    }

    pub fn is_pinching(&self, pinch_ratio: f32) -> bool {
        self.pinch_distance < self.hand_scale * pinch_ratio
    }

    /// Rule table; first match wins.
    pub fn decide(&self, tool: Tool, pinch_ratio: f32) -> Gesture {
        let pinch = self.is_pinching(pinch_ratio);
        if pinch && tool == Tool::Erase {
            return Gesture::Erasing;
        }
        if self.index_extended && !self.middle_extended && !pinch {
            return match tool {
                Tool::Draw => Gesture::Drawing,
                Tool::Line => Gesture::Line,
                Tool::Rectangle => Gesture::Rectangle,
                Tool::Circle => Gesture::Circle,
                Tool::Erase | Tool::Select => Gesture::None,
            };
        }
        Gesture::None
    }
}

/* ------------------------------------ Debounce ------------------------------------ */

/// Hysteresis state. At most one pending change exists; a new raw change
/// replaces it with a fresh deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Debounce {
    Stable(Gesture),
    Pending { stable: Gesture, candidate: Gesture, deadline: Duration },
}

impl Default for Debounce {
    fn default() -> Self {
        Debounce::Stable(Gesture::None)
    }
}

impl Debounce {
    pub fn stable(&self) -> Gesture {
        match *self {
            Debounce::Stable(g) => g,
            Debounce::Pending { stable, .. } => stable,
        }
    }

    /// Promote the candidate if its deadline has passed.
    pub fn settle(self, now: Duration) -> Debounce {
        match self {
            Debounce::Pending { candidate, deadline, .. } if now >= deadline => Debounce::Stable(candidate),
            other => other,
        }
    }

    /// React to a raw value that differs from the previous raw value.
    pub fn rearm(self, raw: Gesture, now: Duration, delay: Duration) -> Debounce {
        let stable = self.stable();
        if raw == stable {
            Debounce::Stable(stable)
        } else {
            Debounce::Pending { stable, candidate: raw, deadline: now + delay }
        }
    }
}

/* ----------------------------------- Classifier ----------------------------------- */

pub struct GestureClassifier<C: Clock = MonotonicClock> {
    smoother: LandmarkSmoother,
    pinch_ratio: f32,
    delay: Duration,
    clock: C,
    debounce: Debounce,
    last_raw: Gesture,
}

impl GestureClassifier<MonotonicClock> {
    pub fn new(gesture: &GestureConfig, smoothing: &SmoothingConfig) -> Self {
        Self::with_clock(gesture, smoothing, MonotonicClock::new())
    }
}

impl<C: Clock> GestureClassifier<C> {
    pub fn with_clock(gesture: &GestureConfig, smoothing: &SmoothingConfig, clock: C) -> Self {
        Self {
            smoother: LandmarkSmoother::new(smoothing.clone()),
            pinch_ratio: gesture.pinch_ratio,
            delay: Duration::from_millis(gesture.debounce_ms),
            clock,
            debounce: Debounce::default(),
            last_raw: Gesture::None,
        }
    }

    /// Debounced gesture for this frame. Absent or short frames answer
    /// `Gesture::None` straight away and leave all state untouched.
    pub fn classify(&mut self, frame: Option<&LandmarkFrame>, tool: Tool) -> Gesture {
        let Some(frame) = frame.filter(|f| f.is_complete()) else {
            return Gesture::None;
        };

        let raw = self.classify_raw(frame, tool);
        let now = self.clock.now();
        let before = self.debounce.stable();

        self.debounce = self.debounce.settle(now);
        if raw != self.last_raw {
            trace!(?raw, previous = ?self.last_raw, "raw gesture changed");
            self.debounce = self.debounce.rearm(raw, now, self.delay);
            self.last_raw = raw;
        }
        // a zero delay promotes within the same call
        self.debounce = self.debounce.settle(now);

        let stable = self.debounce.stable();
        if stable != before {
            debug!(from = ?before, to = ?stable, "gesture");
        }
        stable
    }

    /// Undebounced rule output for one frame. Still feeds the smoother.
    pub fn classify_raw(&mut self, frame: &LandmarkFrame, tool: Tool) -> Gesture {
        if !frame.is_complete() {
            return Gesture::None;
        }
        let smoothed = self.smoother.smooth(frame);
        match HandGeometry::measure(&smoothed) {
            Some(geometry) => geometry.decide(tool, self.pinch_ratio),
            None => {
                debug!("unmeasurable hand frame, treating as no gesture");
                Gesture::None
            }
        }
    }

    /// Current stable gesture, promoting a pending change whose time has come.
    pub fn stable(&mut self) -> Gesture {
        self.debounce = self.debounce.settle(self.clock.now());
        self.debounce.stable()
    }

    /// The most recent smoothed frame, if any.
    pub fn smoothed(&self) -> Option<&[Landmark]> {
        self.smoother.state()
    }

    pub fn debounce_state(&self) -> Debounce {
        self.debounce
    }

    pub fn reset(&mut self) {
        self.smoother.reset();
        self.debounce = Debounce::default();
        self.last_raw = Gesture::None;
    }
}
