// Pointer stream to continuous strokes.
//
// `PointQueue` buffers positions between render steps and fills in large
// jumps so fast motion never leaves gaps. `StrokeTessellator` owns the one
// active stroke session and, once per display refresh, turns whatever is
// queued into a single smoothed path on the surface.

use std::f32::consts::TAU;

use tracing::{debug, trace};

use crate::config::StrokeConfig;
use crate::surface::{DrawingSurface, Rect, Snapshot};
use crate::types::{Gesture, StrokePoint};

/* ----------------------------------- Point queue ----------------------------------- */

/// Upper bound on fill points for one jump. Only reached by jumps far outside
/// any real surface; spacing there widens past `step`.
const MAX_FILL: usize = 1 << 14;

pub struct PointQueue {
    points: Vec<StrokePoint>,
    gap_threshold: f32,
    step: f32,
    min_distance: f32,
}

impl PointQueue {
    pub fn new(config: &StrokeConfig) -> Self {
        Self {
            points: Vec::new(),
            gap_threshold: config.gap_threshold,
            step: config.step,
            min_distance: config.min_distance,
        }
    }

    /// Restart the queue at `first`.
    pub fn start(&mut self, first: StrokePoint) {
        self.points.clear();
        self.points.push(first);
    }

    /// Queue `p` behind the last accepted point. Near-duplicates are dropped;
    /// a jump wider than the gap threshold is filled with evenly spaced points
    /// no further than `step` apart. Non-finite points are dropped. Returns
    /// how many points were queued.
    pub fn push(&mut self, p: StrokePoint) -> usize {
        if !p.is_finite() {
            return 0;
        }
        let Some(last) = self.points.last().copied() else {
            self.points.push(p);
            return 1;
        };

        let d = last.distance(&p);
        if d < self.min_distance {
            return 0;
        }

        let mut added = 0;
        if d > self.gap_threshold {
            let segments = ((d / self.step).ceil() as usize).min(MAX_FILL);
            self.points.reserve(segments);
            for i in 1..segments {
                self.points.push(last.lerp(&p, i as f32 / segments as f32));
                added += 1;
            }
        }
        self.points.push(p);
        added + 1
    }

    /// Keep only the newest point; it starts the next segment.
    pub fn collapse_to_last(&mut self) {
        if let Some(last) = self.points.last().copied() {
            self.points.clear();
            self.points.push(last);
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[StrokePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/* ---------------------------------- Tessellator ---------------------------------- */

struct Session {
    gesture: Gesture,
    start: StrokePoint,
    current: StrokePoint,
    base: Option<Snapshot>, // shape tools repaint their preview over this
}

pub struct StrokeTessellator {
    queue: PointQueue,
    session: Option<Session>,
    eraser_radius: f32,
    last_path: Vec<StrokePoint>,
}

impl StrokeTessellator {
    pub fn new(config: &StrokeConfig) -> Self {
        Self {
            queue: PointQueue::new(config),
            session: None,
            eraser_radius: config.eraser_radius,
            last_path: Vec::new(),
        }
    }

    /// True while a session is open (the render loop should keep running).
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn gesture(&self) -> Gesture {
        self.session.as_ref().map_or(Gesture::None, |s| s.gesture)
    }

    pub fn queue(&self) -> &PointQueue {
        &self.queue
    }

    /// Points consumed by the most recent freehand render step.
    pub fn last_path(&self) -> &[StrokePoint] {
        &self.last_path
    }

    /// Open a session for `gesture` at `point`. Ignored for `Gesture::None`,
    /// a non-finite point, or when a session is already open.
    pub fn begin<S: DrawingSurface + ?Sized>(&mut self, gesture: Gesture, point: StrokePoint, surface: &mut S) {
        if !gesture.is_active() || !point.is_finite() || self.session.is_some() {
            return;
        }
        let base = gesture.is_shape().then(|| surface.capture_snapshot());
        self.queue.start(point);
        self.last_path.clear();
        self.session = Some(Session { gesture, start: point, current: point, base });
        debug!(?gesture, x = point.x, y = point.y, "stroke started");
    }

    /// Feed a new position into the open session.
    pub fn add_point(&mut self, point: StrokePoint) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if self.queue.push(point) > 0 {
            session.current = point;
        }
    }

    /// One display-refresh step. Returns whether anything was drawn.
    pub fn render_frame<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S) -> bool {
        let Some(session) = self.session.as_ref() else {
            return false; // loop stopped
        };

        match session.gesture {
            Gesture::Drawing => {
                let pts = self.queue.points();
                if pts.len() < 2 {
                    return false;
                }
                stroke_midpoint_path(surface, pts);
                trace!(points = pts.len(), "stroked segment");
                self.last_path.clear();
                self.last_path.extend_from_slice(pts);
                self.queue.collapse_to_last();
                true
            }
            Gesture::Erasing => {
                for p in self.queue.points() {
                    surface.clear_disc(p.x, p.y, self.eraser_radius);
                }
                self.queue.collapse_to_last();
                true
            }
            Gesture::Line | Gesture::Rectangle | Gesture::Circle => {
                if let Some(base) = &session.base {
                    surface.restore_snapshot(base);
                }
                draw_shape(surface, session.gesture, session.start, session.current);
                self.queue.collapse_to_last();
                true
            }
            Gesture::Selecting => {
                self.queue.collapse_to_last();
                false
            }
            Gesture::None => false,
        }
    }

    /// Close the session: flush what is queued and, if the gesture marked the
    /// surface, hand back the snapshot to record for undo.
    pub fn end<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S) -> Option<Snapshot> {
        let gesture = self.session.as_ref()?.gesture;
        let tap = gesture == Gesture::Drawing && self.last_path.is_empty() && self.queue.len() == 1;
        if tap {
            // never moved: leave a dot
            if let Some(p) = self.queue.points().first().copied() {
                surface.begin_path();
                surface.move_to(p.x, p.y);
                surface.line_to(p.x, p.y);
                surface.stroke();
            }
        } else {
            self.render_frame(surface);
        }
        let session = self.session.take()?;
        self.queue.clear();
        debug!(gesture = ?session.gesture, "stroke ended");
        session.gesture.marks_surface().then(|| surface.capture_snapshot())
    }

    /// Drop the session without touching the surface.
    pub fn abandon(&mut self) {
        self.session = None;
        self.queue.clear();
    }
}

/// Path through `pts` using each interior point as the control of a quadratic
/// that ends at the midpoint to its successor.
fn stroke_midpoint_path<S: DrawingSurface + ?Sized>(surface: &mut S, pts: &[StrokePoint]) {
    let (first, rest) = match pts.split_first() {
        Some(split) => split,
        None => return,
    };
    surface.begin_path();
    surface.move_to(first.x, first.y);
    if let Some((last, interior)) = rest.split_last() {
        for (i, p) in interior.iter().enumerate() {
            let next = if i + 1 < interior.len() { &interior[i + 1] } else { last };
            let mid = p.midpoint(next);
            surface.quadratic_curve_to(p.x, p.y, mid.x, mid.y);
        }
        surface.line_to(last.x, last.y);
    }
    surface.stroke();
}

fn draw_shape<S: DrawingSurface + ?Sized>(surface: &mut S, gesture: Gesture, start: StrokePoint, end: StrokePoint) {
    match gesture {
        Gesture::Line => {
            surface.begin_path();
            surface.move_to(start.x, start.y);
            surface.line_to(end.x, end.y);
            surface.stroke();
        }
        Gesture::Rectangle => {
            surface.stroke_rect(Rect::from_corners((start.x, start.y), (end.x, end.y)));
        }
        Gesture::Circle => {
            surface.begin_path();
            surface.arc(start.x, start.y, start.distance(&end), 0.0, TAU);
            surface.stroke();
        }
        Gesture::None | Gesture::Drawing | Gesture::Erasing | Gesture::Selecting => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{DrawCommand, RecordingSurface};
    use proptest::prelude::*;

    fn queue() -> PointQueue {
        PointQueue::new(&StrokeConfig::default())
    }

    fn tess() -> StrokeTessellator {
        StrokeTessellator::new(&StrokeConfig::default())
    }

    #[test]
    fn large_jump_is_subdivided() {
        let mut q = queue();
        q.start(StrokePoint::new(10.0, 10.0));
        let added = q.push(StrokePoint::new(10.0, 200.0));
        // 190px at 5px spacing: 37 fillers plus the real point
        assert_eq!(added, 38);
        assert!(q.points().windows(2).all(|w| w[0].distance(&w[1]) <= 5.0 + 1e-4));
        assert_eq!(q.points().last(), Some(&StrokePoint::new(10.0, 200.0)));
    }

    #[test]
    fn short_moves_are_not_subdivided() {
        let mut q = queue();
        q.start(StrokePoint::new(0.0, 0.0));
        assert_eq!(q.push(StrokePoint::new(12.0, 0.0)), 1);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn jitter_below_min_distance_is_dropped() {
        let mut q = queue();
        q.start(StrokePoint::new(5.0, 5.0));
        assert_eq!(q.push(StrokePoint::new(5.4, 5.3)), 0);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn non_finite_points_are_dropped() {
        let mut q = queue();
        q.start(StrokePoint::new(5.0, 5.0));
        assert_eq!(q.push(StrokePoint::new(f32::INFINITY, 5.0)), 0);
        assert_eq!(q.push(StrokePoint::new(5.0, f32::NAN)), 0);
        assert_eq!(q.len(), 1);

        let mut t = tess();
        let mut s = RecordingSurface::new(10, 10);
        t.begin(Gesture::Drawing, StrokePoint::new(f32::NEG_INFINITY, 0.0), &mut s);
        assert!(!t.is_active());
    }

    #[test]
    fn absurd_jump_fill_is_bounded() {
        let mut q = queue();
        q.start(StrokePoint::new(0.0, 0.0));
        let added = q.push(StrokePoint::new(3.0e32, 0.0));
        assert_eq!(added, MAX_FILL);
        assert_eq!(q.points().last(), Some(&StrokePoint::new(3.0e32, 0.0)));
    }

    #[test]
    fn render_needs_two_points_then_collapses() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Drawing, StrokePoint::new(10.0, 10.0), &mut s);
        assert!(!t.render_frame(&mut s));
        assert_eq!(s.count(|c| *c == DrawCommand::Stroke), 0);

        t.add_point(StrokePoint::new(14.0, 10.0));
        t.add_point(StrokePoint::new(18.0, 12.0));
        t.add_point(StrokePoint::new(22.0, 15.0));
        assert!(t.render_frame(&mut s));
        assert_eq!(s.count(|c| *c == DrawCommand::Stroke), 1);
        assert_eq!(t.queue().points(), &[StrokePoint::new(22.0, 15.0)]);
        assert_eq!(t.last_path().len(), 4);
    }

    #[test]
    fn path_runs_through_midpoints() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Drawing, StrokePoint::new(0.0, 0.0), &mut s);
        t.add_point(StrokePoint::new(10.0, 0.0));
        t.add_point(StrokePoint::new(10.0, 10.0));
        t.add_point(StrokePoint::new(0.0, 10.0));
        t.render_frame(&mut s);

        let expected = vec![
            DrawCommand::BeginPath,
            DrawCommand::MoveTo(0.0, 0.0),
            DrawCommand::QuadraticCurveTo { cx: 10.0, cy: 0.0, x: 10.0, y: 5.0 },
            DrawCommand::QuadraticCurveTo { cx: 10.0, cy: 10.0, x: 5.0, y: 10.0 },
            DrawCommand::LineTo(0.0, 10.0),
            DrawCommand::Stroke,
        ];
        assert_eq!(s.commands, expected);
    }

    #[test]
    fn consecutive_frames_share_an_endpoint() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Drawing, StrokePoint::new(0.0, 0.0), &mut s);
        t.add_point(StrokePoint::new(8.0, 0.0));
        t.render_frame(&mut s);
        t.add_point(StrokePoint::new(16.0, 0.0));
        t.render_frame(&mut s);
        let moves: Vec<_> = s.commands.iter().filter(|c| matches!(c, DrawCommand::MoveTo(..))).collect();
        assert_eq!(moves, vec![&DrawCommand::MoveTo(0.0, 0.0), &DrawCommand::MoveTo(8.0, 0.0)]);
    }

    #[test]
    fn end_flushes_and_returns_snapshot() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Drawing, StrokePoint::new(0.0, 0.0), &mut s);
        t.add_point(StrokePoint::new(9.0, 9.0));
        let snap = t.end(&mut s);
        assert!(snap.is_some());
        assert_eq!(s.count(|c| *c == DrawCommand::Stroke), 1);
        assert!(!t.is_active());
        assert!(t.queue().is_empty());
        // loop is stopped
        assert!(!t.render_frame(&mut s));
        assert!(t.end(&mut s).is_none());
    }

    #[test]
    fn tap_leaves_a_dot() {
        let mut t = tess();
        let mut s = RecordingSurface::new(100, 100);
        t.begin(Gesture::Drawing, StrokePoint::new(30.0, 40.0), &mut s);
        t.add_point(StrokePoint::new(30.2, 40.1)); // jitter, dropped
        assert!(t.end(&mut s).is_some());
        assert_eq!(s.path_vertices(), vec![(30.0, 40.0), (30.0, 40.0)]);
        assert_eq!(s.count(|c| *c == DrawCommand::Stroke), 1);
    }

    #[test]
    fn only_one_session_at_a_time() {
        let mut t = tess();
        let mut s = RecordingSurface::new(100, 100);
        t.begin(Gesture::Drawing, StrokePoint::new(1.0, 1.0), &mut s);
        t.begin(Gesture::Circle, StrokePoint::new(50.0, 50.0), &mut s);
        assert_eq!(t.gesture(), Gesture::Drawing);
        t.begin(Gesture::None, StrokePoint::new(0.0, 0.0), &mut s);
        assert!(t.is_active());
    }

    #[test]
    fn shape_preview_repaints_over_base() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Circle, StrokePoint::new(50.0, 50.0), &mut s);
        t.add_point(StrokePoint::new(80.0, 90.0));
        t.render_frame(&mut s);
        t.add_point(StrokePoint::new(60.0, 50.0));
        t.render_frame(&mut s);

        let restores = s.count(|c| matches!(c, DrawCommand::Restore(0)));
        assert_eq!(restores, 2);
        let radii: Vec<f32> = s
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Arc { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![50.0, 10.0]);
    }

    #[test]
    fn rectangle_preview_is_bounding_box() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Rectangle, StrokePoint::new(40.0, 10.0), &mut s);
        t.add_point(StrokePoint::new(10.0, 30.0));
        t.end(&mut s);
        assert!(s.commands.contains(&DrawCommand::StrokeRect(Rect { x: 10.0, y: 10.0, width: 30.0, height: 20.0 })));
    }

    #[test]
    fn eraser_clears_each_frame_and_snapshots_once() {
        let mut t = tess();
        let mut s = RecordingSurface::new(200, 200);
        t.begin(Gesture::Erasing, StrokePoint::new(20.0, 20.0), &mut s);
        t.render_frame(&mut s);
        t.add_point(StrokePoint::new(30.0, 20.0));
        t.render_frame(&mut s);
        let snap = t.end(&mut s);
        assert!(snap.is_some());
        assert!(s.count(|c| matches!(c, DrawCommand::ClearDisc { radius, .. } if *radius == 20.0)) >= 3);
    }

    #[test]
    fn selecting_leaves_no_mark() {
        let mut t = tess();
        let mut s = RecordingSurface::new(100, 100);
        t.begin(Gesture::Selecting, StrokePoint::new(5.0, 5.0), &mut s);
        t.add_point(StrokePoint::new(50.0, 50.0));
        assert!(!t.render_frame(&mut s));
        assert!(t.end(&mut s).is_none());
        assert_eq!(s.generation(), 0);
    }

    proptest! {
        #[test]
        fn queued_points_never_exceed_step_after_a_gap(
            x0 in 0.0f32..500.0, y0 in 0.0f32..500.0,
            x1 in 0.0f32..500.0, y1 in 0.0f32..500.0,
        ) {
            let cfg = StrokeConfig::default();
            let mut q = PointQueue::new(&cfg);
            let a = StrokePoint::new(x0, y0);
            let b = StrokePoint::new(x1, y1);
            q.start(a);
            q.push(b);
            if a.distance(&b) > cfg.gap_threshold {
                for w in q.points().windows(2) {
                    prop_assert!(w[0].distance(&w[1]) <= cfg.step + 1e-3);
                }
            }
        }
    }
}
