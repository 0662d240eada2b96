// Velocity-adaptive landmark smoothing.
// Each keypoint is blended with its previous smoothed position. The blend
// weight on the past shrinks as the point moves faster, so a still hand is
// heavily damped while a deliberate stroke follows with little lag.

use crate::config::SmoothingConfig;
use crate::types::{Landmark, LandmarkFrame};

pub struct LandmarkSmoother {
    config: SmoothingConfig,
    state: Option<Vec<Landmark>>, // last smoothed frame; None before the first call
}

impl LandmarkSmoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self { config, state: None }
    }

    /// Weight on the previous position for a point that moved `velocity` this frame.
    #[inline]
    pub fn weight_for(&self, velocity: f32) -> f32 {
        let c = &self.config;
        (c.base_weight - velocity * c.velocity_gain).max(c.min_weight)
    }

    /// Blend `frame` against the stored state and remember the result.
    /// A first frame, or one whose length differs from the state, passes through unchanged.
    pub fn smooth(&mut self, frame: &LandmarkFrame) -> LandmarkFrame {
        let out: Vec<Landmark> = match &self.state {
            Some(prev) if prev.len() == frame.len() => frame
                .points()
                .iter()
                .zip(prev.iter())
                .map(|(cur, prev)| {
                    let w = self.weight_for(cur.distance(prev));
                    prev.blend(cur, w)
                })
                .collect(),
            _ => frame.points().to_vec(),
        };

        // compound: the next frame blends against what we output, not the raw input
        self.state = Some(out.clone());
        LandmarkFrame::new(out)
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn state(&self) -> Option<&[Landmark]> {
        self.state.as_deref()
    }
}

impl Default for LandmarkSmoother {
    fn default() -> Self {
        Self::new(SmoothingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LANDMARK_COUNT;
    use proptest::prelude::*;

    fn frame_at(x: f32, y: f32) -> LandmarkFrame {
        LandmarkFrame::new(vec![Landmark::new(x, y, 0.0); LANDMARK_COUNT])
    }

    #[test]
    fn first_frame_passes_through() {
        let mut s = LandmarkSmoother::default();
        let f = frame_at(0.3, 0.7);
        assert_eq!(s.smooth(&f), f);
        assert_eq!(s.state().map(|p| p.len()), Some(LANDMARK_COUNT));
    }

    #[test]
    fn length_change_resets_to_input() {
        let mut s = LandmarkSmoother::default();
        s.smooth(&frame_at(0.1, 0.1));
        let short = LandmarkFrame::new(vec![Landmark::new(0.9, 0.9, 0.0); 5]);
        assert_eq!(s.smooth(&short), short);
        assert_eq!(s.state().map(|p| p.len()), Some(5));
    }

    #[test]
    fn slow_motion_is_damped_more_than_fast_motion() {
        let cfg = SmoothingConfig::default();

        // small step: weight stays near base_weight
        let mut slow = LandmarkSmoother::new(cfg.clone());
        slow.smooth(&frame_at(0.5, 0.5));
        let out = slow.smooth(&frame_at(0.51, 0.5));
        let slow_gain = (out.points()[0].x - 0.5) / 0.01;

        // large step: weight hits the floor
        let mut fast = LandmarkSmoother::new(cfg.clone());
        fast.smooth(&frame_at(0.1, 0.5));
        let out = fast.smooth(&frame_at(0.9, 0.5));
        let fast_gain = (out.points()[0].x - 0.1) / 0.8;

        assert!(fast_gain > slow_gain);
        assert!((fast_gain - (1.0 - cfg.min_weight)).abs() < 1e-4);
    }

    #[test]
    fn state_holds_smoothed_output_not_raw_input() {
        let mut s = LandmarkSmoother::default();
        s.smooth(&frame_at(0.0, 0.0));
        let out = s.smooth(&frame_at(0.2, 0.0));
        assert_eq!(s.state().unwrap()[0], out.points()[0]);
        assert!(out.points()[0].x < 0.2);
    }

    #[test]
    fn reset_forgets_history() {
        let mut s = LandmarkSmoother::default();
        s.smooth(&frame_at(0.0, 0.0));
        s.reset();
        let f = frame_at(0.8, 0.8);
        assert_eq!(s.smooth(&f), f);
    }

    fn arb_frame() -> impl Strategy<Value = LandmarkFrame> {
        prop::collection::vec((0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0), LANDMARK_COUNT)
            .prop_map(|pts| LandmarkFrame::new(pts.into_iter().map(|(x, y, z)| Landmark::new(x, y, z)).collect()))
    }

    proptest! {
        #[test]
        fn smoothing_is_deterministic(a in arb_frame(), b in arb_frame()) {
            let mut s1 = LandmarkSmoother::default();
            let mut s2 = LandmarkSmoother::default();
            s1.smooth(&a);
            s2.smooth(&a);
            prop_assert_eq!(s1.smooth(&b), s2.smooth(&b));
        }

        #[test]
        fn smoothing_never_overshoots(a in arb_frame(), b in arb_frame()) {
            let mut s = LandmarkSmoother::default();
            s.smooth(&a);
            let out = s.smooth(&b);
            for i in 0..LANDMARK_COUNT {
                let raw = a.points()[i].distance(&b.points()[i]);
                let moved = a.points()[i].distance(&out.points()[i]);
                prop_assert!(moved <= raw + 1e-5);
            }
        }
    }
}
