// Synthetic hands.
// Builds a plausible 21-keypoint frame for a named pose, anchored so the index
// fingertip sits at a chosen normalized position. The demo uses it to steer a
// "hand" with the mouse; tests use it as fixture data.

use crate::types::{landmark, Landmark, LandmarkFrame, LANDMARK_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandPose {
    /// Index out, middle curled, thumb away: the drawing pose
    Point,
    /// Index out with the thumb tip touching it
    Pinch,
    /// Every finger curled
    Fist,
    /// Every finger out, thumb spread
    Open,
}

/// Pose generator. `scale` is the index-MCP to middle-MCP spacing in
/// normalized units (a hand at arm's length is roughly 0.04–0.06).
#[derive(Clone, Copy, Debug)]
pub struct HandPuppet {
    pub scale: f32,
}

impl Default for HandPuppet {
    fn default() -> Self {
        Self { scale: 0.05 }
    }
}

impl HandPuppet {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    /// Frame for `pose` with the index fingertip at `(tip_x, tip_y)`.
    pub fn frame(&self, pose: HandPose, tip_x: f32, tip_y: f32) -> LandmarkFrame {
        let s = self.scale;
        let index_out = matches!(pose, HandPose::Point | HandPose::Pinch | HandPose::Open);
        let others_out = matches!(pose, HandPose::Open);

        // index knuckle placed so the tip lands on the requested point
        let (mcp_x, mcp_y) = if index_out { (tip_x, tip_y + 3.0 * s) } else { (tip_x, tip_y - 0.5 * s) };
        let at = |dx: f32, dy: f32| Landmark::new(mcp_x + dx * s, mcp_y + dy * s, 0.0);

        let mut pts = vec![Landmark::default(); LANDMARK_COUNT];

        pts[landmark::WRIST] = at(0.5, 3.0);

        // thumb chain 1..=4
        pts[1] = at(-0.8, 2.2);
        pts[2] = at(-1.3, 1.6);
        pts[3] = at(-1.6, 1.0);
        pts[landmark::THUMB_TIP] = match pose {
            HandPose::Pinch => Landmark::new(tip_x - 0.1 * s, tip_y + 0.05 * s, 0.0),
            HandPose::Open => at(-2.5, 0.2),
            HandPose::Point | HandPose::Fist => at(-1.6, 0.4),
        };

        // index 5..=8, middle 9..=12, ring 13..=16, pinky 17..=20
        for (finger, column) in [(0usize, 0.0f32), (1, 1.0), (2, 2.0), (3, 2.9)] {
            let extended = if finger == 0 { index_out } else { others_out };
            let base = 5 + finger * 4;
            let knuckle_y = if finger == 3 { 0.3 } else { 0.0 };
            pts[base] = at(column, knuckle_y);
            pts[base + 1] = at(column, knuckle_y - 1.0);
            if extended {
                pts[base + 2] = at(column, knuckle_y - 2.0);
                pts[base + 3] = at(column, knuckle_y - 3.0);
            } else {
                // folded back down towards the palm
                pts[base + 2] = at(column, knuckle_y - 0.7);
                pts[base + 3] = at(column, knuckle_y + 0.5);
            }
        }

        LandmarkFrame::new(pts)
    }
}

/// Same hand scaled by `factor` about its wrist.
pub fn scale_about_wrist(frame: &LandmarkFrame, factor: f32) -> LandmarkFrame {
    let Some(wrist) = frame.get(landmark::WRIST).copied() else {
        return frame.clone();
    };
    frame.map(|p| Landmark {
        x: wrist.x + (p.x - wrist.x) * factor,
        y: wrist.y + (p.y - wrist.y) * factor,
        z: wrist.z + (p.z - wrist.z) * factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_tip_lands_on_anchor() {
        let f = HandPuppet::default().frame(HandPose::Point, 0.4, 0.3);
        let tip = f.get(landmark::INDEX_TIP).unwrap();
        assert!((tip.x - 0.4).abs() < 1e-6 && (tip.y - 0.3).abs() < 1e-6);
        assert!(f.is_complete());
    }

    #[test]
    fn hand_scale_matches_configured_spacing() {
        let p = HandPuppet::new(0.08);
        let f = p.frame(HandPose::Open, 0.5, 0.4);
        let d = f.get(landmark::INDEX_MCP).unwrap().distance(f.get(landmark::MIDDLE_MCP).unwrap());
        assert!((d - 0.08).abs() < 1e-5);
    }

    #[test]
    fn scaling_keeps_wrist_fixed() {
        let f = HandPuppet::default().frame(HandPose::Point, 0.5, 0.4);
        let g = scale_about_wrist(&f, 2.0);
        assert_eq!(f.get(landmark::WRIST), g.get(landmark::WRIST));
        let d1 = f.get(landmark::WRIST).unwrap().distance(f.get(landmark::INDEX_TIP).unwrap());
        let d2 = g.get(landmark::WRIST).unwrap().distance(g.get(landmark::INDEX_TIP).unwrap());
        assert!((d2 - 2.0 * d1).abs() < 1e-5);
    }
}
