//! Analytic skinning weights.
//!
//! There is no painted weight map; every sheet vertex gets its weights from
//! where it sits relative to the box footprint and the fold lines. A vertex
//! belongs to exactly one region:
//!
//!   footprint  under the box: pinned flat, zero weight everywhere
//!   front      past the front fold line (and not left of the box): the
//!              front chain owns it, the left chain gets explicit zeros
//!   left       past the left face: the left chain owns it
//!   free       everything else: never folds in this pattern
//!
//! so no vertex answers to two unrelated chains, and the weight vector is
//! total over the rig's joints rather than sparse-by-omission. Weights ramp
//! in over a small distance next to each crease instead of stepping 0 to 1,
//! which is what keeps the bend smooth instead of creased razor-sharp.

use cgmath::Point3;
use geometry::FoldRefs;
use smallvec::SmallVec;
use super::{FoldJoints, JointIdx};

#[derive(Debug, Copy, Clone)]
pub struct WeightParams {
    /// Distance over which a weight ramps from 0 to full next to a crease.
    pub crease_ramp: f64,
    /// Half-width of the Y band that rides the corner-tuck joint.
    pub tuck_band: f64,
    /// Fraction of the left flap's span where Left_Middle starts to engage.
    pub middle_split: f64,
}

impl Default for WeightParams {
    fn default() -> WeightParams {
        WeightParams {
            crease_ramp: 0.5,
            tuck_band: 0.5,
            middle_split: 0.5,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Influence {
    pub joint: JointIdx,
    pub weight: f64,
}

/// Weight vector for one vertex: one entry per joint the rig has, explicit
/// zeros included.
pub type VertexWeights = SmallVec<[Influence; 6]>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Region {
    Footprint,
    Front,
    Left,
    Free,
}

/// Computes the weight vector for a vertex as a pure function of its rest
/// position and the fold references. No state, no iteration-order
/// dependency; identical inputs give bit-identical weights.
pub struct WeightEngine<'a> {
    refs: &'a FoldRefs,
    joints: &'a FoldJoints,
    params: WeightParams,
}

#[derive(Default)]
struct RawWeights {
    front_bottom: f64,
    front_top: f64,
    left_side: f64,
    left_middle: f64,
    left_triangle: f64,
    left_top: f64,
}

impl<'a> WeightEngine<'a> {
    pub fn new(refs: &'a FoldRefs, joints: &'a FoldJoints, params: WeightParams) -> WeightEngine<'a> {
        WeightEngine { refs, joints, params }
    }

    pub fn region_of(&self, p: Point3<f64>) -> Region {
        if self.refs.in_footprint(p) {
            Region::Footprint
        } else if p.y < -self.refs.half_depth && p.x >= -self.refs.half_width {
            Region::Front
        } else if p.x < -self.refs.half_width && self.joints.left_side.is_some() {
            // Without a left chain the left area is just free sheet
            Region::Left
        } else {
            Region::Free
        }
    }

    pub fn weights_for(&self, p: Point3<f64>) -> VertexWeights {
        let raw = match self.region_of(p) {
            Region::Footprint | Region::Free => RawWeights::default(),
            Region::Front => self.front_weights(p),
            Region::Left => self.left_weights(p),
        };
        self.collect(raw)
    }

    fn front_weights(&self, p: Point3<f64>) -> RawWeights {
        let refs = self.refs;
        let d = (p.y + refs.half_depth).abs();

        let mut w = RawWeights::default();
        if d <= refs.height {
            // Between the bottom and top fold lines: the bottom joint alone,
            // ramping to full within crease_ramp of the fold
            w.front_bottom = (d / self.params.crease_ramp).min(1.0);
        } else {
            // Past the top fold line the top joint owns the flap outright;
            // the bottom joint's residual influence fades toward the tip so
            // the tip is governed purely by Front_Top
            let past = d - refs.height;
            let max_dist = (refs.paper_corner_y + refs.half_depth).abs() - refs.height;
            w.front_bottom = (1.0 - past / max_dist).max(0.0);
            w.front_top = 1.0;
        }
        w
    }

    fn left_weights(&self, p: Point3<f64>) -> RawWeights {
        let refs = self.refs;
        let params = &self.params;
        let d = (p.x + refs.half_width).abs();
        let base = (d / params.crease_ramp).min(1.0);
        // left_distance near zero must not divide; fall back to ratio 0
        let ratio = if refs.left_distance > 0.01 { d / refs.left_distance } else { 0.0 };

        let mut w = RawWeights::default();
        w.left_side = base;
        if ratio >= params.middle_split {
            // Left_Middle only engages past the split point, ramping in over
            // the outer part of the flap so there is no double full-strength
            // influence near the box edge
            let engage = (ratio - params.middle_split) / (1.0 - params.middle_split);
            w.left_middle = (engage * base).min(1.0);
        }
        // The whole flap participates in the final fold onto the top
        w.left_top = base;

        // The corner tuck grabs only the band of sheet that, once the panel
        // stands up, lands at the triangle joint's height, fading out with
        // distance from the box
        let band_center = -refs.half_depth - refs.height / 2.0;
        let y_dist = (p.y - band_center).abs();
        if y_dist <= params.tuck_band {
            let y_influence = (1.0 - y_dist / params.tuck_band).max(0.0).min(1.0);
            let x_influence = (1.0 - d / refs.height).max(0.0);
            w.left_triangle = y_influence * x_influence;
        }
        w
    }

    /// One influence per joint the rig has, in skeleton insertion order.
    fn collect(&self, w: RawWeights) -> VertexWeights {
        let j = self.joints;
        let mut out = VertexWeights::new();
        out.push(Influence { joint: j.front_bottom, weight: w.front_bottom });
        out.push(Influence { joint: j.front_top, weight: w.front_top });
        if let Some(idx) = j.left_side {
            out.push(Influence { joint: idx, weight: w.left_side });
        }
        if let Some(idx) = j.left_middle {
            out.push(Influence { joint: idx, weight: w.left_middle });
        }
        if let Some(idx) = j.left_triangle {
            out.push(Influence { joint: idx, weight: w.left_triangle });
        }
        if let Some(idx) = j.left_top {
            out.push(Influence { joint: idx, weight: w.left_top });
        }
        out
    }
}

/// Count vertices a fold chain claims but no joint actually moves. Some
/// peripheral vertices are intentionally uninfluenced (the free region), so
/// this is a diagnostic, never an error.
pub fn audit_coverage(
    engine: &WeightEngine,
    verts: &[Point3<f64>],
    weights: &[VertexWeights],
) -> usize {
    let mut uninfluenced = 0;
    for (vi, (p, w)) in verts.iter().zip(weights.iter()).enumerate() {
        match engine.region_of(*p) {
            Region::Front | Region::Left => (),
            _ => continue,
        }
        let total: f64 = w.iter().map(|i| i.weight).sum();
        if total == 0.0 {
            debug!("vertex {} at ({:.3}, {:.3}) sits in a fold region but \
                    has zero total weight", vi, p.x, p.y);
            uninfluenced += 1;
        }
    }
    if uninfluenced > 0 {
        warn!("{} vertices in fold regions have zero total weight and will \
               not deform", uninfluenced);
    }
    uninfluenced
}


#[cfg(test)]
use geometry::{BoxSpec, Sheet, SheetSpec};
#[cfg(test)]
use rig::Variant;
#[cfg(test)]
use skeleton::fold_joints;

#[cfg(test)]
fn example_setup() -> (FoldRefs, ::skeleton::Skeleton, FoldJoints, SheetSpec) {
    let bx = BoxSpec { width: 3.0, depth: 2.0, height: 1.5 };
    let sheet = SheetSpec {
        size: 8.0, offset_x: -1.0, offset_y: -1.0, rotation_deg: 45.0, cuts: 60,
    };
    let refs = FoldRefs::derive(&bx, &sheet, true).unwrap();
    let (skel, joints) = fold_joints::build(Variant::Full, &refs);
    (refs, skel, joints, sheet)
}

#[cfg(test)]
fn weight_of(w: &VertexWeights, joint: JointIdx) -> f64 {
    w.iter().find(|i| i.joint == joint).unwrap().weight
}

#[test]
fn test_box_footprint_invariant() {
    let (refs, _skel, joints, sheet) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let mesh = Sheet::tessellate(&sheet);
    for &p in &mesh.verts {
        if refs.in_footprint(p) {
            for i in engine.weights_for(p) {
                assert_eq!(i.weight, 0.0);
            }
        }
    }
}

#[test]
fn test_front_region_blend() {
    // The worked numeric case: vertex at (0, -3, 0) is past the top fold
    // line (d = 2.0 > H = 1.5), so Front_Top takes it fully and
    // Front_Bottom keeps 1 - 0.5/1.5 = 2/3
    let (refs, _skel, joints, _) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let w = engine.weights_for(Point3::new(0.0, -3.0, 0.0));
    assert_eq!(weight_of(&w, joints.front_top), 1.0);
    let wb = weight_of(&w, joints.front_bottom);
    assert!((wb - 2.0 / 3.0).abs() < 1e-12);
    // Front vertices get explicit zeros for the whole left chain
    assert_eq!(weight_of(&w, joints.left_side.unwrap()), 0.0);
    assert_eq!(weight_of(&w, joints.left_top.unwrap()), 0.0);
}

#[test]
fn test_front_crease_ramp() {
    let (refs, _skel, joints, _) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    // Inside the ramp: d = 0.25 gives half influence, top joint silent
    let w = engine.weights_for(Point3::new(0.5, -1.25, 0.0));
    assert_eq!(weight_of(&w, joints.front_bottom), 0.5);
    assert_eq!(weight_of(&w, joints.front_top), 0.0);
}

#[test]
fn test_left_middle_engages_past_split() {
    let (refs, _skel, joints, _) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let lm = joints.left_middle.unwrap();

    // left_distance = 3.5; below the midpoint Left_Middle is silent
    let w = engine.weights_for(Point3::new(-2.5, 0.0, 0.0));
    assert_eq!(weight_of(&w, lm), 0.0);

    // Above it, strictly increasing in the ratio, reaching the base weight
    // as the ratio goes to 1
    let mut last = 0.0;
    for &d in &[2.0, 2.5, 3.0, 3.4] {
        let w = engine.weights_for(Point3::new(-1.5 - d, 0.0, 0.0));
        let wm = weight_of(&w, lm);
        assert!(wm > last);
        last = wm;
    }
    let w = engine.weights_for(Point3::new(-1.5 - 3.5, 0.0, 0.0));
    let base = weight_of(&w, joints.left_side.unwrap());
    assert!((weight_of(&w, lm) - base).abs() < 1e-12);
}

#[test]
fn test_left_region_owns_left_chain_only() {
    let (refs, _skel, joints, _) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let w = engine.weights_for(Point3::new(-3.0, 0.0, 0.0));
    assert_eq!(weight_of(&w, joints.front_bottom), 0.0);
    assert_eq!(weight_of(&w, joints.front_top), 0.0);
    assert_eq!(weight_of(&w, joints.left_side.unwrap()), 1.0);
    assert_eq!(weight_of(&w, joints.left_top.unwrap()), 1.0);
}

#[test]
fn test_triangle_band() {
    let (refs, _skel, joints, _) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let tri = joints.left_triangle.unwrap();

    // Band center sits at y = -half_depth - H/2 = -1.75
    let w = engine.weights_for(Point3::new(-2.0, -1.75, 0.0));
    let expected = 1.0 - 0.5 / 1.5; // full y influence, x falloff at d = 0.5
    assert!((weight_of(&w, tri) - expected).abs() < 1e-12);

    // Outside the band: nothing
    let w = engine.weights_for(Point3::new(-2.0, -2.5, 0.0));
    assert_eq!(weight_of(&w, tri), 0.0);
    let w = engine.weights_for(Point3::new(-2.0, -1.0, 0.0));
    assert_eq!(weight_of(&w, tri), 0.0);

    // Beyond the x falloff reach: nothing
    let w = engine.weights_for(Point3::new(-1.5 - 1.6, -1.75, 0.0));
    assert_eq!(weight_of(&w, tri), 0.0);
}

#[test]
fn test_weights_deterministic() {
    let (refs, _skel, joints, sheet) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let mesh = Sheet::tessellate(&sheet);
    let a: Vec<VertexWeights> =
        mesh.verts.iter().map(|&p| engine.weights_for(p)).collect();
    let b: Vec<VertexWeights> =
        mesh.verts.iter().map(|&p| engine.weights_for(p)).collect();
    assert_eq!(a, b);
}

#[test]
fn test_default_coverage_is_total() {
    // With default parameters every claimed vertex gets some weight; the
    // audit only fires when the tunables are mistuned
    let (refs, _skel, joints, sheet) = example_setup();
    let engine = WeightEngine::new(&refs, &joints, WeightParams::default());
    let mesh = Sheet::tessellate(&sheet);
    let weights: Vec<VertexWeights> =
        mesh.verts.iter().map(|&p| engine.weights_for(p)).collect();
    assert_eq!(audit_coverage(&engine, &mesh.verts, &weights), 0);
}
