//! One-shot rig assembly.
//!
//! `Rig::build` runs the whole pipeline (references, sheet, joints, weights,
//! timeline) and returns the complete, immutable rig description the
//! deformation consumer works from. Nothing here mutates after build.

use anim::Timeline;
use cgmath::{EuclideanSpace, Matrix4, Point3, Transform, vec3};
use errors::*;
use geometry::{BoxSpec, FoldRefs, Sheet, SheetSpec};
use skeleton::fold_joints;
use skeleton::weights::{self, VertexWeights, WeightEngine, WeightParams};
use skeleton::{FoldJoints, Skeleton};

/// Which generation of the rig to build. `Full` is the general case; the
/// others leave the later left-chain joints (and their timeline stages) out.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Variant {
    /// Front fold only: 2 joints, 120 frames.
    Front,
    /// Front fold plus the raised side panel: 4 joints, 150 frames.
    Side,
    /// The whole wrap, corner tuck included: 6 joints, 190 frames.
    Full,
}

impl Variant {
    pub fn has_left_chain(&self) -> bool {
        match *self {
            Variant::Front => false,
            Variant::Side | Variant::Full => true,
        }
    }

    pub fn has_left_tuck(&self) -> bool {
        *self == Variant::Full
    }

    pub fn from_name(name: &str) -> Option<Variant> {
        match name {
            "front" => Some(Variant::Front),
            "side" => Some(Variant::Side),
            "full" => Some(Variant::Full),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match *self {
            Variant::Front => "front",
            Variant::Side => "side",
            Variant::Full => "full",
        }
    }
}

pub struct RigConfig {
    pub box_spec: BoxSpec,
    pub sheet_spec: SheetSpec,
    pub variant: Variant,
    pub weight_params: WeightParams,
}

impl Default for RigConfig {
    /// The reference scene: a 3 x 2 x 1.5 box on an 8-unit sheet, shifted a
    /// little toward the near left corner.
    fn default() -> RigConfig {
        RigConfig {
            box_spec: BoxSpec { width: 3.0, depth: 2.0, height: 1.5 },
            sheet_spec: SheetSpec {
                size: 8.0,
                offset_x: -1.0,
                offset_y: -1.0,
                rotation_deg: 45.0,
                cuts: 60,
            },
            variant: Variant::Full,
            weight_params: WeightParams::default(),
        }
    }
}

/// The complete rig description handed to the deformation consumer.
pub struct Rig {
    pub box_spec: BoxSpec,
    pub refs: FoldRefs,
    pub sheet: Sheet,
    pub skeleton: Skeleton,
    pub joints: FoldJoints,
    /// One weight vector per sheet vertex, same order as `sheet.verts`.
    pub weights: Vec<VertexWeights>,
    pub timeline: Timeline,
    pub variant: Variant,
}

impl Rig {
    pub fn build(config: &RigConfig) -> Result<Rig> {
        let refs = FoldRefs::derive(
            &config.box_spec,
            &config.sheet_spec,
            config.variant.has_left_chain(),
        )?;
        let sheet = Sheet::tessellate(&config.sheet_spec);
        let (skeleton, joints) = fold_joints::build(config.variant, &refs);

        let weights = {
            let engine = WeightEngine::new(&refs, &joints, config.weight_params);
            let ws: Vec<VertexWeights> =
                sheet.verts.iter().map(|&p| engine.weights_for(p)).collect();
            weights::audit_coverage(&engine, &sheet.verts, &ws);
            ws
        };

        let timeline = Timeline::build(config.variant, &skeleton)?;

        info!(
            "built {} rig: {} joints, {} sheet vertices, {} frames",
            config.variant.name(),
            skeleton.num_joints(),
            sheet.num_verts(),
            timeline.num_frames,
        );

        Ok(Rig {
            box_spec: config.box_spec,
            refs,
            sheet,
            skeleton,
            joints,
            weights,
            timeline,
            variant: config.variant,
        })
    }

    /// Deform matrix per joint at a frame.
    pub fn deform_matrices(&self, frame: u16) -> Vec<Matrix4<f64>> {
        let rots = self.timeline.local_rotations(self.skeleton.num_joints(), frame);
        self.skeleton.deform_matrices(&rots)
    }

    /// Posed position of one sheet vertex under precomputed deform matrices.
    pub fn deformed_vertex(&self, deforms: &[Matrix4<f64>], vi: usize) -> Point3<f64> {
        skin(deforms, &self.weights[vi], self.sheet.verts[vi])
    }
}

/// The skinning equation: blend of the deform matrices applied to the rest
/// position, weights normalized over their sum. A vertex whose weights sum
/// to zero does not move.
pub fn skin(
    deforms: &[Matrix4<f64>],
    weights: &VertexWeights,
    v: Point3<f64>,
) -> Point3<f64> {
    let total: f64 = weights.iter().map(|i| i.weight).sum();
    if total <= 0.0 {
        return v;
    }
    let mut acc = vec3(0.0, 0.0, 0.0);
    for influence in weights.iter() {
        if influence.weight == 0.0 {
            continue;
        }
        let posed = deforms[influence.joint.index()].transform_point(v);
        acc += posed.to_vec() * (influence.weight / total);
    }
    Point3::from_vec(acc)
}


#[cfg(test)]
use cgmath::{ApproxEq, vec4};
#[cfg(test)]
use skeleton::weights::Influence;

#[test]
fn test_build_default_rig() {
    let rig = Rig::build(&RigConfig::default()).unwrap();
    assert_eq!(rig.skeleton.num_joints(), 6);
    assert_eq!(rig.weights.len(), rig.sheet.num_verts());
    // Total mapping: a weight entry for every joint on every vertex
    for w in &rig.weights {
        assert_eq!(w.len(), 6);
    }
    assert_eq!(rig.timeline.num_frames, 190);
}

#[test]
fn test_invalid_config_fails_fast() {
    let mut config = RigConfig::default();
    config.box_spec.height = -1.0;
    assert!(Rig::build(&config).is_err());
}

#[test]
fn test_rest_frame_leaves_sheet_flat() {
    let rig = Rig::build(&RigConfig::default()).unwrap();
    let deforms = rig.deform_matrices(1);
    for (vi, &v) in rig.sheet.verts.iter().enumerate() {
        let posed = rig.deformed_vertex(&deforms, vi);
        assert!(posed.relative_eq(&v, 1e-9, 1e-9), "vertex {} moved at rest", vi);
    }
}

#[test]
fn test_front_fold_composition_cancels_at_90() {
    // Front_Bottom is at -90 and Front_Top at +90 relative to it; the
    // composed direction of Front_Top must come out horizontal, lying over
    // the box top toward the back
    let rig = Rig::build(&RigConfig::default()).unwrap();
    let rots = rig.timeline.local_rotations(rig.skeleton.num_joints(), 90);
    let world = rig.skeleton.pose_local_to_world(&rots);
    let dir = (world[rig.joints.front_top.index()] * vec4(0.0, 1.0, 0.0, 0.0)).truncate();
    assert!(dir.z.abs() < 1e-9);
    assert!(dir.y > 0.99);
}

#[test]
fn test_front_crease_meets_top_edge_at_90() {
    // A point on the sheet at exactly box-height past the front fold line
    // rides Front_Bottom fully, and must land on the box's front top edge
    let rig = Rig::build(&RigConfig::default()).unwrap();
    let deforms = rig.deform_matrices(90);
    let fb = rig.joints.front_bottom.index();
    let posed = deforms[fb].transform_point(Point3::new(0.0, -2.5, 0.0));
    assert!(posed.relative_eq(&Point3::new(0.0, -1.0, 1.5), 1e-9, 1e-9));
}

#[test]
fn test_front_tip_lies_in_top_plane_at_90() {
    // The sheet tip is governed purely by Front_Top and ends up flat in the
    // box-top plane
    let rig = Rig::build(&RigConfig::default()).unwrap();
    let deforms = rig.deform_matrices(90);
    let ft = rig.joints.front_top.index();
    let posed = deforms[ft].transform_point(Point3::new(0.0, -4.0, 0.0));
    assert!((posed.z - 1.5).abs() < 1e-9);
}

#[test]
fn test_left_top_lands_on_box_top_at_190() {
    // Terminal frame: a vertex riding Left_Top alone ends approximately at
    // box-top height, inside the footprint
    let rig = Rig::build(&RigConfig::default()).unwrap();
    let deforms = rig.deform_matrices(190);
    let lt = rig.joints.left_top.unwrap();
    let weights: VertexWeights =
        Some(Influence { joint: lt, weight: 1.0 }).into_iter().collect();
    let posed = skin(&deforms, &weights, Point3::new(-2.0, 0.0, 0.0));
    assert!((posed.z - rig.box_spec.height).abs() < 1e-9);
    assert!(posed.x.abs() < rig.refs.half_width);
    assert!(posed.y.abs() < rig.refs.half_depth);
}

#[test]
fn test_zero_weight_vertex_never_moves() {
    let rig = Rig::build(&RigConfig::default()).unwrap();
    // Find a footprint vertex and check it across the whole timeline
    let vi = rig.sheet.verts.iter()
        .position(|&p| rig.refs.in_footprint(p))
        .unwrap();
    for &frame in &[1u16, 60, 90, 130, 165, 190] {
        let deforms = rig.deform_matrices(frame);
        let posed = rig.deformed_vertex(&deforms, vi);
        assert_eq!(posed, rig.sheet.verts[vi]);
    }
}

#[test]
fn test_degenerate_variants_build() {
    for &variant in &[Variant::Front, Variant::Side] {
        let mut config = RigConfig::default();
        config.variant = variant;
        let rig = Rig::build(&config).unwrap();
        let expected = if variant == Variant::Front { 2 } else { 4 };
        assert_eq!(rig.skeleton.num_joints(), expected);
        for w in &rig.weights {
            assert_eq!(w.len(), expected);
        }
    }
}
