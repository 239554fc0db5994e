//! Placement of the fold joints.
//!
//! Every joint is one physical crease line, head and tail picked so the
//! rotation axis lies along the box edge (or sheet line) the paper bends
//! around. Two independent chains, anchored to two adjacent box edges:
//!
//!   Front_Bottom -> Front_Top          stand the front flap up, then fold
//!                                      it over onto the box top
//!   Left_Side -+-> Left_Middle         raise the left panel, with the outer
//!              +-> Left_Front_Triangle half folding further in; pre-tuck
//!              +-> Left_Top            the corner triangle; fold the raised
//!                                      panel onto the top
//!
//! The smaller rig variants are the same construction with the later chain
//! members left out.

use cgmath::Point3;
use geometry::FoldRefs;
use rig::Variant;
use super::{JointIdx, Skeleton};

pub const FRONT_BOTTOM: &'static str = "Front_Bottom";
pub const FRONT_TOP: &'static str = "Front_Top";
pub const LEFT_SIDE: &'static str = "Left_Side";
pub const LEFT_MIDDLE: &'static str = "Left_Middle";
pub const LEFT_FRONT_TRIANGLE: &'static str = "Left_Front_Triangle";
pub const LEFT_TOP: &'static str = "Left_Top";

/// Indices of the fold joints a rig variant actually has.
pub struct FoldJoints {
    pub front_bottom: JointIdx,
    pub front_top: JointIdx,
    pub left_side: Option<JointIdx>,
    pub left_middle: Option<JointIdx>,
    pub left_triangle: Option<JointIdx>,
    pub left_top: Option<JointIdx>,
}

pub fn build(variant: Variant, refs: &FoldRefs) -> (Skeleton, FoldJoints) {
    let hw = refs.half_width;
    let hd = refs.half_depth;
    let h = refs.height;

    let mut skel = Skeleton::new();

    // === Front chain: stand the flap up along the front bottom edge, then
    // fold it over along the front top edge ===
    let front_bottom = skel.add_root(
        FRONT_BOTTOM,
        Point3::new(0.0, -hd, 0.0),
        Point3::new(0.0, -hd, h),
    );
    // The tail reaches the rest of the way toward the sheet's near tip, so
    // everything past the top edge rides this joint
    let front_top = skel.add_child(
        front_bottom,
        FRONT_TOP,
        Point3::new(0.0, -hd, h),
        Point3::new(0.0, -hd + (refs.paper_corner_y + hd), h),
    );

    let mut joints = FoldJoints {
        front_bottom,
        front_top,
        left_side: None,
        left_middle: None,
        left_triangle: None,
        left_top: None,
    };
    if !variant.has_left_chain() {
        return (skel, joints);
    }

    // === Left chain: the panel raise is split at its midpoint so the outer
    // half can fold further in for the tucked look ===
    let middle_point = -hw - refs.left_distance / 2.0;

    let left_side = skel.add_root(
        LEFT_SIDE,
        Point3::new(-hw, -hd, 0.0),
        Point3::new(middle_point, -hd, 0.0),
    );
    let left_middle = skel.add_child(
        left_side,
        LEFT_MIDDLE,
        Point3::new(middle_point, -hd, 0.0),
        Point3::new(refs.paper_left_edge, -hd, 0.0),
    );
    joints.left_side = Some(left_side);
    joints.left_middle = Some(left_middle);
    if !variant.has_left_tuck() {
        return (skel, joints);
    }

    // Corner-tuck joint, sitting at half height on the front left edge: when
    // the panel stands up, the sheet band that lands at this height is the
    // triangular overhang poking past the front face
    let triangle_extent = refs.left_distance / 2.0;
    let left_triangle = skel.add_child(
        left_side,
        LEFT_FRONT_TRIANGLE,
        Point3::new(-hw, -hd, h / 2.0),
        Point3::new(-hw - triangle_extent, -hd, h / 2.0),
    );
    // Final fold of the raised panel onto the box top, toward top center
    let left_top = skel.add_child(
        left_side,
        LEFT_TOP,
        Point3::new(-hw, -hd, h),
        Point3::new(0.0, -hd, h),
    );
    joints.left_triangle = Some(left_triangle);
    joints.left_top = Some(left_top);

    (skel, joints)
}


#[cfg(test)]
use geometry::{BoxSpec, SheetSpec};

#[cfg(test)]
fn example_refs() -> FoldRefs {
    let bx = BoxSpec { width: 3.0, depth: 2.0, height: 1.5 };
    let sheet = SheetSpec {
        size: 8.0, offset_x: -1.0, offset_y: -1.0, rotation_deg: 45.0, cuts: 60,
    };
    FoldRefs::derive(&bx, &sheet, true).unwrap()
}

#[test]
fn test_full_rig_placement() {
    let refs = example_refs();
    let (skel, joints) = build(Variant::Full, &refs);
    assert_eq!(skel.num_joints(), 6);
    assert_eq!(skel.roots.len(), 2);

    let j = |idx: JointIdx| &skel.tree[idx];
    assert_eq!(j(joints.front_bottom).head, Point3::new(0.0, -1.0, 0.0));
    assert_eq!(j(joints.front_bottom).tail, Point3::new(0.0, -1.0, 1.5));
    assert_eq!(j(joints.front_top).head, Point3::new(0.0, -1.0, 1.5));
    assert_eq!(j(joints.front_top).tail, Point3::new(0.0, -4.0, 1.5));

    let ls = joints.left_side.unwrap();
    assert_eq!(j(ls).head, Point3::new(-1.5, -1.0, 0.0));
    assert_eq!(j(ls).tail, Point3::new(-3.25, -1.0, 0.0));
    let lm = joints.left_middle.unwrap();
    assert_eq!(j(lm).head, Point3::new(-3.25, -1.0, 0.0));
    assert_eq!(j(lm).tail, Point3::new(-5.0, -1.0, 0.0));
    let tri = joints.left_triangle.unwrap();
    assert_eq!(j(tri).head, Point3::new(-1.5, -1.0, 0.75));
    assert_eq!(j(tri).tail, Point3::new(-3.25, -1.0, 0.75));
    let lt = joints.left_top.unwrap();
    assert_eq!(j(lt).head, Point3::new(-1.5, -1.0, 1.5));
    assert_eq!(j(lt).tail, Point3::new(0.0, -1.0, 1.5));
}

#[test]
fn test_hierarchy() {
    let refs = example_refs();
    let (skel, joints) = build(Variant::Full, &refs);
    assert_eq!(skel.parent(joints.front_bottom), None);
    assert_eq!(skel.parent(joints.front_top), Some(joints.front_bottom));
    let ls = joints.left_side.unwrap();
    assert_eq!(skel.parent(ls), None);
    assert_eq!(skel.parent(joints.left_middle.unwrap()), Some(ls));
    assert_eq!(skel.parent(joints.left_triangle.unwrap()), Some(ls));
    assert_eq!(skel.parent(joints.left_top.unwrap()), Some(ls));
}

#[test]
fn test_variant_joint_sets() {
    let refs = example_refs();
    let (skel, joints) = build(Variant::Front, &refs);
    assert_eq!(skel.num_joints(), 2);
    assert!(joints.left_side.is_none());

    let (skel, joints) = build(Variant::Side, &refs);
    assert_eq!(skel.num_joints(), 4);
    assert!(joints.left_side.is_some());
    assert!(joints.left_triangle.is_none());
    assert!(joints.left_top.is_none());
}
