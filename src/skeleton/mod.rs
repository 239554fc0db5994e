//! Fold skeleton.
//!
//! A brief review of how the rig deforms the sheet. The skeleton is a
//! _forest of joints_; every sheet vertex carries a weight for every joint.
//!
//! Each joint has a rest frame E, the rigid transform from its local space
//! (origin at the head, Y axis running head to tail, zero roll) to world
//! space. Posing assigns each joint a local rotation R, expressed in its own
//! rest frame, and the posed local-to-world transform composes down the
//! chain:
//!
//!     M(j) = M(parent j) * E(parent j)^{-1} * E(j) * R(j)
//!
//! A vertex's final position is then given by the skinning equation
//!
//!     v' = sum over joints j of  w_j * M(j) * E(j)^{-1} * v
//!
//! with the weights normalized over their sum. M(j) * E(j)^{-1} is the
//! joint's deform matrix; at the rest pose it is the identity for every
//! joint, which is why the flat sheet doesn't move until a keyframe says so.
//!
//! The child-relative composition is the trick that keeps multi-stage folds
//! consistent: a child joint's authored angle is always measured from
//! wherever its parent already left it, so folding a flap over the top is
//! "+90 from vertical" rather than an absolute orientation that would need
//! re-deriving whenever the earlier stage changes.

pub mod fold_joints;
pub mod weights;

pub use self::fold_joints::FoldJoints;

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, One, Point3, Quaternion, Vector3, vec3};
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableGraph;

/// Forest of joints. Edges run _from_ the parent _to_ the child.
pub type JointTree = StableGraph<Joint, ()>;
pub type JointIdx = NodeIndex;

pub struct Joint {
    pub name: &'static str,
    /// Rest head position (world space). The joint rotates about this point.
    pub head: Point3<f64>,
    /// Rest tail position (world space). Head-to-tail is the fold line's
    /// local Y axis; the tail length encodes how much sheet rides the fold.
    pub tail: Point3<f64>,
    /// Rest frame: joint local space -> world.
    pub rest_local_to_world: Matrix4<f64>,
    /// Ie. inverse bind matrix. Cached for convenience.
    pub rest_world_to_local: Matrix4<f64>,
}

impl Joint {
    fn new(name: &'static str, head: Point3<f64>, tail: Point3<f64>) -> Joint {
        let (e, e_inv) = rest_frames(head, tail);
        Joint {
            name,
            head,
            tail,
            rest_local_to_world: e,
            rest_world_to_local: e_inv,
        }
    }
}

/// Rest frame for a joint: origin at the head, Y along the bone, zero roll.
///
/// Zero roll means the shortest-arc rotation taking +Y to the bone
/// direction; a bone pointing straight along -Y degenerates to a half-turn
/// about Z. Matches the convention of the deformation hosts this rig
/// targets, so authored angles mean the same thing there.
fn rest_frames(head: Point3<f64>, tail: Point3<f64>) -> (Matrix4<f64>, Matrix4<f64>) {
    let dir = (tail - head).normalize();
    let orient = Matrix3::from(Quaternion::from_arc(Vector3::unit_y(), dir, None));

    let head_v = vec3(head.x, head.y, head.z);
    let local_to_world = Matrix4::from_translation(head_v) * Matrix4::from(orient);
    // Rigid inverse: transpose the rotation, rotate the translation back
    let world_to_local = Matrix4::from(orient.transpose()) * Matrix4::from_translation(-head_v);
    (local_to_world, world_to_local)
}

pub struct Skeleton {
    pub tree: JointTree,
    pub roots: Vec<JointIdx>,
}

impl Skeleton {
    pub fn new() -> Skeleton {
        Skeleton {
            tree: JointTree::with_capacity(6, 6),
            roots: Vec::with_capacity(2),
        }
    }

    pub fn add_root(&mut self, name: &'static str, head: Point3<f64>, tail: Point3<f64>) -> JointIdx {
        let idx = self.tree.add_node(Joint::new(name, head, tail));
        self.roots.push(idx);
        idx
    }

    pub fn add_child(
        &mut self,
        parent: JointIdx,
        name: &'static str,
        head: Point3<f64>,
        tail: Point3<f64>,
    ) -> JointIdx {
        let idx = self.tree.add_node(Joint::new(name, head, tail));
        self.tree.add_edge(parent, idx, ());
        idx
    }

    pub fn num_joints(&self) -> usize {
        self.tree.node_count()
    }

    pub fn parent(&self, joint: JointIdx) -> Option<JointIdx> {
        self.tree.neighbors_directed(joint, Direction::Incoming).next()
    }

    pub fn find(&self, name: &str) -> Option<JointIdx> {
        self.tree.node_indices().find(|&idx| self.tree[idx].name == name)
    }

    /// All joint indices, parents before children.
    pub fn walk_order(&self) -> Vec<JointIdx> {
        let mut order = Vec::with_capacity(self.num_joints());
        let mut stack: Vec<JointIdx> = self.roots.iter().rev().cloned().collect();
        while let Some(idx) = stack.pop() {
            order.push(idx);
            for child in self.tree.neighbors_directed(idx, Direction::Outgoing) {
                stack.push(child);
            }
        }
        order
    }

    /// Composed local-to-world matrix for every joint at a pose. The pose is
    /// given as a local rotation matrix per joint, indexed by
    /// `JointIdx::index()`.
    pub fn pose_local_to_world(&self, local_rots: &[Matrix4<f64>]) -> Vec<Matrix4<f64>> {
        let mut world = vec![Matrix4::one(); self.tree.node_count()];
        for idx in self.walk_order() {
            let joint = &self.tree[idx];
            let own = joint.rest_local_to_world * local_rots[idx.index()];
            world[idx.index()] = match self.parent(idx) {
                Some(p) => {
                    let parent = &self.tree[p];
                    world[p.index()] * parent.rest_world_to_local * own
                }
                None => own,
            };
        }
        world
    }

    /// Deform matrix per joint: world-space rest position -> world-space
    /// posed position for geometry riding that joint. Identity at rest.
    pub fn deform_matrices(&self, local_rots: &[Matrix4<f64>]) -> Vec<Matrix4<f64>> {
        let world = self.pose_local_to_world(local_rots);
        self.tree.node_indices()
            .map(|idx| world[idx.index()] * self.tree[idx].rest_world_to_local)
            .collect::<Vec<_>>()
    }
}


#[cfg(test)]
use cgmath::ApproxEq;

#[cfg(test)]
fn identity_pose(skel: &Skeleton) -> Vec<Matrix4<f64>> {
    vec![Matrix4::one(); skel.num_joints()]
}

#[test]
fn test_rest_frame_up_bone() {
    // A bone pointing +Z: local Y maps to world +Z
    let (e, e_inv) = rest_frames(Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, -1.0, 1.5));
    let y = e * cgmath::vec4(0.0, 1.0, 0.0, 0.0);
    assert!(y.truncate().relative_eq(&vec3(0.0, 0.0, 1.0), 1e-12, 1e-12));
    assert!((e * e_inv).relative_eq(&Matrix4::one(), 1e-12, 1e-12));
}

#[test]
fn test_rest_frame_minus_y_bone() {
    // The degenerate case: a bone along -Y gets the half-turn-about-Z frame,
    // so its local X is world -X
    let (e, _) = rest_frames(Point3::new(0.0, -1.0, 1.5), Point3::new(0.0, -4.0, 1.5));
    let x = (e * cgmath::vec4(1.0, 0.0, 0.0, 0.0)).truncate();
    let z = (e * cgmath::vec4(0.0, 0.0, 1.0, 0.0)).truncate();
    assert!(x.relative_eq(&vec3(-1.0, 0.0, 0.0), 1e-12, 1e-12));
    assert!(z.relative_eq(&vec3(0.0, 0.0, 1.0), 1e-12, 1e-12));
}

#[test]
fn test_rest_pose_deform_is_identity() {
    let mut skel = Skeleton::new();
    let a = skel.add_root("A", Point3::new(0.0, -1.0, 0.0), Point3::new(0.0, -1.0, 1.5));
    skel.add_child(a, "B", Point3::new(0.0, -1.0, 1.5), Point3::new(0.0, -4.0, 1.5));
    let deforms = skel.deform_matrices(&identity_pose(&skel));
    for d in &deforms {
        assert!(d.relative_eq(&Matrix4::one(), 1e-12, 1e-12));
    }
}

#[test]
fn test_walk_order_parents_first() {
    let mut skel = Skeleton::new();
    let a = skel.add_root("A", Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 1.0));
    let b = skel.add_child(a, "B", Point3::new(0.0, 0.0, 1.0), Point3::new(0.0, 1.0, 1.0));
    let c = skel.add_child(a, "C", Point3::new(0.0, 0.0, 1.0), Point3::new(1.0, 0.0, 1.0));
    let r = skel.add_root("R", Point3::new(5.0, 0.0, 0.0), Point3::new(5.0, 0.0, 1.0));
    let order = skel.walk_order();
    assert_eq!(order.len(), 4);
    let pos = |j: JointIdx| order.iter().position(|&x| x == j).unwrap();
    assert!(pos(a) < pos(b));
    assert!(pos(a) < pos(c));
    assert!(pos(r) > pos(a));
}
