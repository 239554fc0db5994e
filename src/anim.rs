//! Pose sequencer.
//!
//! The fold motion is authored as a table of keyframes per joint over a
//! fixed frame range (data, not a sequence of imperative inserts), so the
//! staging can be read and tested without any animation runtime.
//!
//! Rotations are Euler XYZ in degrees, converted to radians at sample time,
//! and are expressed in each joint's own rest frame: a child's angle means
//! "from wherever the parent already is". The contract only fixes values AT
//! key times; between keys the built-in evaluator interpolates linearly and
//! holds past the ends, like a consumer with linear curves would.
//!
//! The staging encodes a strict ordering: the corner triangle pre-folds
//! (frames 115-130) before the side panel starts to rise (150), or the
//! triangle would sweep through the already-folded front panel. The
//! explicit zero keys are what pin a chain in place until its stage begins.

use cgmath::{Deg, Euler, Matrix3, Matrix4, One, Rad};
use errors::*;
use rig::Variant;
use skeleton::fold_joints::*;
use skeleton::{JointIdx, Skeleton};

/// One authored key: frame number and rotation in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Key {
    pub frame: u16,
    pub rot_deg: [f64; 3],
}

/// Keyframe track for one joint.
pub struct Track {
    pub joint: JointIdx,
    pub name: &'static str,
    pub keys: Vec<Key>,
}

pub struct Timeline {
    pub num_frames: u16,
    pub tracks: Vec<Track>,
}

type KeySpec = (u16, [f64; 3]);

// === 6-joint wrap, 190 frames ===
// Stage 1 (1-90): stand the front flap vertical, then fold it over the top.
// +90 on Front_Top against the parent's -90 nets out flat over the box.
// Stage 2a (115-130): pre-tuck the corner triangle about its local Z.
// Stage 2b (150-165): raise the side panel; Left_Middle deliberately lags
// Left_Side on the way up and passes it at the end for the tucked look.
// Stage 2c (190): fold the raised panel onto the top.
static FULL_FRONT_BOTTOM: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (60, [-90.0, 0.0, 0.0]),
    (90, [-90.0, 0.0, 0.0]),
];
static FULL_FRONT_TOP: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (60, [0.0, 0.0, 0.0]),
    (90, [90.0, 0.0, 0.0]),
];
static FULL_LEFT_SIDE: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (90, [0.0, 0.0, 0.0]),
    (115, [0.0, 0.0, 0.0]),
    (130, [0.0, 0.0, 0.0]),
    (150, [60.0, 0.0, 0.0]),
    (165, [90.0, 0.0, 0.0]),
    (190, [90.0, 0.0, 0.0]),
];
static FULL_LEFT_MIDDLE: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (90, [0.0, 0.0, 0.0]),
    (115, [0.0, 0.0, 0.0]),
    (130, [0.0, 0.0, 0.0]),
    (150, [40.0, 0.0, 0.0]),
    (165, [70.0, 0.0, 0.0]),
    (190, [90.0, 0.0, 0.0]),
];
static FULL_LEFT_TRIANGLE: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (90, [0.0, 0.0, 0.0]),
    (115, [0.0, 0.0, 45.0]),
    (130, [0.0, 0.0, 90.0]),
    (150, [0.0, 0.0, 90.0]),
    (165, [0.0, 0.0, 90.0]),
    (190, [0.0, 0.0, 90.0]),
];
static FULL_LEFT_TOP: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (90, [0.0, 0.0, 0.0]),
    (115, [0.0, 0.0, 0.0]),
    (130, [0.0, 0.0, 0.0]),
    (150, [0.0, 0.0, 0.0]),
    (165, [0.0, 0.0, 0.0]),
    (190, [-90.0, 0.0, 0.0]),
];
static FULL_TABLE: &'static [(&'static str, &'static [KeySpec])] = &[
    (FRONT_BOTTOM, FULL_FRONT_BOTTOM),
    (FRONT_TOP, FULL_FRONT_TOP),
    (LEFT_SIDE, FULL_LEFT_SIDE),
    (LEFT_MIDDLE, FULL_LEFT_MIDDLE),
    (LEFT_FRONT_TRIANGLE, FULL_LEFT_TRIANGLE),
    (LEFT_TOP, FULL_LEFT_TOP),
];

// === 4-joint rig, 150 frames: same staging, no tuck stage ===
static SIDE_LEFT_SIDE: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (90, [0.0, 0.0, 0.0]),
    (110, [60.0, 0.0, 0.0]),
    (125, [90.0, 0.0, 0.0]),
    (150, [90.0, 0.0, 0.0]),
];
static SIDE_LEFT_MIDDLE: &'static [KeySpec] = &[
    (1, [0.0, 0.0, 0.0]),
    (90, [0.0, 0.0, 0.0]),
    (110, [40.0, 0.0, 0.0]),
    (125, [70.0, 0.0, 0.0]),
    (150, [90.0, 0.0, 0.0]),
];
static SIDE_TABLE: &'static [(&'static str, &'static [KeySpec])] = &[
    (FRONT_BOTTOM, FULL_FRONT_BOTTOM),
    (FRONT_TOP, FULL_FRONT_TOP),
    (LEFT_SIDE, SIDE_LEFT_SIDE),
    (LEFT_MIDDLE, SIDE_LEFT_MIDDLE),
];

// === 2-joint rig, 120 frames: the front fold alone ===
static FRONT_TABLE: &'static [(&'static str, &'static [KeySpec])] = &[
    (FRONT_BOTTOM, FULL_FRONT_BOTTOM),
    (FRONT_TOP, FULL_FRONT_TOP),
];

impl Timeline {
    /// Build the timeline for a rig variant, resolving joint names against
    /// the skeleton. A table entry with no matching joint is fatal.
    pub fn build(variant: Variant, skeleton: &Skeleton) -> Result<Timeline> {
        let (num_frames, table) = match variant {
            Variant::Front => (120, FRONT_TABLE),
            Variant::Side => (150, SIDE_TABLE),
            Variant::Full => (190, FULL_TABLE),
        };

        let mut tracks = Vec::with_capacity(table.len());
        for &(name, specs) in table {
            let joint = skeleton.find(name)
                .ok_or_else(|| ErrorKind::MissingJoint(name.to_string()))?;
            let mut keys: Vec<Key> = specs.iter()
                .map(|&(frame, rot_deg)| Key { frame, rot_deg })
                .collect();
            // Hold the last value out to the end of the timeline so every
            // track is keyed at the final frame
            let last = keys[keys.len() - 1];
            if last.frame < num_frames {
                keys.push(Key { frame: num_frames, rot_deg: last.rot_deg });
            }
            tracks.push(Track { joint, name, keys });
        }
        Ok(Timeline { num_frames, tracks })
    }

    /// Per-joint local rotation matrices at a frame, indexed by
    /// `JointIdx::index()`. Joints without a track stay at rest.
    pub fn local_rotations(&self, num_joints: usize, frame: u16) -> Vec<Matrix4<f64>> {
        let mut rots = vec![Matrix4::one(); num_joints];
        for track in &self.tracks {
            rots[track.joint.index()] = rotation_matrix(track.sample(frame));
        }
        rots
    }
}

impl Track {
    /// Rotation at a frame, in degrees. Exact at key times, linear between
    /// them, held before the first key and after the last.
    pub fn sample(&self, frame: u16) -> [f64; 3] {
        let keys = &self.keys;
        if frame <= keys[0].frame {
            return keys[0].rot_deg;
        }
        for w in keys.windows(2) {
            let (k0, k1) = (w[0], w[1]);
            if frame < k1.frame {
                let lam = (frame - k0.frame) as f64 / (k1.frame - k0.frame) as f64;
                return [
                    k0.rot_deg[0] + (k1.rot_deg[0] - k0.rot_deg[0]) * lam,
                    k0.rot_deg[1] + (k1.rot_deg[1] - k0.rot_deg[1]) * lam,
                    k0.rot_deg[2] + (k1.rot_deg[2] - k0.rot_deg[2]) * lam,
                ];
            }
        }
        keys[keys.len() - 1].rot_deg
    }
}

/// Euler XYZ in degrees to a rotation matrix. Every authored key rotates
/// about a single axis, so the composition order of the Euler terms never
/// comes into play.
pub fn rotation_matrix(rot_deg: [f64; 3]) -> Matrix4<f64> {
    let euler = Euler::new(
        Rad::from(Deg(rot_deg[0])),
        Rad::from(Deg(rot_deg[1])),
        Rad::from(Deg(rot_deg[2])),
    );
    Matrix4::from(Matrix3::from(euler))
}


#[cfg(test)]
use geometry::{BoxSpec, FoldRefs, SheetSpec};
#[cfg(test)]
use skeleton::fold_joints;

#[cfg(test)]
fn example_skeleton(variant: Variant) -> Skeleton {
    let bx = BoxSpec { width: 3.0, depth: 2.0, height: 1.5 };
    let sheet = SheetSpec {
        size: 8.0, offset_x: -1.0, offset_y: -1.0, rotation_deg: 45.0, cuts: 60,
    };
    let refs = FoldRefs::derive(&bx, &sheet, variant.has_left_chain()).unwrap();
    fold_joints::build(variant, &refs).0
}

#[test]
fn test_every_track_keyed_at_start_and_end() {
    for &variant in &[Variant::Front, Variant::Side, Variant::Full] {
        let skel = example_skeleton(variant);
        let timeline = Timeline::build(variant, &skel).unwrap();
        assert_eq!(timeline.tracks.len(), skel.num_joints());
        for track in &timeline.tracks {
            let first = &track.keys[0];
            assert_eq!(first.frame, 1);
            assert_eq!(first.rot_deg, [0.0, 0.0, 0.0]);
            assert_eq!(track.keys[track.keys.len() - 1].frame, timeline.num_frames);
        }
    }
}

#[test]
fn test_key_times_strictly_increasing() {
    for &variant in &[Variant::Front, Variant::Side, Variant::Full] {
        let skel = example_skeleton(variant);
        let timeline = Timeline::build(variant, &skel).unwrap();
        for track in &timeline.tracks {
            for w in track.keys.windows(2) {
                assert!(w[0].frame < w[1].frame, "track {}", track.name);
            }
        }
    }
}

#[test]
fn test_missing_joint_is_fatal() {
    // The full table names the left chain; a front-only skeleton can't
    // satisfy it
    let skel = example_skeleton(Variant::Front);
    let err = Timeline::build(Variant::Full, &skel).err().expect("expected MissingJoint");
    match *err.kind() {
        ErrorKind::MissingJoint(ref name) => assert_eq!(name.as_str(), LEFT_SIDE),
        _ => panic!("wrong error kind"),
    }
}

#[test]
fn test_sampling() {
    let skel = example_skeleton(Variant::Full);
    let timeline = Timeline::build(Variant::Full, &skel).unwrap();
    let track_named = |name: &str| {
        timeline.tracks.iter().find(|t| t.name == name).unwrap()
    };

    // Frame 1: everything at rest
    for track in &timeline.tracks {
        assert_eq!(track.sample(1), [0.0, 0.0, 0.0]);
    }

    // Exact at keys
    assert_eq!(track_named(LEFT_SIDE).sample(150), [60.0, 0.0, 0.0]);
    assert_eq!(track_named(LEFT_SIDE).sample(165), [90.0, 0.0, 0.0]);
    assert_eq!(track_named(FRONT_BOTTOM).sample(60), [-90.0, 0.0, 0.0]);

    // Linear in between
    assert_eq!(track_named(LEFT_SIDE).sample(140), [30.0, 0.0, 0.0]);
    let mid = track_named(FRONT_BOTTOM).sample(30);
    assert!((mid[0] - (-90.0 * 29.0 / 59.0)).abs() < 1e-12);

    // Held past the last key
    assert_eq!(track_named(FRONT_BOTTOM).sample(190), [-90.0, 0.0, 0.0]);
}

#[test]
fn test_tuck_completes_before_side_raises() {
    let skel = example_skeleton(Variant::Full);
    let timeline = Timeline::build(Variant::Full, &skel).unwrap();
    let track_named = |name: &str| {
        timeline.tracks.iter().find(|t| t.name == name).unwrap()
    };
    // At 130 the triangle is fully pre-folded while the side panel has not
    // begun to rise; violating this ordering would sweep the triangle
    // through the front panel
    assert_eq!(track_named(LEFT_FRONT_TRIANGLE).sample(130), [0.0, 0.0, 90.0]);
    assert_eq!(track_named(LEFT_SIDE).sample(130), [0.0, 0.0, 0.0]);
    assert_eq!(track_named(LEFT_TOP).sample(165), [0.0, 0.0, 0.0]);
}
