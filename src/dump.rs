//! Serialize the rig description to JSON.
//!
//! This is transport glue for consumers that don't link the crate: one
//! document carrying the box/sheet description, the joint list with rest
//! transforms, the per-vertex weight vectors (keyed by joint name, vertex
//! order matching the sheet grid), and the flat ordered keyframe list.

use errors::*;
use json::JsonValue;
use rig::Rig;
use std::io::Write;
use time;

pub fn write<W: Write>(rig: &Rig, w: &mut W) -> Result<()> {
    let doc = rig_to_json(rig);
    doc.write_pretty(w, 2)?;
    writeln!(w)?;
    Ok(())
}

pub fn rig_to_json(rig: &Rig) -> JsonValue {
    let now = time::now_utc();
    let generated = time::strftime("%FT%TZ", &now).unwrap();

    object! {
        "generator" => format!("orikata {}", env!("CARGO_PKG_VERSION")),
        "generated" => generated,
        "variant" => rig.variant.name(),
        "box" => object! {
            "width" => rig.box_spec.width,
            "depth" => rig.box_spec.depth,
            "height" => rig.box_spec.height,
        },
        "sheet" => object! {
            "size" => rig.sheet.spec.size,
            "offset" => array![rig.sheet.spec.offset_x, rig.sheet.spec.offset_y],
            "rotationDeg" => rig.sheet.spec.rotation_deg,
            "cuts" => rig.sheet.spec.cuts,
            "vertices" => vertices(rig),
        },
        "joints" => joints(rig),
        "weights" => weights(rig),
        "keyframes" => keyframes(rig),
    }
}

fn vertices(rig: &Rig) -> JsonValue {
    let verts = rig.sheet.verts.iter()
        .map(|v| array![v.x, v.y, v.z])
        .collect::<Vec<JsonValue>>();
    JsonValue::from(verts)
}

fn joints(rig: &Rig) -> JsonValue {
    // Parents before children, so a consumer can build its skeleton in one
    // forward pass
    let joints = rig.skeleton.walk_order().into_iter()
        .map(|idx| {
            let joint = &rig.skeleton.tree[idx];
            let parent = match rig.skeleton.parent(idx) {
                Some(p) => JsonValue::from(rig.skeleton.tree[p].name),
                None => JsonValue::Null,
            };
            object! {
                "name" => joint.name,
                "head" => array![joint.head.x, joint.head.y, joint.head.z],
                "tail" => array![joint.tail.x, joint.tail.y, joint.tail.z],
                "parent" => parent,
            }
        })
        .collect::<Vec<JsonValue>>();
    JsonValue::from(joints)
}

fn weights(rig: &Rig) -> JsonValue {
    let weights = rig.weights.iter()
        .map(|vertex_weights| {
            let mut by_joint = JsonValue::new_object();
            for influence in vertex_weights.iter() {
                let name = rig.skeleton.tree[influence.joint].name;
                by_joint[name] = influence.weight.into();
            }
            by_joint
        })
        .collect::<Vec<JsonValue>>();
    JsonValue::from(weights)
}

fn keyframes(rig: &Rig) -> JsonValue {
    let mut keyframes = Vec::new();
    for track in &rig.timeline.tracks {
        for key in &track.keys {
            keyframes.push(object! {
                "joint" => track.name,
                "frame" => key.frame,
                "rotationDeg" => array![key.rot_deg[0], key.rot_deg[1], key.rot_deg[2]],
            });
        }
    }
    JsonValue::from(keyframes)
}


#[cfg(test)]
use rig::RigConfig;

#[test]
fn test_dump_shape() {
    let mut config = RigConfig::default();
    config.sheet_spec.cuts = 3;
    let rig = Rig::build(&config).unwrap();
    let doc = rig_to_json(&rig);

    assert_eq!(doc["box"]["width"].as_f64(), Some(3.0));
    assert_eq!(doc["sheet"]["cuts"].as_u32(), Some(3));
    assert_eq!(doc["sheet"]["vertices"].len(), 25);
    assert_eq!(doc["joints"].len(), 6);
    assert_eq!(doc["weights"].len(), 25);

    // Roots carry a null parent, children their parent's name
    let first = &doc["joints"][0];
    assert!(first["parent"].is_null());

    // Every keyframe names a joint the rig has
    assert!(doc["keyframes"].len() > 0);
    for kf in doc["keyframes"].members() {
        assert!(rig.skeleton.find(kf["joint"].as_str().unwrap()).is_some());
        assert!(kf["frame"].as_u16().unwrap() >= 1);
    }
}

#[test]
fn test_dump_writes() {
    let mut config = RigConfig::default();
    config.sheet_spec.cuts = 2;
    let rig = Rig::build(&config).unwrap();
    let mut out = Vec::new();
    write(&rig, &mut out).unwrap();
    let parsed = ::json::parse(::std::str::from_utf8(&out).unwrap()).unwrap();
    assert_eq!(parsed["joints"].len(), 6);
}
