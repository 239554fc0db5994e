//! Human-readable rig summary, for eyeballing a generated rig without
//! loading it anywhere.

use rig::Rig;

pub fn print(rig: &Rig) {
    println!("Rig ({} variant):", rig.variant.name());
    println!("  Box: {} x {} x {}",
        rig.box_spec.width, rig.box_spec.depth, rig.box_spec.height);
    println!("  Sheet: size {}, offset ({}, {}), rotation {} deg, {} vertices",
        rig.sheet.spec.size,
        rig.sheet.spec.offset_x, rig.sheet.spec.offset_y,
        rig.sheet.spec.rotation_deg,
        rig.sheet.num_verts());
    println!("  Fold references:");
    println!("    half_width: {}", rig.refs.half_width);
    println!("    half_depth: {}", rig.refs.half_depth);
    println!("    paper_corner_y: {}", rig.refs.paper_corner_y);
    println!("    paper_left_edge: {}", rig.refs.paper_left_edge);
    println!("    left_distance: {}", rig.refs.left_distance);

    println!("  Joints ({} total):", rig.skeleton.num_joints());
    for idx in rig.skeleton.walk_order() {
        let joint = &rig.skeleton.tree[idx];
        let parent = match rig.skeleton.parent(idx) {
            Some(p) => rig.skeleton.tree[p].name,
            None => "-",
        };
        println!("    {}:", joint.name);
        println!("      head: ({:.3}, {:.3}, {:.3})",
            joint.head.x, joint.head.y, joint.head.z);
        println!("      tail: ({:.3}, {:.3}, {:.3})",
            joint.tail.x, joint.tail.y, joint.tail.z);
        println!("      parent: {}", parent);

        let mut influenced = 0;
        let mut max_weight = 0.0f64;
        for vertex_weights in &rig.weights {
            for i in vertex_weights.iter() {
                if i.joint == idx && i.weight > 0.0 {
                    influenced += 1;
                    max_weight = max_weight.max(i.weight);
                }
            }
        }
        println!("      influences: {} vertices (max weight {:.3})",
            influenced, max_weight);
    }

    println!("  Timeline: frames 1..{}", rig.timeline.num_frames);
    for track in &rig.timeline.tracks {
        let frames = track.keys.iter()
            .map(|k| k.frame.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        println!("    {}: {} keys (at {})", track.name, track.keys.len(), frames);
    }
}
