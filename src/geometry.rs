//! Box and sheet geometry.
//!
//! The box is axis-aligned, centered in X/Y, base at Z=0. The sheet is a
//! subdivided planar quad at Z=0, shifted by an offset and then rotated 45
//! degrees about Z so it sits diagonally under the box. All the fold math
//! downstream works from the handful of reference distances derived here.

use cgmath::{Deg, Matrix4, Point3, Transform, vec3};
use errors::*;

#[derive(Debug, Copy, Clone)]
pub struct BoxSpec {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
}

#[derive(Debug, Copy, Clone)]
pub struct SheetSpec {
    /// Side length of the square sheet.
    pub size: f64,
    pub offset_x: f64,
    pub offset_y: f64,
    /// Rotation about Z, applied after the offset. The wrap pattern assumes
    /// the diagonal placement (45).
    pub rotation_deg: f64,
    /// Subdivision cuts per side; the vertex grid is (cuts+2) x (cuts+2).
    pub cuts: u32,
}

/// Reference distances for the fold construction, in world units.
///
/// `paper_corner_y` and `paper_left_edge` are measured on the unrotated
/// sheet; they act as reach distances (how far the sheet extends past a fold
/// line), not as positions of actual rotated vertices.
#[derive(Debug, Copy, Clone)]
pub struct FoldRefs {
    pub half_width: f64,
    pub half_depth: f64,
    pub height: f64,
    pub paper_corner_y: f64,
    pub paper_left_edge: f64,
    /// How far the sheet extends past the left face.
    pub left_distance: f64,
}

impl FoldRefs {
    /// Derive the fold references, validating the inputs. `with_left_chain`
    /// adds the reach checks for the left fold chain.
    pub fn derive(bx: &BoxSpec, sheet: &SheetSpec, with_left_chain: bool) -> Result<FoldRefs> {
        if bx.width <= 0.0 || bx.depth <= 0.0 || bx.height <= 0.0 {
            bail!(ErrorKind::InvalidGeometry(format!(
                "box dimensions must be positive, got {}x{}x{}",
                bx.width, bx.depth, bx.height,
            )));
        }
        if sheet.size <= 0.0 {
            bail!(ErrorKind::InvalidGeometry(format!(
                "sheet size must be positive, got {}", sheet.size,
            )));
        }
        if sheet.cuts == 0 {
            bail!(ErrorKind::InvalidGeometry(
                "sheet must be subdivided at least once".to_string(),
            ));
        }

        let half_width = bx.width / 2.0;
        let half_depth = bx.depth / 2.0;
        let paper_corner_y = -sheet.size / 2.0;
        let paper_left_edge = -sheet.size / 2.0 + sheet.offset_x;
        let left_distance = (paper_left_edge + half_width).abs();

        // The front flap must reach past the top fold line, or the top fold
        // has nothing to grab (and the blend-out denominator degenerates).
        if (paper_corner_y + half_depth).abs() <= bx.height {
            bail!(ErrorKind::InvalidGeometry(format!(
                "sheet reaches only {} past the front fold line; needs more \
                 than the box height {}",
                (paper_corner_y + half_depth).abs(), bx.height,
            )));
        }
        if with_left_chain && paper_left_edge >= -half_width {
            bail!(ErrorKind::InvalidGeometry(format!(
                "sheet's left edge ({}) does not extend past the left face \
                 ({})", paper_left_edge, -half_width,
            )));
        }

        Ok(FoldRefs {
            half_width,
            half_depth,
            height: bx.height,
            paper_corner_y,
            paper_left_edge,
            left_distance,
        })
    }

    /// Is the point inside the box footprint (deformation keep-out zone)?
    pub fn in_footprint(&self, p: Point3<f64>) -> bool {
        p.x.abs() <= self.half_width && p.y.abs() <= self.half_depth
    }
}

/// The tessellated sheet: world-space rest positions for every vertex.
///
/// Vertices are a row-major grid, (cuts+2) per side, from local
/// (-size/2, -size/2) to (size/2, size/2). This ordering is part of the
/// contract with the deformation consumer; weights are per vertex index.
pub struct Sheet {
    pub spec: SheetSpec,
    pub verts: Vec<Point3<f64>>,
}

impl Sheet {
    pub fn tessellate(spec: &SheetSpec) -> Sheet {
        let n = spec.cuts as usize + 2;
        let to_world = world_transform(spec);

        let mut verts = Vec::with_capacity(n * n);
        for j in 0..n {
            for i in 0..n {
                let fx = i as f64 / (n - 1) as f64;
                let fy = j as f64 / (n - 1) as f64;
                let local = Point3::new(
                    spec.size * (fx - 0.5),
                    spec.size * (fy - 0.5),
                    0.0,
                );
                verts.push(to_world.transform_point(local));
            }
        }

        Sheet { spec: *spec, verts }
    }

    pub fn num_verts(&self) -> usize {
        self.verts.len()
    }
}

/// Sheet local-to-world transform: offset, then rotate about Z.
pub fn world_transform(spec: &SheetSpec) -> Matrix4<f64> {
    Matrix4::from_translation(vec3(spec.offset_x, spec.offset_y, 0.0)) *
        Matrix4::from_angle_z(Deg(spec.rotation_deg))
}


#[cfg(test)]
fn example_specs() -> (BoxSpec, SheetSpec) {
    (
        BoxSpec { width: 3.0, depth: 2.0, height: 1.5 },
        SheetSpec {
            size: 8.0,
            offset_x: -1.0,
            offset_y: -1.0,
            rotation_deg: 45.0,
            cuts: 60,
        },
    )
}

#[test]
fn test_fold_refs() {
    let (bx, sheet) = example_specs();
    let refs = FoldRefs::derive(&bx, &sheet, true).unwrap();
    assert_eq!(refs.half_width, 1.5);
    assert_eq!(refs.half_depth, 1.0);
    assert_eq!(refs.paper_corner_y, -4.0);
    assert_eq!(refs.paper_left_edge, -5.0);
    assert_eq!(refs.left_distance, 3.5);
}

#[test]
fn test_degenerate_dims_rejected() {
    let (bx, sheet) = example_specs();
    for &(w, d, h) in &[(0.0, 2.0, 1.5), (3.0, -2.0, 1.5), (3.0, 2.0, 0.0)] {
        let bad = BoxSpec { width: w, depth: d, height: h };
        assert!(FoldRefs::derive(&bad, &sheet, true).is_err());
    }
    let bad_sheet = SheetSpec { size: -8.0, ..sheet };
    assert!(FoldRefs::derive(&bx, &bad_sheet, true).is_err());
    // Too small to reach past the top fold line
    let tiny = SheetSpec { size: 2.5, ..sheet };
    assert!(FoldRefs::derive(&bx, &tiny, false).is_err());
}

#[test]
fn test_world_transform_rotates_then_offsets() {
    let (_, sheet) = example_specs();
    // The near corner of the unrotated sheet, (0, -4), swings onto the
    // diagonal and then shifts by the offset.
    let p = world_transform(&sheet).transform_point(Point3::new(0.0, -4.0, 0.0));
    let s = 4.0 * (2.0f64).sqrt() / 2.0;
    assert!((p.x - (s - 1.0)).abs() < 1e-12);
    assert!((p.y - (-s - 1.0)).abs() < 1e-12);
    assert!(p.z.abs() < 1e-12);
}

#[test]
fn test_tessellation_grid() {
    let (_, mut sheet) = example_specs();
    sheet.cuts = 3;
    sheet.rotation_deg = 0.0;
    sheet.offset_x = 0.0;
    sheet.offset_y = 0.0;
    let mesh = Sheet::tessellate(&sheet);
    assert_eq!(mesh.num_verts(), 25);
    // Row-major: first vertex at the (-S/2, -S/2) corner, last at (S/2, S/2)
    assert_eq!(mesh.verts[0], Point3::new(-4.0, -4.0, 0.0));
    assert_eq!(mesh.verts[24], Point3::new(4.0, 4.0, 0.0));
    assert_eq!(mesh.verts[1], Point3::new(-2.0, -4.0, 0.0));
    assert_eq!(mesh.verts[5], Point3::new(-4.0, -2.0, 0.0));
}
