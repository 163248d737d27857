//! Triangle meshes and the OBJ loader.

use std::fs;
use std::path::Path;

use ember_math::{Aabb, Vec3};

use crate::{AssetError, AssetResult};

/// An indexed triangle mesh.
///
/// Positions are in world space (the loader applies origin and scale);
/// every 3 indices form one triangle.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
    pub bounds: Aabb,
}

impl Mesh {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let bounds = compute_bounds(&positions);
        Self {
            positions,
            indices,
            bounds,
        }
    }

    /// Load a mesh from an OBJ file, scaling every vertex by `scale` and
    /// then shifting it by `origin`.
    ///
    /// Only `v` and `f` records are honored; faces with more than three
    /// vertices are fanned into triangles.
    pub fn load_obj(path: impl AsRef<Path>, origin: Vec3, scale: f32) -> AssetResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let mesh = Self::parse_obj(&text, origin, scale)?;

        log::debug!(
            "loaded mesh {} ({} vertices, {} triangles)",
            path.display(),
            mesh.vertex_count(),
            mesh.triangle_count()
        );

        Ok(mesh)
    }

    /// Parse OBJ text. Split out from [`Mesh::load_obj`] so it can be
    /// exercised without touching the filesystem.
    pub fn parse_obj(text: &str, origin: Vec3, scale: f32) -> AssetResult<Self> {
        let mut positions: Vec<Vec3> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();

        for (line_no, line) in text.lines().enumerate() {
            let line_no = line_no + 1;
            let mut fields = line.split_whitespace();

            match fields.next() {
                Some("v") => {
                    let mut coord = |name: &str| -> AssetResult<f32> {
                        fields
                            .next()
                            .and_then(|s| s.parse().ok())
                            .ok_or_else(|| AssetError::MalformedMesh {
                                line: line_no,
                                reason: format!("vertex missing {name} coordinate"),
                            })
                    };
                    let x = coord("x")?;
                    let y = coord("y")?;
                    let z = coord("z")?;
                    positions.push(Vec3::new(x, y, z) * scale + origin);
                }
                Some("f") => {
                    let corners = fields
                        .map(|field| parse_face_index(field, positions.len(), line_no))
                        .collect::<AssetResult<Vec<u32>>>()?;
                    if corners.len() < 3 {
                        return Err(AssetError::MalformedMesh {
                            line: line_no,
                            reason: "face with fewer than 3 vertices".into(),
                        });
                    }
                    // Fan triangulation about the first corner.
                    for i in 1..corners.len() - 1 {
                        indices.push(corners[0]);
                        indices.push(corners[i]);
                        indices.push(corners[i + 1]);
                    }
                }
                _ => {} // comments, normals, uvs, groups
            }
        }

        Ok(Self::new(positions, indices))
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The three corner positions of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Vec3; 3] {
        let base = i * 3;
        [
            self.positions[self.indices[base] as usize],
            self.positions[self.indices[base + 1] as usize],
            self.positions[self.indices[base + 2] as usize],
        ]
    }
}

/// Parse one face corner (`7`, `7/2`, `7/2/3`, `7//3`) into a 0-based index.
fn parse_face_index(field: &str, vertex_count: usize, line_no: usize) -> AssetResult<u32> {
    let first = field.split('/').next().unwrap_or(field);
    let index: i64 = first.parse().map_err(|_| AssetError::MalformedMesh {
        line: line_no,
        reason: format!("bad face index {field:?}"),
    })?;

    // OBJ indices are 1-based; negative indices count from the end.
    let resolved = if index > 0 {
        index - 1
    } else {
        vertex_count as i64 + index
    };

    if resolved < 0 || resolved as usize >= vertex_count {
        return Err(AssetError::MalformedMesh {
            line: line_no,
            reason: format!("face index {index} out of range"),
        });
    }
    Ok(resolved as u32)
}

fn compute_bounds(positions: &[Vec3]) -> Aabb {
    if positions.is_empty() {
        return Aabb::EMPTY;
    }

    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in positions {
        min = min.min(*p);
        max = max.max(*p);
    }
    Aabb::from_points(min, max)
}
