//! Heightfield to triangle mesh conversion.
//!
//! Every 2x2 block of cells becomes two triangles in `[-1, 1]` grid space
//! (Y up). A triangle survives only if all three corners lie strictly inside
//! the padded unit containment sphere, which leaves a ragged circular edge
//! instead of clipped geometry.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ensure_non_negative, Result, TerrainError};
use crate::sampling::ColorSampler;
use crate::spatial::Triangle;
use crate::tilemap::Heightfield;

/// Radius of the containment sphere for a padding percentage.
pub fn containment_radius(padding_percent: f32) -> f32 {
    1.0 + 0.01 * padding_percent
}

/// Strict containment test; a point exactly on the sphere is outside.
pub fn inside_containment(point: Vec3, radius: f32) -> bool {
    point.length() < radius
}

/// Vertex as uploaded for rendering: position plus one scalar payload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    /// Color channel or mean height delta, depending on [`VertexPayload`]
    pub payload: f32,
}

impl TerrainVertex {
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }
}

pub type TerrainTriangle = [TerrainVertex; 3];

/// What each vertex's payload carries.
#[derive(Clone, Copy)]
pub enum VertexPayload<'a> {
    /// Vertex `k` of a triangle carries channel `k` of the palette color
    /// sampled at that vertex's height.
    Palette(&'a dyn ColorSampler),
    /// All three vertices carry the quad's mean `post - pre` height delta.
    HeightDelta,
}

/// Meshing parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshParams {
    /// Containment sphere padding, in percent of the unit radius
    pub padding_percent: f32,
    /// Vertical scale applied to heights before the containment test
    pub height_scalar: f32,
    /// Keep square cells on non-square grids by shrinking the shorter axis
    pub aspect_correct: bool,
}

impl Default for MeshParams {
    fn default() -> Self {
        Self {
            padding_percent: 5.0,
            height_scalar: 0.25,
            aspect_correct: true,
        }
    }
}

impl MeshParams {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("mesh.padding_percent", self.padding_percent)?;
        ensure_finite("mesh.height_scalar", self.height_scalar)
    }
}

/// Triangles that passed containment, in row-major quad order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TerrainMesh {
    pub triangles: Vec<TerrainTriangle>,
    /// Mean `post - pre` height delta per triangle; empty without a snapshot.
    pub height_deltas: Vec<f32>,
}

impl TerrainMesh {
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions, for building a spatial index.
    pub fn positions(&self) -> Vec<Triangle> {
        self.triangles
            .iter()
            .map(|t| [t[0].position(), t[1].position(), t[2].position()])
            .collect()
    }

    /// Raw vertex bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.triangles)
    }
}

/// Maps grid indices to `[-1, 1]` (optionally aspect-corrected) world X/Z.
struct GridRemap {
    sx: f32,
    sz: f32,
    scale_x: f32,
    scale_z: f32,
}

impl GridRemap {
    fn new(width: usize, height: usize, aspect_correct: bool) -> Self {
        let span_x = (width.max(2) - 1) as f32;
        let span_z = (height.max(2) - 1) as f32;
        let (scale_x, scale_z) = if aspect_correct {
            let longest = span_x.max(span_z);
            (span_x / longest, span_z / longest)
        } else {
            (1.0, 1.0)
        };
        Self { sx: span_x, sz: span_z, scale_x, scale_z }
    }

    fn point(&self, x: usize, y: usize, h: f32) -> Vec3 {
        let wx = (2.0 * x as f32 / self.sx - 1.0) * self.scale_x;
        let wz = (2.0 * y as f32 / self.sz - 1.0) * self.scale_z;
        Vec3::new(wx, h, wz)
    }
}

/// Triangulate a heightfield under the containment constraint.
///
/// `pre_erosion` is the snapshot taken before erosion; when given, each
/// accepted triangle also gets its quad's mean height delta in
/// `height_deltas`. [`VertexPayload::HeightDelta`] requires it.
pub fn mesh_heightfield(
    heightfield: &Heightfield,
    pre_erosion: Option<&Heightfield>,
    params: &MeshParams,
    payload: VertexPayload<'_>,
) -> Result<TerrainMesh> {
    heightfield.validate()?;
    params.validate()?;

    if let Some(snapshot) = pre_erosion {
        if !snapshot.same_dimensions(heightfield) {
            return Err(TerrainError::DimensionMismatch {
                width: heightfield.width,
                height: heightfield.height,
                snapshot_width: snapshot.width,
                snapshot_height: snapshot.height,
            });
        }
    } else if matches!(payload, VertexPayload::HeightDelta) {
        return Err(TerrainError::MissingSnapshot);
    }

    let radius = containment_radius(params.padding_percent);
    let remap = GridRemap::new(heightfield.width, heightfield.height, params.aspect_correct);

    let rows: Vec<(Vec<TerrainTriangle>, Vec<f32>)> = (0..heightfield.height.saturating_sub(1))
        .into_par_iter()
        .map(|y| mesh_row(heightfield, pre_erosion, params, payload, &remap, radius, y))
        .collect();

    let mut mesh = TerrainMesh::default();
    for (triangles, deltas) in rows {
        mesh.triangles.extend(triangles);
        mesh.height_deltas.extend(deltas);
    }

    let candidates = 2 * heightfield.width.saturating_sub(1) * heightfield.height.saturating_sub(1);
    debug!(
        "Meshed {}x{} heightfield: kept {}/{} triangles (radius {:.3})",
        heightfield.width,
        heightfield.height,
        mesh.len(),
        candidates,
        radius,
    );

    Ok(mesh)
}

fn mesh_row(
    heightfield: &Heightfield,
    pre_erosion: Option<&Heightfield>,
    params: &MeshParams,
    payload: VertexPayload<'_>,
    remap: &GridRemap,
    radius: f32,
    y: usize,
) -> (Vec<TerrainTriangle>, Vec<f32>) {
    let mut triangles = Vec::new();
    let mut deltas = Vec::new();

    for x in 0..heightfield.width - 1 {
        // A--B
        // |  |
        // C--D
        let cells = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)];
        let raw = cells.map(|(cx, cy)| *heightfield.get(cx, cy));
        let corners: [Vec3; 4] = std::array::from_fn(|k| {
            remap.point(cells[k].0, cells[k].1, raw[k] * params.height_scalar)
        });

        let delta = pre_erosion.map(|before| {
            cells
                .iter()
                .zip(raw.iter())
                .map(|(&(cx, cy), &after)| after - *before.get(cx, cy))
                .sum::<f32>()
                / 4.0
        });

        for order in [[0, 3, 2], [0, 1, 3]] {
            if !order.iter().all(|&k| inside_containment(corners[k], radius)) {
                continue;
            }

            let vertex_payloads: [f32; 3] = match payload {
                VertexPayload::Palette(palette) => {
                    std::array::from_fn(|k| palette.sample(raw[order[k]])[k])
                }
                VertexPayload::HeightDelta => [delta.unwrap_or(0.0); 3],
            };

            triangles.push(std::array::from_fn(|k| TerrainVertex {
                position: corners[order[k]].to_array(),
                payload: vertex_payloads[k],
            }));
            if let Some(d) = delta {
                deltas.push(d);
            }
        }
    }

    (triangles, deltas)
}
