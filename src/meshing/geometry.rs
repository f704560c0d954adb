//! Geometry data structures for voxel surface meshes.
//!
//! This module defines the vertex format and the flat vertex/index buffers
//! the mesh builder produces and a rendering collaborator uploads.

/// A vertex in a chunk surface mesh.
///
/// The layout is `#[repr(C)]` and `Pod` so a renderer can upload the vertex
/// buffer without any conversion pass.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes), world space
/// - Normal: [f32; 3] (12 bytes), outward unit normal
/// - Color: [f32; 3] (12 bytes), per-vertex tint
/// - Texture Coordinates: [f32; 2] (8 bytes), atlas coordinates
///
/// Total size: 44 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// World-space position of the vertex.
    pub position: [f32; 3],
    /// Outward unit normal of the face this vertex belongs to.
    pub normal: [f32; 3],
    /// Synthesized RGB tint.
    pub color: [f32; 3],
    /// Normalized texture-atlas coordinates.
    pub tex_coords: [f32; 2],
}

/// A flat vertex/index buffer pair for one chunk surface.
///
/// Indices describe counter-clockwise triangles over the vertex buffer, two
/// per quad face.
#[derive(Debug, Default)]
pub struct ChunkGeometry {
    /// The vertex data for this surface.
    pub vertices: Vec<Vertex>,
    /// The triangle index data for this surface.
    pub indices: Vec<u32>,
}

impl ChunkGeometry {
    /// Creates an empty geometry buffer with room for a typical chunk.
    pub fn new() -> Self {
        ChunkGeometry {
            vertices: Vec::with_capacity(1024),
            indices: Vec::with_capacity(1536),
        }
    }

    /// Whether the buffer holds no faces at all.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Appends one quad face as four vertices and two triangles.
    ///
    /// # Arguments
    /// * `corners` - The four corner positions in winding order
    /// * `normal` - The face normal, shared by all four vertices
    /// * `color` - The face tint, shared by all four vertices
    /// * `uvs` - Texture coordinates per corner, in the same order
    pub fn push_quad(
        &mut self,
        corners: [[f32; 3]; 4],
        normal: [f32; 3],
        color: [f32; 3],
        uvs: [[f32; 2]; 4],
    ) {
        let base = self.vertices.len() as u32;
        for (position, tex_coords) in corners.into_iter().zip(uvs) {
            self.vertices.push(Vertex {
                position,
                normal,
                color,
                tex_coords,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
}

/// The per-chunk meshing result: separate opaque and translucent surfaces.
///
/// Either buffer is absent when no face of that kind is visible, so a fully
/// buried or fully dry chunk costs nothing to carry around.
#[derive(Debug, Default)]
pub struct GeometrySet {
    /// The opaque surface geometry, if any face is visible.
    pub solid: Option<ChunkGeometry>,
    /// The translucent water geometry, if any face is visible.
    pub liquid: Option<ChunkGeometry>,
}
