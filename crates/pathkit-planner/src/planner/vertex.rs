//! Flat vertex buffer for GPU upload
//!
//! Every vertex is four floats: position followed by the speed tag ordinal.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use pathkit_settings::AxisConvention;
use serde::Serialize;

use super::{Accumulator, Bounds};

/// Floats per vertex
pub const VERTEX_STRIDE: usize = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize)]
pub struct Vertex {
    pub position: [f32; 3],
    /// 0 for rapid travel, 1 for feed motion
    pub speed_tag: f32,
}

/// Map a machine point into the renderer's coordinate convention
#[inline]
pub fn remap(point: Vec3, convention: AxisConvention) -> Vec3 {
    match convention {
        AxisConvention::ZUp => point,
        AxisConvention::YUp => Vec3::new(point.x, point.z, -point.y),
    }
}

/// Renderer-ready vertices with their bounds, both in renderer coordinates
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VertexData {
    pub vertices: Vec<Vertex>,
    pub bounds: Bounds,
}

impl VertexData {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `[x, y, z, tag, x, y, z, tag, ...]`
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Concatenate the closed runs of `accumulator` into one buffer
pub fn build_vertex_data(accumulator: &Accumulator, convention: AxisConvention) -> VertexData {
    let mut bounds = Bounds::new();
    let vertices = accumulator
        .vertices()
        .map(|(point, speed_tag)| {
            let point = remap(point, convention);
            bounds.update_point(point);
            Vertex {
                position: point.to_array(),
                speed_tag: speed_tag.ordinal() as f32,
            }
        })
        .collect();

    VertexData { vertices, bounds }
}
