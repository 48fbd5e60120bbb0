use bytemuck::{Pod, Zeroable};
use glam::Mat4;

pub const SHADER_SOURCE: &str = include_str!("shader.wgsl");

/// Uniform block shared by both shader stages. Field order and padding must
/// match the WGSL `Uniforms` struct.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct Uniforms {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub model: [[f32; 4]; 4],
    pub point_size: f32,
    pub opacity: f32,
    pub time: f32,
    pub _padding: f32,
}

impl Uniforms {
    pub fn new(
        view: Mat4,
        proj: Mat4,
        model: Mat4,
        point_size: f32,
        opacity: f32,
        time: f32,
    ) -> Self {
        Self {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            point_size,
            opacity,
            time,
            _padding: 0.0,
        }
    }
}
