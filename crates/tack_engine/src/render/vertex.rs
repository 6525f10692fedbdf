//! Quad vertex layout and corner generation
//!
//! Every 2D draw is a single quad: four interleaved vertices
//! (position×3, colour×3, texcoord×2) drawn with the fixed index list
//! [`QUAD_INDICES`].

use crate::foundation::math::{
    quad_corners, rotate_about, ui_to_ndc, world_to_ndc, Colour4, ScreenSize, UiRect, Vec2,
};
use bytemuck::{Pod, Zeroable};

/// Triangulation shared by every quad: `{0,1,3, 1,2,3}`
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Texture coordinates in corner order (TR, BR, BL, TL)
pub const QUAD_TEX_COORDS: [[f32; 2]; 4] = [[1.0, 1.0], [1.0, 0.0], [0.0, 0.0], [0.0, 1.0]];

/// Depth written into every vertex
pub const QUAD_DEPTH: f32 = 1.0;

/// Interleaved vertex uploaded for every quad corner
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    /// NDC position, z fixed at [`QUAD_DEPTH`]
    pub position: [f32; 3],
    /// RGB colour normalized to `0..=1`
    pub colour: [f32; 3],
    /// Texture coordinate
    pub tex_coord: [f32; 2],
}

impl QuadVertex {
    /// Size of one vertex in bytes
    pub const SIZE: usize = std::mem::size_of::<Self>();
}

fn assemble(corners: [Vec2; 4], colour: Colour4) -> [QuadVertex; 4] {
    let rgb = colour.to_rgb_f32();
    let mut vertices = [QuadVertex::zeroed(); 4];
    for ((vertex, corner), tex_coord) in vertices.iter_mut().zip(corners).zip(QUAD_TEX_COORDS) {
        *vertex = QuadVertex {
            position: [corner.x, corner.y, QUAD_DEPTH],
            colour: rgb,
            tex_coord,
        };
    }
    vertices
}

/// Vertices of a world-space quad
///
/// Corners are rotated about `position` by `rotation` degrees, then
/// converted to NDC relative to the camera.
pub fn world_quad(
    position: Vec2,
    scale: Vec2,
    rotation: f32,
    camera: Vec2,
    screen: ScreenSize,
    colour: Colour4,
) -> [QuadVertex; 4] {
    let corners = quad_corners(position, scale)
        .map(|corner| rotate_about(corner, position, rotation))
        .map(|corner| world_to_ndc(corner, camera, screen));
    assemble(corners, colour)
}

/// Vertices of a GUI-space rectangle
pub fn ui_quad(rect: UiRect, screen: ScreenSize, colour: Colour4) -> [QuadVertex; 4] {
    assemble(rect.corners().map(|corner| ui_to_ndc(corner, screen)), colour)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_vertex_layout_is_interleaved() {
        assert_eq!(QuadVertex::SIZE, 8 * std::mem::size_of::<f32>());
        let vertex = QuadVertex {
            position: [1.0, 2.0, 3.0],
            colour: [4.0, 5.0, 6.0],
            tex_coord: [7.0, 8.0],
        };
        let floats: &[f32] = bytemuck::cast_slice(std::slice::from_ref(&vertex));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_zero_rotation_matches_axis_aligned_corners() {
        let screen = ScreenSize::new(200.0, 100.0);
        let vertices = world_quad(
            Vec2::new(10.0, -5.0),
            Vec2::new(4.0, 2.0),
            0.0,
            Vec2::zeros(),
            screen,
            Colour4::WHITE,
        );
        let expected = quad_corners(Vec2::new(10.0, -5.0), Vec2::new(4.0, 2.0))
            .map(|corner| world_to_ndc(corner, Vec2::zeros(), screen));
        for (vertex, corner) in vertices.iter().zip(expected) {
            assert_eq!(vertex.position, [corner.x, corner.y, QUAD_DEPTH]);
        }
    }

    #[test]
    fn test_full_screen_quad_at_camera_spans_clip_space() {
        let screen = ScreenSize::new(800.0, 600.0);
        let camera = Vec2::new(37.0, -12.0);
        let vertices = world_quad(camera, Vec2::new(800.0, 600.0), 0.0, camera, screen, Colour4::RED);

        let expected = [[1.0, 1.0], [1.0, -1.0], [-1.0, -1.0], [-1.0, 1.0]];
        for (vertex, [x, y]) in vertices.iter().zip(expected) {
            assert_relative_eq!(vertex.position[0], x);
            assert_relative_eq!(vertex.position[1], y);
            assert_relative_eq!(vertex.position[2], 1.0);
            assert_eq!(vertex.colour, [1.0, 0.0, 0.0]);
        }
    }

    #[test]
    fn test_quarter_turn_rotates_corners() {
        let screen = ScreenSize::new(2.0, 2.0);
        let vertices = world_quad(Vec2::zeros(), Vec2::new(2.0, 2.0), 90.0, Vec2::zeros(), screen, Colour4::WHITE);
        // Top-right (1,1) lands at (1,-1) under the clockwise convention.
        assert_relative_eq!(vertices[0].position[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(vertices[0].position[1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_ui_quad_flips_y() {
        let screen = ScreenSize::new(100.0, 100.0);
        let vertices = ui_quad(UiRect::new(0.0, 0.0, 50.0, 50.0), screen, Colour4::WHITE);
        // Top-right corner of the top-left quarter.
        assert_relative_eq!(vertices[0].position[0], 0.0);
        assert_relative_eq!(vertices[0].position[1], 1.0);
        // Bottom-left corner.
        assert_relative_eq!(vertices[2].position[0], -1.0);
        assert_relative_eq!(vertices[2].position[1], 0.0);
        assert_eq!(vertices[3].tex_coord, [0.0, 1.0]);
    }
}
