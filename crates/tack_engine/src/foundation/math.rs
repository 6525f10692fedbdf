//! Math utilities and types
//!
//! Provides the 2D vector types used by the scene graph and the quad
//! renderer, plus the two coordinate conversions the renderer depends on:
//! world space to normalized device coordinates (NDC) and GUI pixel space to
//! NDC.
//!
//! # Coordinate spaces
//! - **World space**: arbitrary float units, Y up, relative to the main camera.
//! - **GUI space**: pixels, origin at the top-left corner of the window, Y down.
//! - **NDC**: `-1..1` on both axes, Y up.
//!
//! World and GUI space intentionally use opposite Y conventions. Both convert
//! with the halved-screen-dimension formula, only the sign of the Y term
//! differs.

use serde::{Deserialize, Serialize};

pub use nalgebra::Vector2;

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// Screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenSize {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl ScreenSize {
    /// Create a new screen size
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Half of the width, the NDC divisor on the X axis
    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    /// Half of the height, the NDC divisor on the Y axis
    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }
}

impl From<(u32, u32)> for ScreenSize {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Axis-aligned rectangle in GUI space (top-left origin, Y down, pixels)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UiRect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl UiRect {
    /// Create a new rectangle from its top-left corner and size
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether the point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Shrink the rectangle by `amount` on every side
    pub fn inset(&self, amount: f32) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            (self.width - amount * 2.0).max(0.0),
            (self.height - amount * 2.0).max(0.0),
        )
    }

    /// Corners in quad order: top-right, bottom-right, bottom-left, top-left
    pub fn corners(&self) -> [Vec2; 4] {
        let right = self.x + self.width;
        let bottom = self.y + self.height;
        [
            Vec2::new(right, self.y),
            Vec2::new(right, bottom),
            Vec2::new(self.x, bottom),
            Vec2::new(self.x, self.y),
        ]
    }
}

/// Corners of an axis-aligned quad centred on `position` with full extents `scale`
///
/// Order matches the fixed triangulation `{0,1,3, 1,2,3}`:
/// top-right, bottom-right, bottom-left, top-left (world space, Y up).
pub fn quad_corners(position: Vec2, scale: Vec2) -> [Vec2; 4] {
    let half_x = scale.x / 2.0;
    let half_y = scale.y / 2.0;
    [
        Vec2::new(position.x + half_x, position.y + half_y),
        Vec2::new(position.x + half_x, position.y - half_y),
        Vec2::new(position.x - half_x, position.y - half_y),
        Vec2::new(position.x - half_x, position.y + half_y),
    ]
}

/// Rotate `point` around `center` by `degrees`, clockwise raster convention
///
/// `x' = x0 + (x-x0)·cos(θ) + (y-y0)·sin(θ)`
/// `y' = y0 - (x-x0)·sin(θ) + (y-y0)·cos(θ)`
///
/// The sign on the Y term differs from the textbook counter-clockwise matrix.
/// Existing content is authored against this convention, keep it.
pub fn rotate_about(point: Vec2, center: Vec2, degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    Vec2::new(
        center.x + dx * cos + dy * sin,
        center.y - dx * sin + dy * cos,
    )
}

/// Convert a world-space point to NDC relative to the camera position
///
/// `ndc = (world - camera) / (screen / 2)`, Y up in both spaces.
pub fn world_to_ndc(point: Vec2, camera: Vec2, screen: ScreenSize) -> Vec2 {
    Vec2::new(
        (point.x - camera.x) / screen.half_width(),
        (point.y - camera.y) / screen.half_height(),
    )
}

/// Convert a GUI-space pixel to NDC
///
/// GUI space has its origin at the top-left and Y pointing down, so the Y
/// term is inverted relative to [`world_to_ndc`].
pub fn ui_to_ndc(point: Vec2, screen: ScreenSize) -> Vec2 {
    Vec2::new(
        (point.x - screen.half_width()) / screen.half_width(),
        (screen.half_height() - point.y) / screen.half_height(),
    )
}

/// RGBA colour with byte channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Colour4 {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Colour4 {
    /// Opaque white
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Opaque black
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque red
    pub const RED: Self = Self::rgb(255, 0, 0);
    /// Opaque green
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    /// Opaque blue
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a colour from all four channels
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque colour
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Create a colour from normalized channels
    ///
    /// Channels outside `0..=1` are clamped and logged.
    pub fn from_normalized(r: f32, g: f32, b: f32, a: f32) -> Self {
        let channel = |value: f32| {
            if !(0.0..=1.0).contains(&value) {
                log::warn!("Colour channel {} outside 0..1, clamping", value);
            }
            (value.clamp(0.0, 1.0) * 255.0).round() as u8
        };
        Self::new(channel(r), channel(g), channel(b), channel(a))
    }

    /// RGB channels normalized to `0..=1`, the vertex colour layout
    pub fn to_rgb_f32(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// All four channels normalized to `0..=1`
    pub fn to_rgba_f32(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }
}

impl Default for Colour4 {
    fn default() -> Self {
        Self::WHITE
    }
}
