//! Quad renderer component

use crate::foundation::math::Colour4;
use crate::objects::{Capabilities, ObjectState, TackComponent};
use crate::render::{Sprite, SpriteSheet, TackRenderer, WorldQuad};
use std::time::Instant;

/// What a [`QuadRenderer`] draws
#[derive(Debug, Clone)]
pub enum RenderMode {
    /// Flat colour through the white texture
    Colour,
    /// A static sprite
    Sprite(Sprite),
    /// An animated sprite sheet
    SpriteSheet(SpriteSheet),
}

/// Draws the owning object as a single textured quad
#[derive(Debug, Clone)]
pub struct QuadRenderer {
    /// Texture source
    pub mode: RenderMode,
    /// Vertex colour; a tint for sprite modes
    pub colour: Colour4,
    /// Draw order, lower layers first
    pub layer: i32,
    /// Inactive renderers draw nothing
    pub active: bool,
}

impl QuadRenderer {
    /// Flat-colour renderer
    pub fn colour(colour: Colour4) -> Self {
        Self {
            mode: RenderMode::Colour,
            colour,
            layer: 0,
            active: true,
        }
    }

    /// Static sprite renderer
    pub fn sprite(sprite: Sprite) -> Self {
        Self {
            mode: RenderMode::Sprite(sprite),
            colour: Colour4::WHITE,
            layer: 0,
            active: true,
        }
    }

    /// Animated sprite sheet renderer
    pub fn sprite_sheet(sheet: SpriteSheet) -> Self {
        Self {
            mode: RenderMode::SpriteSheet(sheet),
            colour: Colour4::WHITE,
            layer: 0,
            active: true,
        }
    }

    /// Set the draw layer
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.layer = layer;
        self
    }

    /// Texture for the current frame
    pub fn current_sprite(&self) -> Sprite {
        match &self.mode {
            RenderMode::Colour => Sprite::INVALID,
            RenderMode::Sprite(sprite) => *sprite,
            RenderMode::SpriteSheet(sheet) => sheet.current_frame(),
        }
    }
}

impl TackComponent for QuadRenderer {
    fn capabilities(&self) -> Capabilities {
        Capabilities::RENDER
    }

    fn on_render(&mut self, state: &ObjectState, renderer: &mut TackRenderer) {
        if !self.active {
            return;
        }
        if let RenderMode::SpriteSheet(sheet) = &mut self.mode {
            sheet.advance(Instant::now());
        }
        renderer.submit(WorldQuad {
            position: state.position,
            scale: state.scale,
            rotation: state.rotation,
            colour: self.colour,
            sprite: self.current_sprite(),
            layer: self.layer,
        });
    }
}
