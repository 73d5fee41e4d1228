//! Drawing contract
//!
//! The simulation draws through `DrawContext` and looks sprites up through
//! `AssetProvider`. Both are traits so the browser canvas, the headless
//! demo and the tests can all sit behind them. Any sprite the provider
//! cannot supply is drawn as a flat rectangle in a colour derived from the
//! asset name, so the same missing sprite always looks the same.

use std::collections::HashMap;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::settings::Settings;
use crate::sim::aabb::Rect;
use crate::sim::state::{GamePhase, GameState, World};

/// RGBA, each channel in 0.0..=1.0
pub type Color = [f32; 4];

pub const BACKGROUND: Color = [0.08, 0.07, 0.12, 1.0];
pub const OUTLINE: Color = [0.0, 0.0, 0.0, 0.6];
pub const HUD_TEXT: Color = [1.0, 0.95, 0.8, 1.0];
pub const OVERLAY: Color = [0.0, 0.0, 0.0, 0.55];

/// A loaded sprite
#[derive(Debug, Clone, PartialEq)]
pub struct Drawable {
    pub name: String,
    /// Native size in pixels
    pub size: Vec2,
}

/// Sprite lookup by asset name
pub trait AssetProvider {
    fn get_asset(&self, name: &str) -> Option<Drawable>;
}

/// Provider with no sprites; everything draws as a placeholder
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetProvider for NoAssets {
    fn get_asset(&self, _name: &str) -> Option<Drawable> {
        None
    }
}

impl AssetProvider for HashMap<String, Drawable> {
    fn get_asset(&self, name: &str) -> Option<Drawable> {
        self.get(name).cloned()
    }
}

/// Drawing surface. Coordinates are screen space (camera already applied).
pub trait DrawContext {
    fn fill_rect(&mut self, rect: Rect, color: Color);
    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);
    fn draw_image(&mut self, image: &Drawable, rect: Rect);
    fn draw_text(&mut self, text: &str, pos: Vec2, color: Color);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Fill { rect: Rect, color: Color },
    Stroke { rect: Rect, color: Color, line_width: f32 },
    Image { name: String, rect: Rect },
    Text { text: String, pos: Vec2, color: Color },
}

/// Context that records calls instead of drawing (headless runs and tests)
#[derive(Debug, Clone, Default)]
pub struct RecordingContext {
    pub commands: Vec<DrawCommand>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Texts drawn since the last clear
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl DrawContext for RecordingContext {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::Fill { rect, color });
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::Stroke {
            rect,
            color,
            line_width,
        });
    }

    fn draw_image(&mut self, image: &Drawable, rect: Rect) {
        self.commands.push(DrawCommand::Image {
            name: image.name.clone(),
            rect,
        });
    }

    fn draw_text(&mut self, text: &str, pos: Vec2, color: Color) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            color,
        });
    }
}

/// Horizontal camera offset keeping the player centred, clamped to the level
pub fn camera_offset(player_center_x: f32, viewport_width: f32, level_width: f32) -> f32 {
    let max = (level_width - viewport_width).max(0.0);
    (player_center_x - viewport_width / 2.0).clamp(0.0, max)
}

/// FNV-1a, used to seed placeholder colours
fn name_hash(name: &str) -> u64 {
    name.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ b as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Deterministic fallback colour for a missing asset
pub fn placeholder_color(name: &str) -> Color {
    let mut rng = Pcg32::seed_from_u64(name_hash(name));
    [
        rng.random_range(0.25..0.95),
        rng.random_range(0.25..0.95),
        rng.random_range(0.25..0.95),
        1.0,
    ]
}

/// Draw the named sprite, or its placeholder when the provider lacks it
pub fn draw_sprite(ctx: &mut dyn DrawContext, assets: &dyn AssetProvider, name: &str, rect: Rect) {
    match assets.get_asset(name) {
        Some(image) => ctx.draw_image(&image, rect),
        None => {
            ctx.fill_rect(rect, placeholder_color(name));
            ctx.stroke_rect(rect, OUTLINE, 1.0);
        }
    }
}

/// Draw the level and player. Returns the camera offset used.
pub fn render_world(
    world: &World,
    ctx: &mut dyn DrawContext,
    assets: &dyn AssetProvider,
    viewport: Vec2,
    reduced_motion: bool,
) -> f32 {
    let camera_x = camera_offset(world.player.center().x, viewport.x, world.width);
    ctx.fill_rect(Rect::new(Vec2::ZERO, viewport), BACKGROUND);

    for entity in world.entities.iter() {
        let right = entity.pos.x + entity.size.x;
        if right < camera_x || entity.pos.x > camera_x + viewport.x {
            continue;
        }
        entity.render(ctx, camera_x, assets);
    }

    // Blink while invulnerable
    let player = &world.player;
    let hidden = player.is_invulnerable()
        && !reduced_motion
        && ((player.invuln_timer * 10.0) as u32) % 2 == 1;
    if !hidden {
        player.render(ctx, camera_x, assets);
    }

    camera_x
}

/// Draw a whole frame: world, HUD and phase overlay
pub fn render_frame(
    state: &GameState,
    ctx: &mut dyn DrawContext,
    assets: &dyn AssetProvider,
    settings: &Settings,
) -> f32 {
    let viewport = Vec2::new(settings.viewport_width, settings.viewport_height);
    let camera_x = render_world(&state.world, ctx, assets, viewport, settings.reduced_motion);

    if settings.show_hud {
        let player = state.player();
        let hud = format!(
            "Score {}   Lives {}   Gears {}/{}",
            player.score, player.lives, player.gears, state.world.required_gears
        );
        ctx.draw_text(&hud, Vec2::new(16.0, 28.0), HUD_TEXT);
    }

    let banner = match state.phase {
        GamePhase::Menu => Some("Press jump to start"),
        GamePhase::Paused => Some("Paused"),
        GamePhase::LevelComplete => Some("Level complete"),
        GamePhase::GameOver => Some("Game over"),
        GamePhase::Finished => Some("All levels cleared"),
        GamePhase::Playing => None,
    };
    if let Some(text) = banner {
        ctx.fill_rect(Rect::new(Vec2::ZERO, viewport), OVERLAY);
        ctx.draw_text(text, viewport * 0.5, HUD_TEXT);
    }

    camera_x
}
