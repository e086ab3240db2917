use crate::config::RenderConfig;
use crate::game::Camera;
use crate::scene::{self, WallDepths};
use crate::target::Target;
use crate::texture::{Texture, TextureStore};
use glam::{Vec2, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Skull,
}

/// A billboard in the world. `pos.z` only shifts the sprite on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: Vec3,
    pub material: usize,
}

impl Entity {
    pub fn new(kind: EntityKind, pos: Vec3, material: usize) -> Self {
        Self {
            kind,
            pos,
            material,
        }
    }
}

/// Where and how large a sprite lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// camera-space depth along the heading
    pub depth: f32,
    /// camera-space offset to the right of the heading
    pub lateral: f32,
    /// fractional screen column of the sprite's centre line
    pub centre: f32,
    /// fractional columns of the left and right edges
    pub left: f32,
    pub right: f32,
    /// screen y of the sprite's bottom edge
    pub bottom: f32,
    /// height in pixels
    pub scale: f32,
}

/// Rotate a world point into camera space: `x` is lateral (positive to the
/// right of the view), `y` is depth along the heading.
pub fn to_camera(camera: &Camera, point: Vec2) -> Vec2 {
    let rel = point - camera.pos;
    let (s, c) = camera.heading().to_radians().sin_cos();
    Vec2::new(rel.x * s + rel.y * c, rel.x * c - rel.y * s)
}

/// Perspective-project an entity; `None` when it is at or behind the camera.
///
/// Columns come from the same angle mapping the wall rays use, so the depth
/// test at a column compares against the wall on that column's own ray.
pub fn project(entity: &Entity, camera: &Camera, config: &RenderConfig) -> Option<Projection> {
    let view = to_camera(camera, entity.pos.truncate());
    let (lateral, depth) = (view.x, view.y);
    if !(depth > 0.) || !depth.is_finite() {
        return None;
    }

    let rows = config.height as f32;
    let max_scale = (config.width.max(config.height) * 2) as f32;
    let half = 0.5 * config.sprite_size;
    let column = |x: f32| scene::offset_column(config, (-x).atan2(depth).to_degrees());

    Some(Projection {
        depth,
        lateral,
        centre: column(lateral),
        left: column(lateral - half),
        right: column(lateral + half),
        bottom: config.horizon() + entity.pos.z * rows / depth,
        scale: (config.sprite_size * rows / depth).min(max_scale),
    })
}

/// Draw every visible entity, far to near, behind nothing but nearer walls.
/// Returns the number of texels written.
pub fn draw_sprites<T: Target>(
    target: &mut T,
    entities: &[Entity],
    camera: &Camera,
    depths: WallDepths<'_>,
    textures: &TextureStore,
    config: &RenderConfig,
) -> usize {
    let mut visible: Vec<(Projection, usize)> = entities
        .iter()
        .filter_map(|e| project(e, camera, config).map(|p| (p, e.material)))
        .collect();
    visible.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

    visible
        .iter()
        .filter_map(|(p, material)| {
            let texture = textures.get(*material)?;
            Some(draw_sprite(target, p, texture, depths, config))
        })
        .sum()
}

fn draw_sprite<T: Target>(
    target: &mut T,
    p: &Projection,
    texture: &Texture,
    depths: WallDepths<'_>,
    config: &RenderConfig,
) -> usize {
    let world_size = config.sprite_size;
    if !(p.scale > 0.) || !(world_size > 0.) {
        return 0;
    }

    let (width, height) = target.size();
    let size = texture.size();
    let last = size.saturating_sub(1);
    let row_step = size as f32 / p.scale;
    let top = p.bottom - p.scale;
    let left_edge = p.lateral - 0.5 * world_size;

    let clamp = |v: f32, limit: usize| v.ceil().clamp(0., limit as f32) as usize;
    let columns = clamp(p.left, width)..clamp(p.right, width);
    // pixels whose centres fall inside the sprite
    let rows = clamp(top - 0.5, height)..clamp(p.bottom - 0.5, height);

    let mut drawn = 0;
    for x in columns {
        // a wall at or in front of the sprite hides this column
        if !depths.at(x).is_some_and(|wall| p.depth < wall) {
            continue;
        }

        // where this column's ray crosses the sprite plane
        let offset = scene::column_offset(config, x as f32).to_radians();
        let along = -p.depth * offset.tan() - left_edge;
        if !(0.0..world_size).contains(&along) {
            continue;
        }

        let tx = ((along / world_size * size as f32) as usize).min(last);
        for y in rows.clone() {
            let ty = (((y as f32 + 0.5 - top) * row_step) as usize).min(last);
            match texture.texel(tx, ty) {
                Some(texel) if texel != config.transparent => {
                    target.plot(x, y, texel);
                    drawn += 1;
                }
                _ => {}
            }
        }
    }

    drawn
}
