use crate::config::RenderConfig;
use crate::game::Camera;
use crate::map::{Grid, TILE_SIZE};
use crate::ray::{self, Family, RayCast, RayHit};
use crate::target::Target;
use crate::texture::{Texture, TextureStore};

/// Distances below this are projected as if they were this far away.
const NEAR: f32 = 1e-3;

/// Per-column wall distances of a finished wall pass.
///
/// Only [`SceneRenderer::render`] hands these out, so anything holding one is
/// reading depths written during the current frame.
#[derive(Clone, Copy, Debug)]
pub struct WallDepths<'a> {
    depths: &'a [f32],
}

impl<'a> WallDepths<'a> {
    /// corrected wall distance at `column`, `None` off screen
    pub fn at(&self, column: usize) -> Option<f32> {
        self.depths.get(column).copied()
    }

    pub fn len(&self) -> usize {
        self.depths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.depths.is_empty()
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.depths
    }
}

/// One textured wall column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Strip {
    /// first screen row
    pub top: usize,
    /// visible rows after clipping to the viewport
    pub rows: usize,
    pub tex_x: usize,
    /// texel row sampled at `top`
    pub tex_y: f32,
    /// texel rows advanced per screen row
    pub tex_step: f32,
    pub material: usize,
    pub shade: f32,
}

/// Casts the column rays and owns the depth buffer they fill.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    depths: Vec<f32>,
}

impl SceneRenderer {
    pub fn new(columns: usize) -> Self {
        Self {
            depths: vec![f32::INFINITY; columns],
        }
    }

    /// Draw every wall column and return the depths written on the way.
    pub fn render<T: Target>(
        &mut self,
        target: &mut T,
        camera: &Camera,
        grid: &Grid,
        textures: &TextureStore,
        config: &RenderConfig,
    ) -> WallDepths<'_> {
        let heading = camera.heading();
        self.depths.clear();
        self.depths.resize(config.width, f32::INFINITY);

        for (column, depth) in self.depths.iter_mut().enumerate() {
            let angle = ray_angle(heading, config, column);
            let cast = ray::cast(grid, camera.pos, angle.to_radians());
            *depth = corrected_distance(&cast, heading);

            let Some(strip) = wall_strip(&cast, heading, config, textures.size()) else {
                continue;
            };
            if let Some(texture) = textures.get(strip.material) {
                draw_strip(target, column, &strip, texture);
            }
        }

        WallDepths {
            depths: &self.depths,
        }
    }
}

/// Ray angle of a column in degrees; column 0 is the left edge of the view.
pub fn ray_angle(heading: f32, config: &RenderConfig, column: usize) -> f32 {
    heading + column_offset(config, column as f32)
}

/// Angle between a column's ray and the heading in degrees, positive towards
/// the left edge. Columns are spaced evenly in angle, not in tangent.
pub fn column_offset(config: &RenderConfig, column: f32) -> f32 {
    config.fov / 2. - column * config.column_step()
}

/// Inverse of [`column_offset`]: the fractional column whose ray leaves the
/// camera `offset` degrees off the heading.
pub fn offset_column(config: &RenderConfig, offset: f32) -> f32 {
    (config.fov / 2. - offset) / config.column_step()
}

/// Hit distance scaled by the cosine of the ray's offset from the heading,
/// `f32::INFINITY` when nothing was hit.
pub fn corrected_distance(cast: &RayCast, heading: f32) -> f32 {
    match cast.hit {
        Some(hit) => hit.distance * (heading.to_radians() - cast.angle).cos(),
        None => f32::INFINITY,
    }
}

/// Unclipped on-screen height of a wall at `distance`.
pub fn strip_height(projection: f32, distance: f32) -> f32 {
    if !distance.is_finite() {
        return 0.;
    }
    projection / distance.max(NEAR)
}

/// Horizontal texel of a hit, flipped when the camera looks at the wall from
/// the far side so both faces read the same way round.
pub fn texture_column(hit: &RayHit, heading: f32, size: usize) -> usize {
    let (along, mirrored) = match hit.family {
        Family::Vertical => (hit.point.y, heading > 90. && heading < 270.),
        Family::Horizontal => (hit.point.x, heading > 180.),
    };

    let frac = along.rem_euclid(TILE_SIZE) / TILE_SIZE;
    let tx = ((frac * size as f32) as usize).min(size.saturating_sub(1));

    if mirrored {
        size - 1 - tx
    } else {
        tx
    }
}

/// Work out the screen extent and texture mapping of one column.
pub fn wall_strip(
    cast: &RayCast,
    heading: f32,
    config: &RenderConfig,
    size: usize,
) -> Option<Strip> {
    let hit = cast.hit?;
    let distance = corrected_distance(cast, heading);
    let full = strip_height(config.projection(), distance);
    if size == 0 || full < 1. {
        return None;
    }

    let view = config.height as f32;
    let tex_step = size as f32 / full;
    // taller than the view: sample only the middle of the texture
    let (visible, skipped) = if full > view {
        (view, (full - view) / 2.)
    } else {
        (full, 0.)
    };

    let rows = (visible as usize).min(config.height);
    Some(Strip {
        top: (config.height - rows) / 2,
        rows,
        tex_x: texture_column(&hit, heading, size),
        tex_y: skipped * tex_step,
        tex_step,
        material: hit.material,
        shade: match hit.family {
            Family::Vertical => 1.,
            Family::Horizontal => config.shade,
        },
    })
}

fn draw_strip<T: Target>(target: &mut T, column: usize, strip: &Strip, texture: &Texture) {
    let last = texture.size().saturating_sub(1);
    let mut ty = strip.tex_y;

    for y in 0..strip.rows {
        let row = (ty as usize).min(last);
        if let Some(texel) = texture.texel(strip.tex_x, row) {
            target.plot(column, strip.top + y, texel.shade(strip.shade));
        }
        ty += strip.tex_step;
    }
}
