use crate::map::TILE_SIZE;
use crate::texture::Rgb;

/// Product-tuning knobs for the renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// render columns, one ray each
    pub width: usize,
    /// render rows
    pub height: usize,
    /// horizontal field of view in degrees
    pub fov: f32,
    /// side of every square texture, in texels
    pub texture_size: usize,
    /// brightness of walls hit on a horizontal grid line
    pub shade: f32,
    /// sprite edge length in world units
    pub sprite_size: f32,
    /// sprite texel that is never drawn
    pub transparent: Rgb,
    pub ceiling: Rgb,
    pub floor: Rgb,
    pub crosshair: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 320,
            height: 200,
            fov: 60.,
            texture_size: 64,
            shade: 0.5,
            sprite_size: 32.,
            transparent: Rgb::MAGENTA,
            ceiling: Rgb::new(0, 0, 0),
            floor: Rgb::new(65, 60, 40),
            crosshair: true,
        }
    }
}

impl RenderConfig {
    /// angle between two neighbouring columns, in degrees
    pub fn column_step(&self) -> f32 {
        self.fov / self.width.max(1) as f32
    }

    /// numerator of `strip height = k / distance`
    pub fn projection(&self) -> f32 {
        TILE_SIZE * self.height as f32
    }

    pub fn horizon(&self) -> f32 {
        0.5 * self.height as f32
    }
}

/// Movement and look tuning for the player.
#[derive(Clone, Debug, PartialEq)]
pub struct MoveConfig {
    /// world units per millisecond
    pub speed: f32,
    /// how far ahead of the player the occupancy probe looks
    pub look_ahead: f32,
    /// pointer delta to degrees, per millisecond
    pub sensitivity: f32,
}

impl Default for MoveConfig {
    fn default() -> Self {
        Self {
            speed: 0.2,
            look_ahead: 10.,
            sensitivity: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_fills_view_one_tile_away() {
        let config = RenderConfig::default();
        assert_eq!(config.projection() / TILE_SIZE, config.height as f32);
        assert_eq!(config.horizon(), 100.);
    }

    #[test]
    fn column_step_spreads_fov_evenly() {
        let config = RenderConfig::default();
        assert!((config.column_step() * config.width as f32 - config.fov).abs() < 1e-4);
    }
}
