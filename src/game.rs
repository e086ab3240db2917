use crate::config::{MoveConfig, RenderConfig};
use crate::map::Grid;
use crate::ray;
use crate::scene::SceneRenderer;
use crate::sprite::{self, Entity, EntityKind};
use crate::target::Target;
use crate::texture::{Rgb, TextureStore};
use glam::{Vec2, Vec3};
use std::time::{Duration, Instant};

pub const SPAWN: Vec2 = Vec2::new(200., 400.);
pub const SPAWN_HEADING: f32 = 90.;

/// material ids of the bundled textures
pub const WALL_MATERIAL: usize = 0;
pub const SKULL_MATERIAL: usize = 1;

const CROSSHAIR_INNER: usize = 2;
const CROSSHAIR_OUTER: usize = 6;

/// wrap an angle in degrees into `[0, 360)`
pub fn normalize_degrees(angle: f32) -> f32 {
    let angle = angle.rem_euclid(360.);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if angle >= 360. {
        0.
    } else {
        angle
    }
}

/// Player viewpoint: world position plus heading in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub pos: Vec2,
    heading: f32,
}

impl Camera {
    pub fn new(pos: Vec2, heading: f32) -> Self {
        Self {
            pos,
            heading: normalize_degrees(heading),
        }
    }

    /// degrees in `[0, 360)`
    pub fn heading(&self) -> f32 {
        self.heading
    }

    pub fn set_heading(&mut self, heading: f32) {
        self.heading = normalize_degrees(heading);
    }

    pub fn turn(&mut self, delta: f32) {
        self.set_heading(self.heading + delta);
    }

    /// unit vector along the heading
    pub fn forward(&self) -> Vec2 {
        ray::direction(self.heading.to_radians())
    }
}

/// Input signals sampled once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub forward: bool,
    pub backward: bool,
    /// horizontal pointer motion since the last frame
    pub look: i32,
}

/// Everything the renderer reads: the grid, the camera and the entities.
#[derive(Clone, Debug)]
pub struct World {
    pub grid: Grid,
    pub camera: Camera,
    pub entities: Vec<Entity>,
}

impl Default for World {
    fn default() -> Self {
        Self {
            grid: Grid::default(),
            camera: Camera::new(SPAWN, SPAWN_HEADING),
            entities: vec![Entity::new(
                EntityKind::Skull,
                Vec3::new(250., 400., 15.),
                SKULL_MATERIAL,
            )],
        }
    }
}

impl World {
    /// Apply one frame of input; `dt` is in milliseconds.
    pub fn update(&mut self, input: &Input, dt: f32, config: &MoveConfig) {
        self.look(input.look, dt, config);

        let sign = input.forward as i8 - input.backward as i8;
        if sign != 0 {
            self.advance(sign as f32, dt, config);
        }
    }

    /// Turn by pointer motion. Any motion turns at least one degree; moving
    /// right turns clockwise.
    pub fn look(&mut self, dx: i32, dt: f32, config: &MoveConfig) {
        if dx == 0 {
            return;
        }

        let raw = (dx as f32 / 25. * config.sensitivity * dt) as i32;
        let degrees = if dx > 0 { raw.max(1) } else { raw.min(-1) };
        self.camera.turn(-degrees as f32);
    }

    /// Move along the heading (`sign = 1`) or against it (`sign = -1`). Each
    /// axis is checked separately so the player slides along walls.
    fn advance(&mut self, sign: f32, dt: f32, config: &MoveConfig) {
        let step = self.camera.forward() * config.speed * dt * sign;
        let ahead = Vec2::new(
            config.look_ahead.copysign(step.x),
            config.look_ahead.copysign(step.y),
        );
        let pos = self.camera.pos;

        if self.grid.is_open(Vec2::new(pos.x + ahead.x, pos.y)) {
            self.camera.pos.x += step.x;
        }
        if self.grid.is_open(Vec2::new(pos.x, pos.y + ahead.y)) {
            self.camera.pos.y += step.y;
        }
    }
}

/// Wall-clock delta between frames, plus a running frames-per-second figure.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last: Instant,
    window: Instant,
    frames: u32,
    fps: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::starting_at(Instant::now())
    }
}

impl FrameClock {
    pub fn starting_at(now: Instant) -> Self {
        Self {
            last: now,
            window: now,
            frames: 0,
            fps: 0.,
        }
    }

    /// milliseconds since the previous tick
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = now.saturating_duration_since(self.last);
        self.last = now;
        self.frames += 1;

        let elapsed = now.saturating_duration_since(self.window);
        if elapsed >= Duration::from_secs(1) {
            self.fps = self.frames as f32 / elapsed.as_secs_f32();
            log::debug!("fps: {:.1}", self.fps);
            self.frames = 0;
            self.window = now;
        }

        dt.as_secs_f32() * 1000.
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// text for the on-screen frame-rate overlay
    pub fn label(&self) -> String {
        format!("FPS: {:.0}", self.fps)
    }
}

/// Runs one frame at a time: update, then clear, background, walls, sprites
/// and overlay. Presenting the target is left to the caller.
#[derive(Debug)]
pub struct Frame {
    config: RenderConfig,
    scene: SceneRenderer,
    clock: FrameClock,
}

impl Frame {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            scene: SceneRenderer::new(config.width),
            config,
            clock: FrameClock::default(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Advance the world by the time since the previous frame; returns the
    /// step in milliseconds.
    pub fn update(&mut self, world: &mut World, input: &Input, moves: &MoveConfig) -> f32 {
        let dt = self.clock.tick();
        world.update(input, dt, moves);
        dt
    }

    /// Draw the world into `target`; returns the number of sprite texels drawn.
    pub fn render<T: Target>(&mut self, target: &mut T, world: &World, textures: &TextureStore) -> usize {
        let config = &self.config;
        let (width, height) = target.size();
        let horizon = height / 2;

        target.clear(Rgb::BLACK);
        target.fill_rect(0, 0, width, horizon, config.ceiling);
        target.fill_rect(0, horizon, width, height - horizon, config.floor);

        // sprites need the finished wall depths, so the wall pass goes first
        let depths = self
            .scene
            .render(target, &world.camera, &world.grid, textures, config);
        let drawn = sprite::draw_sprites(
            target,
            &world.entities,
            &world.camera,
            depths,
            textures,
            config,
        );

        if config.crosshair {
            draw_crosshair(target);
        }

        drawn
    }
}

fn draw_crosshair<T: Target>(target: &mut T) {
    let (width, height) = target.size();
    let (cx, cy) = (width / 2, height / 2);
    if cx < CROSSHAIR_OUTER || cy < CROSSHAIR_OUTER {
        return;
    }

    let len = CROSSHAIR_OUTER - CROSSHAIR_INNER;
    let far = CROSSHAIR_INNER + 1;
    target.fill_rect(cx - CROSSHAIR_OUTER, cy, len, 1, Rgb::WHITE);
    target.fill_rect(cx + far, cy, len, 1, Rgb::WHITE);
    target.fill_rect(cx, cy - CROSSHAIR_OUTER, 1, len, Rgb::WHITE);
    target.fill_rect(cx, cy + far, 1, len, Rgb::WHITE);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{DrawCmd, DrawList, FrameBuffer};
    use crate::texture::Texture;

    const RED: Rgb = Rgb::new(200, 0, 0);

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn store() -> TextureStore {
        let mut store = TextureStore::new(8);
        store.push(Texture::solid(8, Rgb::WHITE)).unwrap();
        store.push(Texture::solid(8, RED)).unwrap();
        store
    }

    #[test]
    fn headings_wrap_into_range() {
        assert!(close(normalize_degrees(-10.), 350.));
        assert_eq!(normalize_degrees(360.), 0.);
        assert!(close(normalize_degrees(725.), 5.));
        assert!(normalize_degrees(-1e-9) < 360.);

        let mut camera = Camera::new(SPAWN, 355.);
        camera.turn(10.);
        assert!(close(camera.heading(), 5.));
    }

    #[test]
    fn forward_moves_along_heading() {
        let mut world = World::default();
        world.camera.set_heading(0.);
        let input = Input {
            forward: true,
            ..Default::default()
        };
        world.update(&input, 100., &MoveConfig::default());
        assert!(close(world.camera.pos.x, 220.));
        assert!(close(world.camera.pos.y, 400.));

        let back = Input {
            backward: true,
            ..Default::default()
        };
        world.update(&back, 50., &MoveConfig::default());
        assert!(close(world.camera.pos.x, 210.));
    }

    #[test]
    fn heading_ninety_walks_towards_row_zero() {
        let mut world = World::default();
        let input = Input {
            forward: true,
            ..Default::default()
        };
        world.update(&input, 10., &MoveConfig::default());
        assert!(close(world.camera.pos.y, 398.));
    }

    #[test]
    fn walls_block_and_slide() {
        let mut world = World::default();
        let input = Input {
            forward: true,
            ..Default::default()
        };

        world.camera = Camera::new(Vec2::new(70., 400.), 180.);
        world.update(&input, 50., &MoveConfig::default());
        assert!(close(world.camera.pos.x, 70.));

        // diagonal into the left wall keeps the vertical part
        world.camera = Camera::new(Vec2::new(70., 400.), 135.);
        world.update(&input, 50., &MoveConfig::default());
        assert!(close(world.camera.pos.x, 70.));
        assert!(world.camera.pos.y < 400.);
    }

    #[test]
    fn pointer_motion_turns_at_least_one_degree() {
        let config = MoveConfig::default();
        let mut world = World::default();

        world.look(10, 16., &config);
        assert!(close(world.camera.heading(), 89.));

        // -100 / 25 * 0.2 * 52 = -41.6
        world.look(-100, 52., &config);
        assert!(close(world.camera.heading(), 130.));

        world.look(0, 50., &config);
        assert!(close(world.camera.heading(), 130.));
    }

    #[test]
    fn clock_reports_milliseconds_and_fps() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        assert!(close(clock.tick_at(start + Duration::from_millis(16)), 16.));
        for i in 2..=60 {
            clock.tick_at(start + Duration::from_millis(16 * i));
        }
        assert_eq!(clock.fps(), 0.);
        assert_eq!(clock.label(), "FPS: 0");
        clock.tick_at(start + Duration::from_millis(1000));
        assert!(clock.fps() > 55. && clock.fps() < 65.);
        assert_eq!(clock.label(), "FPS: 61");
    }

    #[test]
    fn frame_layers_background_walls_sprites_and_crosshair() {
        let mut world = World::default();
        world.camera.set_heading(0.);
        let config = RenderConfig::default();
        let mut frame = Frame::new(config.clone());
        let mut fb = FrameBuffer::new(config.width, config.height);

        // skull 50 units dead ahead
        let drawn = frame.render(&mut fb, &world, &store());
        assert!(drawn > 0);
        assert_eq!(fb.pixel(150, 120), Some(RED));
        assert_eq!(fb.pixel(0, config.height - 1), Some(config.floor));
        assert_eq!(fb.pixel(0, 0), Some(config.ceiling));
        assert_eq!(fb.pixel(160 - 4, 100), Some(Rgb::WHITE));
        assert_eq!(fb.pixel(160, 100), Some(RED));
    }

    #[test]
    fn same_frame_through_draw_calls() {
        let world = World::default();
        let config = RenderConfig {
            width: 40,
            height: 30,
            crosshair: false,
            ..Default::default()
        };
        let mut frame = Frame::new(config.clone());
        assert_eq!(frame.config(), &config);
        let mut list = DrawList::new(config.width, config.height);
        let mut fb = FrameBuffer::new(config.width, config.height);

        frame.render(&mut list, &world, &store());
        frame.render(&mut fb, &world, &store());

        let mut replay = FrameBuffer::new(config.width, config.height);
        for cmd in list.drain() {
            match cmd {
                DrawCmd::Point { x, y, color } => replay.plot(x, y, color),
                DrawCmd::Rect { x, y, w, h, color } => replay.fill_rect(x, y, w, h, color),
            }
        }
        assert_eq!(replay, fb);
    }
}
