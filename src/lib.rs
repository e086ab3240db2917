//! Tile-grid raycaster: one ray per screen column against a grid of walls,
//! textured strips with two-level shading, and depth-tested billboard sprites.

pub mod config;
pub mod game;
pub mod map;
pub mod ray;
pub mod scene;
pub mod sprite;
pub mod target;
pub mod texture;

pub use config::{MoveConfig, RenderConfig};
pub use game::{Camera, Frame, FrameClock, Input, World};
pub use map::{Grid, TILE_SIZE};
pub use ray::{cast, Family, RayCast, RayHit};
pub use scene::{SceneRenderer, WallDepths};
pub use sprite::{Entity, EntityKind};
pub use target::{DrawCmd, DrawList, FrameBuffer, Target};
pub use texture::{Rgb, Texture, TextureError, TextureStore};
