use crate::map::{Grid, TILE_SIZE};
use glam::Vec2;

/// Components of a ray direction closer to zero than this are treated as
/// axis-aligned: the ray never crosses that family of grid lines.
pub const AXIS_EPSILON: f32 = 1e-6;

/// Which family of grid lines the ray crossed when it hit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Family {
    /// crossing of a line `x = k * TILE_SIZE`
    Vertical,
    /// crossing of a line `y = k * TILE_SIZE`
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// hit point projected onto the unit ray direction
    pub distance: f32,
    /// world position of the hit on the grid line
    pub point: Vec2,
    pub material: usize,
    pub family: Family,
}

/// Result of tracing one ray. `hit` is `None` when neither march found a wall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayCast {
    /// radians
    pub angle: f32,
    pub hit: Option<RayHit>,
}

impl RayCast {
    pub fn distance(&self) -> f32 {
        self.hit.map_or(f32::INFINITY, |hit| hit.distance)
    }
}

/// Unit direction of a ray at `theta` radians. World y grows downwards, so
/// 90 degrees points towards row 0.
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), -theta.sin())
}

/// Trace a ray from `origin` and return the nearer of the two grid-line hits.
pub fn cast(grid: &Grid, origin: Vec2, theta: f32) -> RayCast {
    let dir = direction(theta);
    let vertical = march(grid, origin, dir, Family::Vertical);
    let horizontal = march(grid, origin, dir, Family::Horizontal);

    let hit = match (vertical, horizontal) {
        (Some(v), Some(h)) => Some(if v.distance < h.distance { v } else { h }),
        (Some(hit), None) | (None, Some(hit)) => Some(hit),
        (None, None) => None,
    };

    RayCast { angle: theta, hit }
}

/// Step along successive lines of one family until an occupied cell turns up
/// or `grid.max_steps()` lines have been crossed.
fn march(grid: &Grid, origin: Vec2, dir: Vec2, family: Family) -> Option<RayHit> {
    // swap axes so the march always steps along `a` and slides along `b`
    let (o_a, o_b, d_a, d_b) = match family {
        Family::Vertical => (origin.x, origin.y, dir.x, dir.y),
        Family::Horizontal => (origin.y, origin.x, dir.y, dir.x),
    };

    // parallel to this family, will never cross
    if d_a.abs() <= AXIS_EPSILON {
        return None;
    }

    let slope = d_b / d_a;
    let start = (o_a / TILE_SIZE).floor() as i32;
    // crossing a line towards negative `a` enters the cell before it
    let (mut line, step, behind) = if d_a > 0. {
        (start + 1, 1, 0)
    } else {
        (start, -1, -1)
    };

    for _ in 0..grid.max_steps() {
        let a = line as f32 * TILE_SIZE;
        let b = o_b + (a - o_a) * slope;
        let lane = (b / TILE_SIZE).floor() as i32;

        let (col, row, point) = match family {
            Family::Vertical => (line + behind, lane, Vec2::new(a, b)),
            Family::Horizontal => (lane, line + behind, Vec2::new(b, a)),
        };

        if let Some(material) = grid.material(col, row) {
            return Some(RayHit {
                distance: (point - origin).dot(dir),
                point,
                material,
                family,
            });
        }

        line += step;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROOM: Vec2 = Vec2::new(200., 400.);

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn distance_is_projection_onto_ray() {
        let grid = Grid::default();
        let mut angle = 0.5_f32;
        while angle < 360. {
            let theta = angle.to_radians();
            let ray = cast(&grid, ROOM, theta);
            let hit = ray.hit.expect("bordered grid always hits");
            let expected = (hit.point - ROOM).dot(direction(theta));
            assert!(close(hit.distance, expected), "angle {angle}");
            assert!(hit.distance > 0.);
            angle += 7.25;
        }
    }

    #[test]
    fn straight_rays_measure_wall_distance() {
        // 10x10 interior of a 12x12 grid, walls at 64 and 704
        let grid = Grid::default();
        let centre = Vec2::splat(384.);

        for (deg, expected) in [(0., 320.), (90., 320.), (180., 320.), (270., 320.)] {
            let ray = cast(&grid, centre, (deg as f32).to_radians());
            assert!(close(ray.distance(), expected), "{deg}: {}", ray.distance());
        }

        let up = cast(&grid, ROOM, 90_f32.to_radians());
        assert!(close(up.distance(), 400. - TILE_SIZE));
        let right = cast(&grid, ROOM, 0.);
        assert!(close(right.distance(), 11. * TILE_SIZE - 200.));
    }

    #[test]
    fn axis_aligned_ray_falls_back_to_other_family() {
        let grid = Grid::default();
        let hit = cast(&grid, ROOM, 0.).hit.unwrap();
        assert_eq!(hit.family, Family::Vertical);
        assert!(hit.distance.is_finite());
        assert_eq!(hit.material, 0);

        let hit = cast(&grid, ROOM, 90_f32.to_radians()).hit.unwrap();
        assert_eq!(hit.family, Family::Horizontal);
        assert!(close(hit.point.y, TILE_SIZE));
    }

    #[test]
    fn material_comes_from_hit_cell() {
        let mut rows = vec![vec![1u32; 5]];
        rows.extend((0..3).map(|_| vec![1, 0, 0, 4, 1]));
        rows.push(vec![1; 5]);
        let grid = Grid::from_rows(&rows).unwrap();

        let hit = cast(&grid, Vec2::new(96., 160.), 0.).hit.unwrap();
        assert_eq!(hit.material, 3);
        assert!(close(hit.distance, 192. - 96.));
    }

    #[test]
    fn leftward_rays_hit_the_cell_behind_the_line() {
        let grid = Grid::default();
        let hit = cast(&grid, ROOM, 180_f32.to_radians()).hit.unwrap();
        assert!(close(hit.point.x, TILE_SIZE));
        assert!(close(hit.distance, 200. - TILE_SIZE));
    }

    #[test]
    fn borderless_grid_reports_no_hit() {
        let grid = Grid::from_rows(&[[0u32; 4]; 4]).unwrap();
        let ray = cast(&grid, Vec2::splat(128.), 0.3);
        assert!(ray.hit.is_none());
        assert_eq!(ray.distance(), f32::INFINITY);
    }

    #[test]
    fn origin_outside_grid_never_panics() {
        let grid = Grid::bordered(3, 3);
        let ray = cast(&grid, Vec2::new(-1000., 5000.), 1.0);
        assert!(ray.hit.is_none() || ray.distance() > 0.);
    }
}
