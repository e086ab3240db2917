use glam::Vec2;

/// world units per grid cell
pub const TILE_SIZE: f32 = 64.;

pub const DEFAULT_WIDTH: usize = 12;
pub const DEFAULT_HEIGHT: usize = 12;

/// Row-major occupancy grid. `0` is empty, `n > 0` is a wall textured with
/// material `n - 1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u32>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::bordered(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl Grid {
    /// Solid border ring of material 0 around an empty interior.
    pub fn bordered(width: usize, height: usize) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut cells = Vec::with_capacity(width * height);

        for row in 0..height {
            for col in 0..width {
                let border = row == 0 || row == height - 1 || col == 0 || col == width - 1;
                cells.push(border as u32);
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Build a grid from explicit rows of cell values.
    pub fn from_rows<R: AsRef<[u32]>>(rows: &[R]) -> anyhow::Result<Self> {
        let width = match rows.first() {
            Some(row) => row.as_ref().len(),
            None => anyhow::bail!("grid has no rows"),
        };
        if width == 0 {
            anyhow::bail!("grid rows are empty");
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != width {
                anyhow::bail!("row {i} has {} cells, expected {width}", row.len());
            }
            cells.extend_from_slice(row);
        }

        log::debug!("built {width}x{} grid from rows", rows.len());

        Ok(Self {
            width,
            height: rows.len(),
            cells,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// upper bound on grid-line crossings a ray needs before it leaves the grid
    pub fn max_steps(&self) -> usize {
        self.width.max(self.height)
    }

    /// raw cell value by linear index
    pub fn cell(&self, idx: usize) -> Option<u32> {
        self.cells.get(idx).copied()
    }

    /// raw cell value by column and row; anything outside the grid is `None`
    pub fn get(&self, col: i32, row: i32) -> Option<u32> {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return None;
        }
        self.cell(row as usize * self.width + col as usize)
    }

    /// material of the wall at `(col, row)`, if there is one
    pub fn material(&self, col: i32, row: i32) -> Option<usize> {
        match self.get(col, row) {
            Some(n) if n > 0 => Some(n as usize - 1),
            _ => None,
        }
    }

    /// cell containing a world position
    pub fn cell_at(pos: Vec2) -> (i32, i32) {
        (
            (pos.x / TILE_SIZE).floor() as i32,
            (pos.y / TILE_SIZE).floor() as i32,
        )
    }

    /// true when the position lies in an empty cell inside the grid
    pub fn is_open(&self, pos: Vec2) -> bool {
        let (col, row) = Self::cell_at(pos);
        self.get(col, row) == Some(0)
    }
}
