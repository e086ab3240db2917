use crate::texture::Rgb;

/// Something the renderer can draw into, sized in render pixels. Walls and
/// sprites only ever talk to this trait; whether pixels end up in a composed
/// buffer or as a stream of draw calls is up to the implementation.
pub trait Target {
    fn size(&self) -> (usize, usize);

    /// Set one pixel. Out-of-range coordinates are ignored.
    fn plot(&mut self, x: usize, y: usize, color: Rgb);

    /// Fill a rectangle, clipped to the target.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb);

    fn clear(&mut self, color: Rgb) {
        let (w, h) = self.size();
        self.fill_rect(0, 0, w, h, color);
    }
}

/// Composed RGB24 frame, row-major, ready to be uploaded whole.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height * 3],
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// bytes per row
    pub fn pitch(&self) -> usize {
        self.width * 3
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y * self.width + x) * 3;
        Some(Rgb::new(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
        ))
    }

    /// all pixels in column `x`, top to bottom
    pub fn column(&self, x: usize) -> impl Iterator<Item = Rgb> + '_ {
        (0..self.height).filter_map(move |y| self.pixel(x, y))
    }
}

impl Target for FrameBuffer {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    fn plot(&mut self, x: usize, y: usize, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = (y * self.width + x) * 3;
        self.pixels[i] = color.r;
        self.pixels[i + 1] = color.g;
        self.pixels[i + 2] = color.b;
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        let x1 = (x + w).min(self.width);
        let y1 = (y + h).min(self.height);
        for row in y.min(y1)..y1 {
            for col in x.min(x1)..x1 {
                self.plot(col, row, color);
            }
        }
    }
}

/// One immediate-mode drawing instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawCmd {
    Point {
        x: usize,
        y: usize,
        color: Rgb,
    },
    Rect {
        x: usize,
        y: usize,
        w: usize,
        h: usize,
        color: Rgb,
    },
}

/// Records draw calls for a presenter that replays them one by one.
#[derive(Clone, Debug, Default)]
pub struct DrawList {
    width: usize,
    height: usize,
    cmds: Vec<DrawCmd>,
}

impl DrawList {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cmds: Vec::new(),
        }
    }

    /// Hand out the recorded frame and start an empty one.
    pub fn drain(&mut self) -> std::vec::Drain<'_, DrawCmd> {
        self.cmds.drain(..)
    }

    pub fn cmds(&self) -> &[DrawCmd] {
        &self.cmds
    }
}

impl Target for DrawList {
    fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn plot(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.cmds.push(DrawCmd::Point { x, y, color });
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, color: Rgb) {
        let w = w.min(self.width.saturating_sub(x));
        let h = h.min(self.height.saturating_sub(y));
        if w > 0 && h > 0 {
            self.cmds.push(DrawCmd::Rect { x, y, w, h, color });
        }
    }

    fn clear(&mut self, color: Rgb) {
        self.cmds.clear();
        self.fill_rect(0, 0, self.width, self.height, color);
    }
}
