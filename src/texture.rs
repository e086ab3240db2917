use std::fs;
use std::path::{Path, PathBuf};

/// Packed 8-bit RGB texel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// scale every channel by `factor`, clamped to `0..=1`
    pub fn shade(self, factor: f32) -> Self {
        let factor = factor.clamp(0., 1.);
        let scale = |c: u8| (c as f32 * factor) as u8;
        Self::new(scale(self.r), scale(self.g), scale(self.b))
    }
}

/// Things that can go wrong while loading textures.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("could not read texture {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("problem loading {} at line {line}: expected `{expected}`, found `{found}`", .path.display())]
    Header {
        path: PathBuf,
        line: usize,
        expected: String,
        found: String,
    },

    #[error("problem loading {}: expected {expected} bytes of pixel data, found {found}", .path.display())]
    PixelData {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("texture has {found} texels, expected {expected}")]
    TexelCount { expected: usize, found: usize },

    #[error("texture is {found}x{found}, store holds {expected}x{expected}")]
    SizeMismatch { expected: usize, found: usize },
}

/// Loader states, in the order the file must satisfy them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Magic,
    Dims,
    MaxVal,
    Pixels,
}

impl Stage {
    const MAGIC: &'static str = "P6";
    const MAX_VAL: &'static str = "255";

    /// 1-based header line checked in this stage
    fn line(self) -> usize {
        match self {
            Stage::Magic => 1,
            Stage::Dims => 2,
            Stage::MaxVal => 3,
            Stage::Pixels => 4,
        }
    }

    fn expected(self, size: usize) -> String {
        match self {
            Stage::Magic => Self::MAGIC.into(),
            Stage::Dims => format!("{size} {size}"),
            Stage::MaxVal => Self::MAX_VAL.into(),
            Stage::Pixels => format!("{} bytes", size * size * 3),
        }
    }

    fn next(self) -> Stage {
        match self {
            Stage::Magic => Stage::Dims,
            Stage::Dims => Stage::MaxVal,
            Stage::MaxVal | Stage::Pixels => Stage::Pixels,
        }
    }
}

/// Fixed-resolution square texture, row-major with row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Texture {
    size: usize,
    texels: Vec<Rgb>,
}

impl Texture {
    pub fn new(size: usize, texels: Vec<Rgb>) -> Result<Self, TextureError> {
        if texels.len() != size * size {
            return Err(TextureError::TexelCount {
                expected: size * size,
                found: texels.len(),
            });
        }
        Ok(Self { size, texels })
    }

    pub fn solid(size: usize, color: Rgb) -> Self {
        Self {
            size,
            texels: vec![color; size * size],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn texel(&self, col: usize, row: usize) -> Option<Rgb> {
        if col >= self.size || row >= self.size {
            return None;
        }
        self.texels.get(row * self.size + col).copied()
    }

    /// Read and validate a PPM file of resolution `size`.
    pub fn load(path: impl AsRef<Path>, size: usize) -> Result<Self, TextureError> {
        let path = path.as_ref();
        log::debug!("loading texture at {}", path.display());
        let bytes = fs::read(path).map_err(|source| TextureError::Io {
            path: path.into(),
            source,
        })?;
        Self::parse(&bytes, size, path)
    }

    /// Validate an in-memory PPM image; `path` is only used in error reports.
    ///
    /// The header is exactly three newline-terminated lines (`P6`, `R R`,
    /// `255`) followed by exactly `R * R * 3` raw bytes. The first violation
    /// is reported and nothing else is read.
    pub fn parse(bytes: &[u8], size: usize, path: &Path) -> Result<Self, TextureError> {
        let mut stage = Stage::Magic;
        let mut rest = bytes;

        while stage != Stage::Pixels {
            let end = rest.iter().position(|&b| b == b'\n');
            let line = String::from_utf8_lossy(&rest[..end.unwrap_or(rest.len())]);

            match end {
                Some(end) if line == stage.expected(size) => {
                    rest = &rest[end + 1..];
                    stage = stage.next();
                }
                // missing terminator or wrong content
                _ => {
                    return Err(TextureError::Header {
                        path: path.into(),
                        line: stage.line(),
                        expected: stage.expected(size),
                        found: line.into_owned(),
                    })
                }
            }
        }

        let expected = size * size * 3;
        if rest.len() != expected {
            return Err(TextureError::PixelData {
                path: path.into(),
                expected,
                found: rest.len(),
            });
        }

        let texels = rest
            .chunks_exact(3)
            .map(|px| Rgb::new(px[0], px[1], px[2]))
            .collect();

        Self::new(size, texels)
    }
}

/// Square textures decoded from strict binary PPM files, indexed by material
/// id. Loaded once at startup and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct TextureStore {
    size: usize,
    textures: Vec<Texture>,
}

impl TextureStore {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            textures: Vec::new(),
        }
    }

    /// Load `names` from `dir` in order; the n-th name becomes material n.
    pub fn load_dir<S: AsRef<str>>(
        dir: impl AsRef<Path>,
        names: &[S],
        size: usize,
    ) -> Result<Self, TextureError> {
        let dir = dir.as_ref();
        let mut store = Self::new(size);
        for name in names {
            store.push(Texture::load(dir.join(name.as_ref()), size)?)?;
        }
        log::info!("loaded {} textures from {}", store.len(), dir.display());
        Ok(store)
    }

    /// Append a texture, returning its material id.
    pub fn push(&mut self, texture: Texture) -> Result<usize, TextureError> {
        if texture.size() != self.size {
            return Err(TextureError::SizeMismatch {
                expected: self.size,
                found: texture.size(),
            });
        }
        self.textures.push(texture);
        Ok(self.textures.len() - 1)
    }

    pub fn get(&self, material: usize) -> Option<&Texture> {
        self.textures.get(material)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ppm(header: &str, pixels: &[u8]) -> Vec<u8> {
        let mut bytes = header.as_bytes().to_vec();
        bytes.extend_from_slice(pixels);
        bytes
    }

    fn pattern(size: usize) -> Vec<u8> {
        (0..size * size * 3).map(|i| (i * 7 % 256) as u8).collect()
    }

    #[test]
    fn round_trip_keeps_every_texel() {
        let pixels = pattern(32);
        let tex = Texture::parse(&ppm("P6\n32 32\n255\n", &pixels), 32, Path::new("t.ppm")).unwrap();

        for row in 0..32 {
            for col in 0..32 {
                let i = (row * 32 + col) * 3;
                assert_eq!(
                    tex.texel(col, row),
                    Some(Rgb::new(pixels[i], pixels[i + 1], pixels[i + 2]))
                );
            }
        }
    }

    #[test]
    fn pixel_bytes_may_contain_newlines() {
        let pixels = vec![b'\n'; 2 * 2 * 3];
        let tex = Texture::parse(&ppm("P6\n2 2\n255\n", &pixels), 2, Path::new("nl.ppm")).unwrap();
        assert_eq!(tex.texel(1, 1), Some(Rgb::new(10, 10, 10)));
    }

    #[test]
    fn header_violations_name_the_line() {
        let cases = [
            ("P3\n32 32\n255\n", 1, "P3"),
            ("P6\n64 64\n255\n", 2, "64 64"),
            ("P6\n32 32\n65535\n", 3, "65535"),
        ];
        for (header, line, found) in cases {
            match Texture::parse(&ppm(header, &pattern(32)), 32, Path::new("bad.ppm")) {
                Err(TextureError::Header {
                    line: l, found: f, ..
                }) => {
                    assert_eq!(l, line);
                    assert_eq!(f, found);
                }
                other => panic!("expected header error, got {other:?}"),
            }
        }
    }

    #[test]
    fn truncated_header_fails() {
        let err = Texture::parse(b"P6\n32 32", 32, Path::new("short.ppm")).unwrap_err();
        assert!(matches!(err, TextureError::Header { line: 2, .. }));
    }

    #[test]
    fn pixel_count_must_be_exact() {
        let short = Texture::parse(&ppm("P6\n2 2\n255\n", &[0; 11]), 2, Path::new("s.ppm"));
        assert!(matches!(
            short,
            Err(TextureError::PixelData {
                expected: 12,
                found: 11,
                ..
            })
        ));

        let long = Texture::parse(&ppm("P6\n2 2\n255\n", &[0; 13]), 2, Path::new("l.ppm"));
        assert!(matches!(long, Err(TextureError::PixelData { found: 13, .. })));
    }

    #[test]
    fn error_message_names_file_and_line() {
        let err = Texture::parse(b"XX\n", 32, Path::new("wall.ppm")).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("wall.ppm"));
        assert!(msg.contains("line 1"));
    }

    #[test]
    fn load_reads_from_disk() {
        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        fs::write(tmp.path(), ppm("P6\n2 2\n255\n", &pattern(2))).unwrap();
        let tex = Texture::load(tmp.path(), 2).unwrap();
        assert_eq!(tex.texel(0, 0), Some(Rgb::new(0, 7, 14)));

        let missing = Texture::load(tmp.path().with_extension("missing"), 2);
        assert!(matches!(missing, Err(TextureError::Io { .. })));
    }

    #[test]
    fn bundled_assets_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/textures");
        let store = TextureStore::load_dir(dir, &["wall.ppm", "skull.ppm"], 64).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().texel(0, 0), Some(Rgb::MAGENTA));
    }

    #[test]
    fn store_rejects_mismatched_sizes() {
        let mut store = TextureStore::new(4);
        assert_eq!(store.push(Texture::solid(4, Rgb::WHITE)).unwrap(), 0);
        assert!(matches!(
            store.push(Texture::solid(8, Rgb::WHITE)),
            Err(TextureError::SizeMismatch {
                expected: 4,
                found: 8
            })
        ));
        assert_eq!(store.len(), 1);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn shade_scales_channels() {
        assert_eq!(Rgb::new(200, 100, 51).shade(0.5), Rgb::new(100, 50, 25));
        assert_eq!(Rgb::WHITE.shade(1.), Rgb::WHITE);
    }
}
