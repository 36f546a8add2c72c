use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use thiserror::Error;
use tracing::info;

/// First character stored in a bitmap font atlas.
pub const FONT_FIRST_CHAR: char = ' ';
/// Printable ASCII `' '..='~'`.
pub const FONT_GLYPH_COUNT: u32 = 95;
const MAX_GLYPH_PIXELS: u32 = 32;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("unknown texture id '{id}'")]
    UnknownTexture { id: String },
    #[error("unknown font id '{id}'")]
    UnknownFont { id: String },
    #[error("unknown sound id '{id}'")]
    UnknownSound { id: String },
    #[error("unknown music track id '{id}'")]
    UnknownTrack { id: String },
    #[error("duplicate {kind} id '{id}' in asset manifest")]
    DuplicateId { kind: &'static str, id: String },
    #[error("failed to read asset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode image {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(
        "font atlas {path} is {width}x{height}, expected {expected_width}x{expected_height} \
(95 glyphs in one row)"
    )]
    FontAtlasShape {
        path: PathBuf,
        width: u32,
        height: u32,
        expected_width: u32,
        expected_height: u32,
    },
    #[error("font glyph size {glyph_width}x{glyph_height} is not supported")]
    FontGlyphSize { glyph_width: u32, glyph_height: u32 },
    #[error("{path} is not a RIFF/WAVE file")]
    InvalidWave { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetEntry {
    pub id: String,
    /// Relative to the asset root.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontEntry {
    pub id: String,
    pub path: PathBuf,
    pub glyph_width: u32,
    pub glyph_height: u32,
}

/// Everything a run needs, loaded up front by [`AssetRegistry::load`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetManifest {
    pub textures: Vec<AssetEntry>,
    pub fonts: Vec<FontEntry>,
    pub sounds: Vec<AssetEntry>,
    pub tracks: Vec<AssetEntry>,
}

impl AssetManifest {
    pub fn texture(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
        self.textures.push(AssetEntry {
            id: id.to_string(),
            path: path.into(),
        });
        self
    }

    pub fn font(
        mut self,
        id: &str,
        path: impl Into<PathBuf>,
        glyph_width: u32,
        glyph_height: u32,
    ) -> Self {
        self.fonts.push(FontEntry {
            id: id.to_string(),
            path: path.into(),
            glyph_width,
            glyph_height,
        });
        self
    }

    pub fn sound(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
        self.sounds.push(AssetEntry {
            id: id.to_string(),
            path: path.into(),
        });
        self
    }

    pub fn track(mut self, id: &str, path: impl Into<PathBuf>) -> Self {
        self.tracks.push(AssetEntry {
            id: id.to_string(),
            path: path.into(),
        });
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackHandle(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    /// Returns `None` when `rgba` does not hold exactly `width * height` pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
        let pixel_count = width as usize * height as usize;
        Self {
            width,
            height,
            rgba: color.repeat(pixel_count),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.rgba.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

/// Fixed-cell bitmap font. Each glyph is a bit mask read row-major from the
/// top-left cell pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmapFont {
    glyph_width: u32,
    glyph_height: u32,
    masks: Vec<u32>,
}

impl BitmapFont {
    /// Builds a font from an RGBA atlas holding every printable ASCII glyph in
    /// one row. Pixels with non-zero alpha are lit.
    pub fn from_atlas(
        glyph_width: u32,
        glyph_height: u32,
        atlas: &Texture,
    ) -> Result<Self, AssetError> {
        validate_glyph_size(glyph_width, glyph_height)?;
        let mut masks = Vec::with_capacity(FONT_GLYPH_COUNT as usize);
        for glyph in 0..FONT_GLYPH_COUNT {
            let mut mask = 0u32;
            for row in 0..glyph_height {
                for col in 0..glyph_width {
                    let lit = atlas
                        .pixel(glyph * glyph_width + col, row)
                        .is_some_and(|pixel| pixel[3] > 0);
                    if lit {
                        mask |= 1 << (row * glyph_width + col);
                    }
                }
            }
            masks.push(mask);
        }
        Ok(Self {
            glyph_width,
            glyph_height,
            masks,
        })
    }

    /// A font whose glyphs are all empty. Layout still works.
    pub fn blank(glyph_width: u32, glyph_height: u32) -> Result<Self, AssetError> {
        validate_glyph_size(glyph_width, glyph_height)?;
        Ok(Self {
            glyph_width,
            glyph_height,
            masks: vec![0; FONT_GLYPH_COUNT as usize],
        })
    }

    pub fn glyph_width(&self) -> u32 {
        self.glyph_width
    }

    pub fn glyph_height(&self) -> u32 {
        self.glyph_height
    }

    /// Characters outside the atlas render as blank cells.
    pub fn is_lit(&self, ch: char, col: u32, row: u32) -> bool {
        if col >= self.glyph_width || row >= self.glyph_height {
            return false;
        }
        let Some(index) = (ch as u32).checked_sub(FONT_FIRST_CHAR as u32) else {
            return false;
        };
        self.masks
            .get(index as usize)
            .is_some_and(|mask| mask & (1 << (row * self.glyph_width + col)) != 0)
    }
}

fn validate_glyph_size(glyph_width: u32, glyph_height: u32) -> Result<(), AssetError> {
    let area = glyph_width.saturating_mul(glyph_height);
    if glyph_width == 0 || glyph_height == 0 || area > MAX_GLYPH_PIXELS {
        return Err(AssetError::FontGlyphSize {
            glyph_width,
            glyph_height,
        });
    }
    Ok(())
}

/// Validated WAVE file, kept encoded. Decoding is left to the audio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundClip {
    id: String,
    data: Arc<[u8]>,
}

impl SoundClip {
    pub fn from_wav_bytes(id: &str, path: &Path, bytes: &[u8]) -> Result<Self, AssetError> {
        let is_wave = bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WAVE";
        if !is_wave {
            return Err(AssetError::InvalidWave {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            id: id.to_string(),
            data: Arc::from(bytes),
        })
    }

    pub fn silent(id: &str) -> Self {
        Self {
            id: id.to_string(),
            data: Arc::from(&[][..]),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Shared handle to the encoded bytes.
    pub fn data(&self) -> Arc<[u8]> {
        Arc::clone(&self.data)
    }
}

#[derive(Debug)]
struct Slots<T> {
    kind: &'static str,
    items: Vec<T>,
    by_id: HashMap<String, usize>,
}

impl<T> Slots<T> {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            items: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    fn insert(&mut self, id: &str, item: T) -> usize {
        if let Some(&index) = self.by_id.get(id) {
            self.items[index] = item;
            return index;
        }
        let index = self.items.len();
        self.items.push(item);
        self.by_id.insert(id.to_string(), index);
        index
    }

    fn insert_unique(&mut self, id: &str, item: T) -> Result<usize, AssetError> {
        if self.by_id.contains_key(id) {
            return Err(AssetError::DuplicateId {
                kind: self.kind,
                id: id.to_string(),
            });
        }
        Ok(self.insert(id, item))
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }
}

/// Decoded assets for one run, owned by the loop and lent to scenes.
#[derive(Debug)]
pub struct AssetRegistry {
    textures: Slots<Texture>,
    fonts: Slots<BitmapFont>,
    sounds: Slots<SoundClip>,
    tracks: Slots<SoundClip>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self {
            textures: Slots::new("texture"),
            fonts: Slots::new("font"),
            sounds: Slots::new("sound"),
            tracks: Slots::new("music track"),
        }
    }
}

impl AssetRegistry {
    pub fn load(asset_root: &Path, manifest: &AssetManifest) -> Result<Self, AssetError> {
        let mut registry = Self::default();

        for entry in &manifest.textures {
            let texture = decode_texture(&asset_root.join(&entry.path))?;
            registry.textures.insert_unique(&entry.id, texture)?;
        }
        for entry in &manifest.fonts {
            let path = asset_root.join(&entry.path);
            let atlas = decode_texture(&path)?;
            let expected_width = entry.glyph_width.saturating_mul(FONT_GLYPH_COUNT);
            if atlas.width() != expected_width || atlas.height() != entry.glyph_height {
                return Err(AssetError::FontAtlasShape {
                    path,
                    width: atlas.width(),
                    height: atlas.height(),
                    expected_width,
                    expected_height: entry.glyph_height,
                });
            }
            let font = BitmapFont::from_atlas(entry.glyph_width, entry.glyph_height, &atlas)?;
            registry.fonts.insert_unique(&entry.id, font)?;
        }
        for entry in &manifest.sounds {
            let clip = read_wave(&entry.id, &asset_root.join(&entry.path))?;
            registry.sounds.insert_unique(&entry.id, clip)?;
        }
        for entry in &manifest.tracks {
            let clip = read_wave(&entry.id, &asset_root.join(&entry.path))?;
            registry.tracks.insert_unique(&entry.id, clip)?;
        }

        info!(
            root = %asset_root.display(),
            textures = registry.textures.items.len(),
            fonts = registry.fonts.items.len(),
            sounds = registry.sounds.items.len(),
            tracks = registry.tracks.items.len(),
            "assets_loaded"
        );
        Ok(registry)
    }

    pub fn insert_texture(&mut self, id: &str, texture: Texture) -> TextureHandle {
        TextureHandle(self.textures.insert(id, texture))
    }

    pub fn insert_font(&mut self, id: &str, font: BitmapFont) -> FontHandle {
        FontHandle(self.fonts.insert(id, font))
    }

    pub fn insert_sound(&mut self, id: &str, clip: SoundClip) -> SoundHandle {
        SoundHandle(self.sounds.insert(id, clip))
    }

    pub fn insert_track(&mut self, id: &str, clip: SoundClip) -> TrackHandle {
        TrackHandle(self.tracks.insert(id, clip))
    }

    pub fn texture(&self, id: &str) -> Result<TextureHandle, AssetError> {
        self.textures
            .index_of(id)
            .map(TextureHandle)
            .ok_or_else(|| AssetError::UnknownTexture { id: id.to_string() })
    }

    pub fn font(&self, id: &str) -> Result<FontHandle, AssetError> {
        self.fonts
            .index_of(id)
            .map(FontHandle)
            .ok_or_else(|| AssetError::UnknownFont { id: id.to_string() })
    }

    pub fn sound(&self, id: &str) -> Result<SoundHandle, AssetError> {
        self.sounds
            .index_of(id)
            .map(SoundHandle)
            .ok_or_else(|| AssetError::UnknownSound { id: id.to_string() })
    }

    pub fn track(&self, id: &str) -> Result<TrackHandle, AssetError> {
        self.tracks
            .index_of(id)
            .map(TrackHandle)
            .ok_or_else(|| AssetError::UnknownTrack { id: id.to_string() })
    }

    pub fn texture_data(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.items.get(handle.0)
    }

    pub fn font_data(&self, handle: FontHandle) -> Option<&BitmapFont> {
        self.fonts.items.get(handle.0)
    }

    pub fn sound_clip(&self, handle: SoundHandle) -> Option<&SoundClip> {
        self.sounds.items.get(handle.0)
    }

    pub fn track_clip(&self, handle: TrackHandle) -> Option<&SoundClip> {
        self.tracks.items.get(handle.0)
    }
}

fn decode_texture(path: &Path) -> Result<Texture, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = reader.with_guessed_format().map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    Ok(Texture {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn read_wave(id: &str, path: &Path) -> Result<SoundClip, AssetError> {
    let bytes = fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    SoundClip::from_wav_bytes(id, path, &bytes)
}
