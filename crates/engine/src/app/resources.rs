use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::{debug, warn};

const PLACEHOLDER_SIZE_PX: u32 = 16;
const PLACEHOLDER_CELL_PX: u32 = 4;
const PLACEHOLDER_LIGHT: [u8; 4] = [255, 0, 255, 255];
const PLACEHOLDER_DARK: [u8; 4] = [24, 24, 24, 255];

/// Decoded RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Texture {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Texture {
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if width == 0 || height == 0 || rgba.len() != expected {
            return None;
        }
        Some(Self {
            width,
            height,
            rgba,
        })
    }

    /// Deterministic magenta/dark checkerboard.
    pub fn placeholder() -> Self {
        let mut rgba = Vec::with_capacity((PLACEHOLDER_SIZE_PX * PLACEHOLDER_SIZE_PX * 4) as usize);
        for y in 0..PLACEHOLDER_SIZE_PX {
            for x in 0..PLACEHOLDER_SIZE_PX {
                let light = (x / PLACEHOLDER_CELL_PX + y / PLACEHOLDER_CELL_PX) % 2 == 0;
                rgba.extend_from_slice(if light {
                    &PLACEHOLDER_LIGHT
                } else {
                    &PLACEHOLDER_DARK
                });
            }
        }
        Self {
            width: PLACEHOLDER_SIZE_PX,
            height: PLACEHOLDER_SIZE_PX,
            rgba,
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(usize);

impl TextureHandle {
    pub const PLACEHOLDER: TextureHandle = TextureHandle(0);

    pub fn is_placeholder(self) -> bool {
        self == Self::PLACEHOLDER
    }
}

/// Raw clip bytes; an empty clip plays as silence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioClip {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl AudioClip {
    pub fn silent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bytes: Vec::new(),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.bytes.is_empty()
    }
}

pub trait AudioBackend {
    fn play(&mut self, clip: &AudioClip, looping: bool);
    fn stop_all(&mut self);
}

/// Tracks what would be playing without producing sound.
#[derive(Debug, Default)]
pub struct SilentAudio {
    playing: Vec<String>,
}

impl SilentAudio {
    pub fn playing(&self) -> &[String] {
        &self.playing
    }
}

impl AudioBackend for SilentAudio {
    fn play(&mut self, clip: &AudioClip, looping: bool) {
        debug!(clip = %clip.name, looping, bytes = clip.bytes.len(), "audio_play");
        self.playing.push(clip.name.clone());
    }

    fn stop_all(&mut self) {
        self.playing.clear();
    }
}

/// Mode-owned texture and audio cache rooted at the asset directory.
pub struct ResourceCache {
    asset_root: PathBuf,
    textures: Vec<Texture>,
    texture_handles: HashMap<String, TextureHandle>,
    clips: HashMap<String, AudioClip>,
    warned_paths: HashSet<String>,
    audio: Box<dyn AudioBackend>,
}

impl ResourceCache {
    pub fn new(asset_root: impl Into<PathBuf>, audio: Box<dyn AudioBackend>) -> Self {
        Self {
            asset_root: asset_root.into(),
            textures: vec![Texture::placeholder()],
            texture_handles: HashMap::new(),
            clips: HashMap::new(),
            warned_paths: HashSet::new(),
            audio,
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Failed loads resolve to the placeholder; the failure is logged once per path.
    pub fn load_texture(&mut self, path: &str) -> TextureHandle {
        if let Some(handle) = self.texture_handles.get(path) {
            return *handle;
        }
        let full_path = self.asset_root.join(path);
        let handle = match decode_texture(&full_path) {
            Ok(texture) => {
                self.textures.push(texture);
                TextureHandle(self.textures.len() - 1)
            }
            Err(reason) => {
                self.warn_once(path, &full_path, &reason, "texture");
                TextureHandle::PLACEHOLDER
            }
        };
        self.texture_handles.insert(path.to_string(), handle);
        handle
    }

    pub fn texture(&self, handle: TextureHandle) -> &Texture {
        self.textures.get(handle.0).unwrap_or(&self.textures[0])
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len() - 1
    }

    /// Missing clips play as silence.
    pub fn play_audio(&mut self, path: &str, looping: bool) {
        if !self.clips.contains_key(path) {
            let full_path = self.asset_root.join(path);
            let clip = match fs::read(&full_path) {
                Ok(bytes) => AudioClip {
                    name: path.to_string(),
                    bytes,
                },
                Err(error) => {
                    self.warn_once(
                        path,
                        &full_path,
                        &error.to_string(),
                        "audio",
                    );
                    AudioClip::silent(path)
                }
            };
            self.clips.insert(path.to_string(), clip);
        }
        if let Some(clip) = self.clips.get(path) {
            self.audio.play(clip, looping);
        }
    }

    pub fn stop_audio(&mut self) {
        self.audio.stop_all();
    }

    /// Drops everything but the placeholder and silences playback.
    pub fn release(&mut self) {
        self.audio.stop_all();
        self.textures.truncate(1);
        self.texture_handles.clear();
        self.clips.clear();
    }

    fn warn_once(&mut self, key: &str, full_path: &Path, reason: &str, kind: &'static str) {
        if !self.warned_paths.insert(key.to_string()) {
            return;
        }
        warn!(
            asset = key,
            kind,
            path = %full_path.display(),
            reason = reason,
            "resource_load_failed_using_placeholder"
        );
    }
}

fn decode_texture(path: &Path) -> Result<Texture, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    Texture::from_rgba(width, height, image.into_raw())
        .ok_or_else(|| format!("empty_image:{width}x{height}"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    fn cache(root: &Path) -> ResourceCache {
        ResourceCache::new(root, Box::new(SilentAudio::default()))
    }

    #[test]
    fn placeholder_is_a_deterministic_checkerboard() {
        let texture = Texture::placeholder();
        assert_eq!(texture, Texture::placeholder());
        assert_eq!(texture.pixel(0, 0), Some(PLACEHOLDER_LIGHT));
        assert_eq!(texture.pixel(PLACEHOLDER_CELL_PX, 0), Some(PLACEHOLDER_DARK));
        assert_eq!(texture.pixel(PLACEHOLDER_SIZE_PX, 0), None);
    }

    #[test]
    fn missing_texture_resolves_to_placeholder() {
        let temp = TempDir::new().expect("tempdir");
        let mut cache = cache(temp.path());
        let handle = cache.load_texture("textures/missing.png");
        assert!(handle.is_placeholder());
        assert_eq!(cache.load_texture("textures/missing.png"), handle);
        assert_eq!(cache.texture(handle), &Texture::placeholder());
        assert_eq!(cache.texture_count(), 0);
    }

    #[test]
    fn decodes_png_and_reuses_handle() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("tile.png");
        RgbaImage::from_pixel(2, 3, Rgba([1, 2, 3, 255]))
            .save(&path)
            .expect("write png");
        let mut cache = cache(temp.path());

        let handle = cache.load_texture("tile.png");
        assert!(!handle.is_placeholder());
        assert_eq!(cache.load_texture("tile.png"), handle);
        let texture = cache.texture(handle);
        assert_eq!((texture.width(), texture.height()), (2, 3));
        assert_eq!(texture.pixel(1, 2), Some([1, 2, 3, 255]));

        cache.release();
        assert_eq!(cache.texture_count(), 0);
        assert!(cache.texture(handle).width() == PLACEHOLDER_SIZE_PX);
    }

    #[test]
    fn corrupt_texture_falls_back_to_placeholder() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(temp.path().join("bad.png"), b"not a png").expect("write");
        let mut cache = cache(temp.path());
        assert!(cache.load_texture("bad.png").is_placeholder());
    }

    #[test]
    fn rejects_mismatched_rgba_length() {
        assert!(Texture::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Texture::from_rgba(0, 2, Vec::new()).is_none());
        assert!(Texture::from_rgba(1, 1, vec![0; 4]).is_some());
    }

    #[test]
    fn missing_audio_plays_as_silence() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(temp.path().join("loop.wav"), b"RIFF").expect("write");
        let mut cache = cache(temp.path());
        cache.play_audio("loop.wav", true);
        cache.play_audio("missing.wav", false);
        assert!(cache.clips["missing.wav"].is_silent());
        assert!(!cache.clips["loop.wav"].is_silent());
        cache.stop_audio();
    }
}
