use crate::host::{Host, TextureId};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// First key available to filesystem-backed user icons. Built-in icons live
/// below this value; the two namespaces never collide.
pub const USER_ICON_BASE: u32 = 100_000;

/// Upper bound on files decoded and uploaded per [`TextureDictionary::add_user_icons`]
/// call, so the cost is amortized across frames instead of stalling one.
const SCAN_BATCH: usize = 8;

const IMAGE_EXTENSIONS: [&str; 2] = ["png", "jpg"];

/// Selects one of the four parallel texture dictionaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureVariant {
    pub hi_res: bool,
    pub grayscale: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    ScanningUserIcons,
    Ready,
}

/// Resolves icon keys to loaded texture handles for one quality variant.
///
/// Built-in icons decode lazily on first request; user icons are registered
/// by incremental directory scans. A key with no loadable texture yields
/// "absent" and is remembered so the load is not retried every frame.
pub struct TextureDictionary {
    hi_res: bool,
    grayscale: bool,
    textures: HashMap<u32, TextureId>,
    failed: HashSet<u32>,
    user_sources: HashMap<u32, PathBuf>,
    user_keys: HashMap<PathBuf, u32>,
    pending: VecDeque<(u32, PathBuf)>,
    next_user_key: u32,
    state: LoadState,
    disposed: bool,
}

impl TextureDictionary {
    pub fn new(hi_res: bool, grayscale: bool) -> Self {
        Self {
            hi_res,
            grayscale,
            textures: HashMap::new(),
            failed: HashSet::new(),
            user_sources: HashMap::new(),
            user_keys: HashMap::new(),
            pending: VecDeque::new(),
            next_user_key: USER_ICON_BASE,
            state: LoadState::Idle,
            disposed: false,
        }
    }

    pub fn variant(&self) -> TextureVariant {
        TextureVariant {
            hi_res: self.hi_res,
            grayscale: self.grayscale,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    /// Resolve `key` to a loaded texture. Built-in keys are loaded on first
    /// request; registered user icons not yet uploaded are loaded here too.
    /// Never panics; an unloadable key yields `None`.
    pub fn resolve(&mut self, host: &mut dyn Host, key: u32) -> Option<TextureId> {
        if self.disposed {
            return None;
        }
        if let Some(&id) = self.textures.get(&key) {
            return Some(id);
        }
        if self.failed.contains(&key) {
            return None;
        }
        if key >= USER_ICON_BASE {
            let path = self.user_sources.get(&key)?.clone();
            self.load_file(host, key, &path)
        } else {
            match host.load_builtin_icon(key, self.hi_res) {
                Some(image) => self.upload(host, key, image.width(), image.height(), image.into_raw()),
                None => {
                    self.failed.insert(key);
                    None
                }
            }
        }
    }

    /// Scan `dir` for image files and register newly found ones under fresh
    /// keys, then decode and upload at most a small batch of outstanding
    /// entries. Returns whether unscanned work remains, so callers re-enter
    /// across frames instead of blocking one.
    pub fn add_user_icons(&mut self, host: &mut dyn Host, dir: &Path) -> bool {
        if self.disposed {
            return false;
        }
        if self.state != LoadState::ScanningUserIcons {
            self.scan(dir);
            self.state = LoadState::ScanningUserIcons;
        }
        for _ in 0..SCAN_BATCH {
            let Some((key, path)) = self.pending.pop_front() else {
                break;
            };
            self.load_file(host, key, &path);
        }
        if self.pending.is_empty() {
            self.state = LoadState::Ready;
            false
        } else {
            true
        }
    }

    fn scan(&mut self, dir: &Path) {
        let mut found: Vec<PathBuf> = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| {
                        IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e))
                    })
            })
            .collect();
        // Sorted so key assignment matches across quality variants scanning
        // the same directory.
        found.sort();
        for path in found {
            if self.user_keys.contains_key(&path) {
                continue;
            }
            let key = self.next_user_key;
            self.next_user_key += 1;
            self.user_keys.insert(path.clone(), key);
            self.user_sources.insert(key, path.clone());
            self.pending.push_back((key, path));
        }
    }

    fn load_file(&mut self, host: &mut dyn Host, key: u32, path: &Path) -> Option<TextureId> {
        match image::open(path) {
            Ok(image) => {
                let image = image.into_rgba8();
                self.upload(host, key, image.width(), image.height(), image.into_raw())
            }
            Err(e) => {
                tracing::warn!("failed to decode user icon {}: {e}", path.display());
                self.failed.insert(key);
                None
            }
        }
    }

    fn upload(
        &mut self,
        host: &mut dyn Host,
        key: u32,
        width: u32,
        height: u32,
        mut rgba: Vec<u8>,
    ) -> Option<TextureId> {
        if self.grayscale {
            grayscale_rgba(&mut rgba);
        }
        match host.create_texture(width, height, &rgba) {
            Ok(id) => {
                self.textures.insert(key, id);
                Some(id)
            }
            Err(e) => {
                tracing::warn!("failed to upload texture for icon {key}: {e:#}");
                self.failed.insert(key);
                None
            }
        }
    }

    /// Registered user icons, key to source path.
    pub fn user_icons(&self) -> &HashMap<u32, PathBuf> {
        &self.user_sources
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Release loaded textures without destroying the dictionary; the user
    /// icon registry survives and entries reload lazily. Used on reload, not
    /// on shutdown.
    pub fn try_empty(&mut self, host: &mut dyn Host) {
        if self.disposed {
            return;
        }
        for (_, id) in self.textures.drain() {
            host.destroy_texture(id);
        }
        self.failed.clear();
        self.pending.clear();
        self.state = LoadState::Idle;
    }

    /// Release all resources. Idempotent; every operation afterwards is a
    /// graceful no-op.
    pub fn dispose(&mut self, host: &mut dyn Host) {
        if self.disposed {
            return;
        }
        for (_, id) in self.textures.drain() {
            host.destroy_texture(id);
        }
        self.failed.clear();
        self.pending.clear();
        self.user_sources.clear();
        self.user_keys.clear();
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

/// The four parallel dictionaries, one per (resolution, grayscale) variant.
pub struct TextureSet {
    pub lr: TextureDictionary,
    pub hr: TextureDictionary,
    pub gs_lr: TextureDictionary,
    pub gs_hr: TextureDictionary,
}

impl TextureSet {
    pub fn new() -> Self {
        Self {
            lr: TextureDictionary::new(false, false),
            hr: TextureDictionary::new(true, false),
            gs_lr: TextureDictionary::new(false, true),
            gs_hr: TextureDictionary::new(true, true),
        }
    }

    pub fn get_mut(&mut self, variant: TextureVariant) -> &mut TextureDictionary {
        match (variant.hi_res, variant.grayscale) {
            (false, false) => &mut self.lr,
            (true, false) => &mut self.hr,
            (false, true) => &mut self.gs_lr,
            (true, true) => &mut self.gs_hr,
        }
    }

    /// The variant selected by the live configuration flag.
    pub fn active(&self, use_hi_res: bool) -> &TextureDictionary {
        if use_hi_res {
            &self.hr
        } else {
            &self.lr
        }
    }

    pub fn active_mut(&mut self, use_hi_res: bool) -> &mut TextureDictionary {
        if use_hi_res {
            &mut self.hr
        } else {
            &mut self.lr
        }
    }

    pub fn try_empty_all(&mut self, host: &mut dyn Host) {
        self.lr.try_empty(host);
        self.hr.try_empty(host);
        self.gs_lr.try_empty(host);
        self.gs_hr.try_empty(host);
    }

    pub fn dispose_all(&mut self, host: &mut dyn Host) {
        self.lr.dispose(host);
        self.hr.dispose(host);
        self.gs_lr.dispose(host);
        self.gs_hr.dispose(host);
    }
}

impl Default for TextureSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive a grayscale image in place from RGBA pixel data, weighting the
/// channels 0.2125 / 0.7154 / 0.0721. Alpha passes through unchanged;
/// zero-alpha pixels get zero color channels. Applied once at load time.
pub fn grayscale_rgba(rgba: &mut [u8]) {
    for pixel in rgba.chunks_exact_mut(4) {
        let alpha = pixel[3];
        if alpha > 0 {
            let avg = (0.2125 * pixel[0] as f32
                + 0.7154 * pixel[1] as f32
                + 0.0721 * pixel[2] as f32) as u8;
            pixel[0] = avg;
            pixel[1] = avg;
            pixel[2] = avg;
        } else {
            pixel[0] = 0;
            pixel[1] = 0;
            pixel[2] = 0;
        }
        pixel[3] = alpha;
    }
}
