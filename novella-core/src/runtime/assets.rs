use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use walkdir::WalkDir;

/// Extensions an asset may carry, in lookup priority.
pub const ASSET_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "ogg", "mp3", "wav"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Bg,
    Bgm,
    Se,
    Characters,
    Image,
    System,
}

impl AssetKind {
    pub const ALL: [AssetKind; 6] = [
        AssetKind::Bg,
        AssetKind::Bgm,
        AssetKind::Se,
        AssetKind::Characters,
        AssetKind::Image,
        AssetKind::System,
    ];

    pub fn dir(self) -> &'static str {
        match self {
            AssetKind::Bg => "bg",
            AssetKind::Bgm => "bgm",
            AssetKind::Se => "se",
            AssetKind::Characters => "characters",
            AssetKind::Image => "image",
            AssetKind::System => "system",
        }
    }
}

pub trait AssetResolver {
    fn find(&self, kind: AssetKind, name: &str) -> Option<String>;
}

/// Indexes `<root>/<kind>/<name>.<ext>` once at construction.
#[derive(Debug, Default)]
pub struct FsAssetResolver {
    root_path: PathBuf,
    path_index: FxHashMap<(AssetKind, String), PathBuf>,
}

impl FsAssetResolver {
    pub fn new(root_path: impl AsRef<Path>) -> Self {
        let mut resolver = Self {
            root_path: root_path.as_ref().to_path_buf(),
            path_index: FxHashMap::default(),
        };
        resolver.scan_assets();
        resolver
    }

    fn scan_assets(&mut self) {
        log::info!("Scanning assets in {:?}...", self.root_path);

        for kind in AssetKind::ALL {
            let dir = self.root_path.join(kind.dir());
            if !dir.is_dir() {
                continue;
            }
            for entry in WalkDir::new(&dir).into_iter().filter_map(|e| e.ok()) {
                let path = entry.path();
                if !path.is_file() {
                    continue;
                }
                let Some(rank) = path
                    .extension()
                    .and_then(|s| s.to_str())
                    .and_then(|ext| extension_rank(&ext.to_lowercase()))
                else {
                    continue;
                };
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };

                let key = (kind, stem.to_string());
                let replace = match self.path_index.get(&key) {
                    Some(existing) => {
                        let existing_rank = existing
                            .extension()
                            .and_then(|s| s.to_str())
                            .and_then(|ext| extension_rank(&ext.to_lowercase()))
                            .unwrap_or(usize::MAX);
                        if rank == existing_rank {
                            log::warn!("Duplicate asset name detected: '{}/{}'. Keeping {:?}", kind.dir(), stem, existing);
                        }
                        rank < existing_rank
                    }
                    None => true,
                };
                if replace {
                    self.path_index.insert(key, path.to_path_buf());
                }
            }
        }

        log::info!("Asset scan complete. Indexed {} files.", self.path_index.len());
    }

    pub fn len(&self) -> usize {
        self.path_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_index.is_empty()
    }
}

fn extension_rank(ext: &str) -> Option<usize> {
    ASSET_EXTENSIONS.iter().position(|e| *e == ext)
}

impl AssetResolver for FsAssetResolver {
    fn find(&self, kind: AssetKind, name: &str) -> Option<String> {
        self.path_index
            .get(&(kind, name.to_string()))
            .map(|p| p.to_string_lossy().into_owned())
    }
}

/// Resolver over a fixed table, with `<kind>/<name>` locators.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    entries: FxHashMap<(AssetKind, String), String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: AssetKind, name: &str) -> Self {
        self.insert(kind, name);
        self
    }

    pub fn insert(&mut self, kind: AssetKind, name: &str) {
        self.entries
            .insert((kind, name.to_string()), format!("{}/{}", kind.dir(), name));
    }
}

impl AssetResolver for MemoryAssets {
    fn find(&self, kind: AssetKind, name: &str) -> Option<String> {
        self.entries.get(&(kind, name.to_string())).cloned()
    }
}

/// Every kind resolves every name; used when no assets folder exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyAssets;

impl AssetResolver for AnyAssets {
    fn find(&self, kind: AssetKind, name: &str) -> Option<String> {
        Some(format!("{}/{}", kind.dir(), name))
    }
}
