use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use rustc_hash::FxHashMap;
use walkdir::WalkDir;

use novella_script::ast::{SceneFile, SceneKind, SceneNode};
use novella_script::parser;

/// Loads script files and indexes them by title (the file stem).
#[derive(Debug, Default)]
pub struct ScriptManager {
    pub scripts: FxHashMap<String, Arc<SceneFile>>,
    pub source_cache: HashMap<String, String>,
    title_sources: HashMap<String, PathBuf>,
}

impl ScriptManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads every file under `root_dir` whose extension is in `extensions`.
    pub fn load_project(&mut self, root_dir: impl AsRef<Path>, extensions: &[String]) -> Result<usize> {
        let root = root_dir.as_ref();
        info!("Scanning script project at: {:?}", root);

        let mut loaded_count = 0;
        for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.iter().any(|x| x.eq_ignore_ascii_case(e)));
            if path.is_file() && matches {
                self.load_file(path)?;
                loaded_count += 1;
            }
        }

        info!("Project loaded. Files: {}", loaded_count);
        Ok(loaded_count)
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<Arc<SceneFile>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read script: {:?}", path))?;

        let title = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .with_context(|| format!("Script path has no file name: {:?}", path))?;

        if let Some(existing) = self.title_sources.get(&title) {
            if existing != path {
                anyhow::bail!(
                    "Script title collision!\n  '{}' is provided by:\n    1. {:?}\n    2. {:?}",
                    title, existing, path
                );
            }
        }

        let mut file = parser::parse_str(&content);
        file.title = title.clone();
        info!(
            "Loaded '{}': {} node(s), {} label(s)",
            title,
            count_nodes(&file.scenes),
            file.scenes.iter().filter(|n| n.kind == SceneKind::Label).count()
        );

        let file = Arc::new(file);
        self.title_sources.insert(title.clone(), path.to_path_buf());
        self.scripts.insert(title, file.clone());
        self.source_cache.insert(path.to_string_lossy().to_string(), content);
        Ok(file)
    }

    pub fn get(&self, title: &str) -> Option<Arc<SceneFile>> {
        self.scripts.get(title).cloned()
    }

    /// Loaded titles in sorted order.
    pub fn titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = self.scripts.keys().cloned().collect();
        titles.sort();
        titles
    }
}

/// Number of nodes in a tree, branch contents included.
pub fn count_nodes(nodes: &[SceneNode]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + count_nodes(&n.then_branch) + count_nodes(&n.else_branch))
        .sum()
}
