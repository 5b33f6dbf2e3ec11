pub mod types;

use std::fs;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::SystemConfig;
use crate::executor::Player;
use crate::storager::types::SaveFile;

/// `<save_path>/slot_<n>.sav`, creating the save directory if needed.
pub fn slot_path(slot: u32) -> PathBuf {
    let cfg: SystemConfig = novella_shared::config::get("system");
    let dir = Path::new(&cfg.save_path);

    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            log::warn!("Failed to create save directory {:?}: {}", dir, e);
        }
    }

    dir.join(format!("slot_{}.sav", slot))
}

pub fn save(path: impl AsRef<Path>, player: &Player) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create save file {:?}", path))?;
    let mut writer = BufWriter::new(file);

    let save = player.snapshot();
    let config = bincode::config::standard();
    bincode::serde::encode_into_std_write(&save, &mut writer, config)
        .with_context(|| format!("Failed to encode session into {:?}", path))?;
    writer.flush()?;

    log::info!("Session saved to {:?}", path);
    Ok(())
}

/// Reads a session and resumes `player` from it. The player must already be
/// playing the script the session was saved from.
pub fn load(path: impl AsRef<Path>, player: &mut Player) -> anyhow::Result<()> {
    let save = read(path.as_ref())?;
    player.restore(save)
}

pub fn read(path: &Path) -> anyhow::Result<SaveFile> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open save file {:?}", path))?;
    let mut reader = BufReader::new(file);
    let config = bincode::config::standard();
    let save: SaveFile = bincode::serde::decode_from_std_read(&mut reader, config)
        .with_context(|| format!("Failed to decode save file {:?}", path))?;
    Ok(save)
}
