use std::fs;
use std::path::Path;

use novella_core::config::CoreConfig;

pub fn ensure_config_exists(path: &str) {
    if Path::new(path).exists() {
        return;
    }

    eprintln!("Creating default configuration at '{}'...", path);

    let toml_str = match toml::to_string_pretty(&CoreConfig::default()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize default config: {}", e);
            return;
        }
    };

    if let Err(e) = fs::write(path, toml_str) {
        eprintln!("Failed to write config file: {}", e);
    } else {
        eprintln!("Config file created successfully.");
    }
}
