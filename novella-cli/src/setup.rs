use std::fs;
use std::fs::OpenOptions;
use std::io::Write;

use env_logger::{Builder, Target};
use novella_core::config::SystemConfig;

use crate::config_gen;

pub const CONFIG_PATH: &str = "config.toml";

/// Loads `config.toml` (writing a default one first if missing) and installs
/// the logger. `quiet` keeps log lines off stdout.
pub fn init(quiet: bool) {
    config_gen::ensure_config_exists(CONFIG_PATH);

    if let Err(e) = novella_shared::config::init(CONFIG_PATH) {
        eprintln!("Config load warning: {:#}", e);
    }

    init_logger(quiet);
}

fn init_logger(quiet: bool) {
    let sys_cfg: SystemConfig = novella_shared::config::get("system");
    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or(&sys_cfg.log_level));

    if let Err(e) = fs::create_dir_all(&sys_cfg.log_path) {
        eprintln!("Failed to create log dir: {}", e);
    }
    let log_file_path = std::path::Path::new(&sys_cfg.log_path).join("novella.log");
    let log_file = OpenOptions::new().create(true).append(true).open(&log_file_path);

    struct TeeWriter<W1, W2>(W1, W2);
    impl<W1: Write, W2: Write> Write for TeeWriter<W1, W2> {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            let n = self.0.write(buf)?;
            self.1.write_all(&buf[..n])?;
            Ok(n)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            self.0.flush()?;
            self.1.flush()?;
            Ok(())
        }
    }

    match (log_file, quiet) {
        (Ok(file), true) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        (Ok(file), false) => {
            builder.target(Target::Pipe(Box::new(TeeWriter(std::io::stdout(), file))));
        }
        (Err(e), quiet) => {
            eprintln!("Failed to open log file {:?}: {}", log_file_path, e);
            builder.target(if quiet { Target::Stderr } else { Target::Stdout });
        }
    }

    builder.init();
}
