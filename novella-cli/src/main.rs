mod check;
mod config_gen;
mod setup;

use std::env;
use std::path::Path;

use anyhow::{bail, Context};
use novella_core::config::CoreConfig;
use novella_core::runtime::{AnyAssets, AssetResolver, FsAssetResolver, LogAudio};
use novella_core::{Driver, Player, ScriptManager, TerminalRenderer};
use novella_script::writer;

const USAGE: &str = "\
usage: novella <command> <file> [options]

commands:
  play   play a script in the terminal
  check  report labels, unknown directives and unresolved targets
  fmt    print the script in canonical form
  dump   print the scene tree as JSON

options (play):
  --start N  start at root index N
  --fast     do not wait in real time between ticks
  --quiet    write logs to the log file only";

#[derive(Debug, Default)]
struct Args {
    command: String,
    file: String,
    start: usize,
    fast: bool,
    quiet: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Args> {
    let mut parsed = Args::default();
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--start" => {
                let value = args.next().context("--start needs a value")?;
                parsed.start = value.parse().with_context(|| format!("invalid start index '{}'", value))?;
            }
            "--fast" => parsed.fast = true,
            "--quiet" => parsed.quiet = true,
            "-h" | "--help" => bail!("{}", USAGE),
            flag if flag.starts_with("--") => bail!("unknown option '{}'\n\n{}", flag, USAGE),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    parsed.command = positional.next().with_context(|| USAGE.to_string())?;
    parsed.file = positional.next().with_context(|| format!("missing script file\n\n{}", USAGE))?;
    Ok(parsed)
}

fn main() {
    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(2);
        }
    };

    // Only `play` shares stdout with the log.
    let quiet = args.quiet || args.command != "play";
    setup::init(quiet);
    log::info!(">>> novella {} {} <<<", args.command, args.file);

    if let Err(e) = run(&args) {
        log::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let core_cfg = CoreConfig::load();
    let mut manager = ScriptManager::new();
    let script = manager.load_file(&args.file)?;

    if core_cfg.debug.show_tree {
        log::debug!("Scene tree: {:#?}", script.scenes);
    }

    match args.command.as_str() {
        "play" => {
            let assets: Box<dyn AssetResolver> = if Path::new(&core_cfg.system.assets_path).is_dir() {
                let resolver = FsAssetResolver::new(&core_cfg.system.assets_path);
                log::info!("Indexed {} asset(s) under {}", resolver.len(), core_cfg.system.assets_path);
                Box::new(resolver)
            } else {
                log::warn!("Assets folder '{}' not found, resolving names as-is", core_cfg.system.assets_path);
                Box::new(AnyAssets)
            };
            let player = Player::new(assets, Box::new(LogAudio::default()), core_cfg.player, core_cfg.audio);
            let mut driver = Driver::new(player, TerminalRenderer::stdio()).realtime(!args.fast);
            driver.play(script.scenes.clone(), args.start);
        }
        "check" => {
            let report = check::analyze(&script.scenes);
            println!("{}: {} node(s)", script.title, report.nodes);
            println!("labels: {}", report.labels.join(", "));
            for token in &report.unknown {
                println!("unknown directive: {}", token);
            }
            for target in &report.unresolved {
                println!("unresolved: {}", target);
            }
            if !report.is_clean() {
                bail!("{} unresolved target(s) in {}", report.unresolved.len(), args.file);
            }
        }
        "fmt" => print!("{}", writer::to_text(&script.scenes)),
        "dump" => {
            let json = serde_json::to_string_pretty(&*script).context("Failed to serialize scene tree")?;
            println!("{}", json);
        }
        other => bail!("unknown command '{}'\n\n{}", other, USAGE),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn parses_play_options() {
        let parsed = args(&["play", "intro.txt", "--start", "4", "--fast"]).unwrap();
        assert_eq!(parsed.command, "play");
        assert_eq!(parsed.file, "intro.txt");
        assert_eq!(parsed.start, 4);
        assert!(parsed.fast);
        assert!(!parsed.quiet);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(args(&["play"]).is_err());
        assert!(args(&["play", "a.txt", "--start", "x"]).is_err());
        assert!(args(&["play", "a.txt", "--loud"]).is_err());
    }
}
