use std::fs;
use std::path::PathBuf;

use novella_core::manager::{count_nodes, ScriptManager};

fn project_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("novella-manager-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("sub")).expect("project dir");
    dir
}

fn exts() -> Vec<String> {
    vec!["txt".into(), "nvl".into()]
}

#[test]
fn test_load_project_filters_extensions() {
    let dir = project_dir("filter");
    fs::write(dir.join("intro.txt"), "*start\nhello\n@goto start\n").unwrap();
    fs::write(dir.join("sub/route.nvl"), "@if $a == 1\nA\n@else\nB\n@endif\n").unwrap();
    fs::write(dir.join("notes.md"), "not a script").unwrap();

    let mut manager = ScriptManager::new();
    let loaded = manager.load_project(&dir, &exts()).expect("load project");
    assert_eq!(loaded, 2);
    assert_eq!(manager.titles(), vec!["intro", "route"]);

    let intro = manager.get("intro").expect("intro");
    assert_eq!(intro.title, "intro");
    assert_eq!(intro.scenes.len(), 3);

    let route = manager.get("route").expect("route");
    assert_eq!(count_nodes(&route.scenes), 3);
    assert!(manager.get("notes").is_none());
    assert_eq!(manager.source_cache.len(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_title_collision_is_an_error() {
    let dir = project_dir("collision");
    fs::write(dir.join("intro.txt"), "a\n").unwrap();
    fs::write(dir.join("sub/intro.nvl"), "b\n").unwrap();

    let mut manager = ScriptManager::new();
    let err = manager.load_project(&dir, &exts()).unwrap_err();
    assert!(err.to_string().contains("collision"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_reloading_same_file_is_allowed() {
    let dir = project_dir("reload");
    let path = dir.join("intro.txt");
    fs::write(&path, "a\n").unwrap();

    let mut manager = ScriptManager::new();
    manager.load_file(&path).expect("first load");
    fs::write(&path, "a\nb\n").unwrap();
    let file = manager.load_file(&path).expect("second load");
    assert_eq!(file.scenes.len(), 2);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn test_missing_file_has_context() {
    let mut manager = ScriptManager::new();
    let err = manager.load_file("/definitely/not/here.txt").unwrap_err();
    assert!(err.to_string().contains("Failed to read script"));
}
