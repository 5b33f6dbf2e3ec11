mod common;

use std::path::PathBuf;

use common::{click, player, scenes, started};
use novella_core::executor::PlayerState;
use novella_core::storager;

const SCRIPT: &str = "\
@set $n = 1
@image_in logo 3 4
@if $n == 1
in-branch
still
@endif
after
";

fn temp_save(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("novella-storager-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("temp dir");
    dir.join(name)
}

#[test]
fn test_save_and_load_round_trip() {
    let path = temp_save("round_trip.sav");

    let mut p = started(SCRIPT);
    click(&mut p);
    assert_eq!(p.stage().target_message, "still");
    storager::save(&path, &p).expect("save");

    let mut q = player();
    q.start(scenes(SCRIPT), 0);
    assert_eq!(q.stage().target_message, "in-branch");
    storager::load(&path, &mut q).expect("load");

    assert_eq!(q.state(), PlayerState::WaitingForClick);
    assert_eq!(q.stage().target_message, "still");
    assert_eq!(q.call_depth(), 1);
    assert_eq!(q.variables()["$n"], "1");
    assert_eq!((q.stage().objects["logo"].x, q.stage().objects["logo"].y), (3, 4));

    let texts: Vec<&str> = q.stage().history.iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["in-branch", "still"]);

    click(&mut q);
    assert_eq!(q.stage().target_message, "after");
    assert_eq!(q.call_depth(), 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_restore_settles_effects() {
    let mut p = started("@image_in logo\n@chara_in fx smile 0 0 500\n@flash #FFFFFF 500\nhold\n");
    assert_eq!(p.stage().objects["fx"].alpha, 0.0);
    let save = p.snapshot();

    let mut q = player();
    q.start(scenes("@image_in logo\n@chara_in fx smile 0 0 500\n@flash #FFFFFF 500\nhold\n"), 0);
    q.restore(save).expect("restore");
    assert_eq!(q.stage().transition_alpha, 0.0);
    assert_eq!(q.stage().objects["fx"].alpha, 1.0);
    assert_eq!(q.stage().history.len(), 1);
}

#[test]
fn test_restore_into_other_script_fails() {
    let mut p = started(SCRIPT);
    click(&mut p);
    let save = p.snapshot();

    let mut q = started("just one line\n");
    assert!(q.restore(save).is_err());
    assert_eq!(q.stage().target_message, "just one line");
}

#[test]
fn test_load_missing_file_fails() {
    let mut p = started(SCRIPT);
    let err = storager::load(temp_save("does_not_exist.sav"), &mut p).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to open save file"));
}

#[test]
fn test_restore_delay_resumes_countdown() {
    let mut p = started("@wait 100\nafter\n");
    p.tick();
    let save = p.snapshot();
    assert_eq!(save.state, PlayerState::Delaying { remaining_ms: 84 });

    let mut q = started("@wait 100\nafter\n");
    q.restore(save).expect("restore");
    assert_eq!(q.state(), PlayerState::Delaying { remaining_ms: 84 });
    for _ in 0..6 {
        q.tick();
    }
    assert_eq!(q.stage().target_message, "after");
}

fn restored(src: &str, ticks_before: usize) -> novella_core::Player {
    let mut p = started(src);
    for _ in 0..ticks_before {
        p.tick();
    }
    let save = p.snapshot();
    let mut q = started(src);
    q.restore(save).expect("restore");
    q
}

#[test]
fn test_restore_lands_pending_crossfade() {
    let mut q = restored("@bg room\n@bg hall 2000\nhold\n", 0);
    assert_eq!(q.stage().background_name, "hall");
    for _ in 0..400 {
        q.tick();
    }
    assert_eq!(q.stage().background_name, "hall");
}

#[test]
fn test_restore_completes_fade_out() {
    let mut q = restored("@image_in logo\n@image_out logo 2000\nhold\n", 1);
    assert!(!q.stage().objects.contains_key("logo"));
    for _ in 0..400 {
        q.tick();
    }
    assert!(q.stage().objects.is_empty());
}

#[test]
fn test_snapshot_writes_tween_targets() {
    let src = "@image_in logo\n@move logo 100 50 1000\n@rotate logo 90 1000\nhold\n";
    let mut p = started(src);
    p.tick();
    assert_ne!(p.stage().objects["logo"].x, 100);

    let save = p.snapshot();
    let logo = &save.ctx.stage.objects["logo"];
    assert_eq!((logo.x, logo.y), (100, 50));
    assert_eq!(logo.rotation, 90.0);
    assert_ne!(p.stage().objects["logo"].x, 100);

    let mut q = started(src);
    q.restore(save).expect("restore");
    assert_eq!(q.stage().objects["logo"].x, 100);
}
