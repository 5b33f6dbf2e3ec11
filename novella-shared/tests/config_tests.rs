use novella_shared::config;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
struct Player {
    tick_ms: u32,
    name: String,
}

impl Default for Player {
    fn default() -> Self {
        Self { tick_ms: 16, name: "default".into() }
    }
}

#[test]
fn sections_fall_back_to_defaults() {
    config::init_from_str(
        r#"
[player]
tick_ms = 33

[broken]
tick_ms = "fast"
"#,
    )
    .unwrap();
    assert!(config::is_initialized());
    assert!(config::init_from_str("").is_err());

    let player: Player = config::get("player");
    assert_eq!(player, Player { tick_ms: 33, name: "default".into() });

    let missing: Player = config::get("nowhere");
    assert_eq!(missing, Player::default());

    let broken: Player = config::get("broken");
    assert_eq!(broken, Player::default());
}
