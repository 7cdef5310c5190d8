use std::fs;

use blockfall::config::AppConfig;
use blockfall::core::GameState;
use blockfall::types::{GameStatus, GridSize, ModeId};

#[test]
fn config_file_drives_engine() {
    let dir = std::env::temp_dir().join(format!("blockfall-cfg-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("blockfall.toml");
    fs::write(
        &path,
        r#"
[game]
mode = "survival"
seed = 5

[grid]
rows = 12
cols = 8

[scores]
path = "elsewhere.json"
"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.mode, ModeId::Survival);
    assert_eq!(config.scores_path, std::path::PathBuf::from("elsewhere.json"));

    let mut game = GameState::with_config(config.engine);
    assert!(game.switch_mode(config.mode));
    assert!(game.start_game(game.mode()));
    assert_eq!(game.status(), GameStatus::Playing);
    assert_eq!(game.grid().size(), GridSize::new(12, 8));
    assert_eq!(game.active().unwrap().x, 2);

    fs::write(&path, "[grid]\nrows = [1, 2]\n").unwrap();
    assert!(AppConfig::load(&path).is_err());

    let _ = fs::remove_dir_all(&dir);
}
