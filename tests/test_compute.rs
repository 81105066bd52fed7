use ribbon_shooter::compute::*;
use ribbon_shooter::config::Settings;
use ribbon_shooter::entities::*;
use ribbon_shooter::error::GameError;
use ribbon_shooter::input::{Action, KeyStatus};

fn new_game() -> Game {
    Game::new(Settings::default(), SpriteSizes::default()).unwrap()
}

fn holding(actions: &[Action]) -> KeyStatus {
    let mut keys = KeyStatus::default();
    for action in actions {
        keys.set(*action, true);
    }
    keys
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn new_game_spawns_first_wave_in_a_grid() {
    let game = new_game();
    assert_eq!(game.waves, 1);
    assert_eq!(game.score, 0);
    assert_eq!(game.hostiles.live_count(), 18);

    // 6 columns, 36 wide + 25 gap; rows stacked upward by 1.5 heights
    let columns = [100.0, 161.0, 222.0, 283.0, 344.0, 405.0];
    let rows = [-30.0, -75.0, -120.0];
    for row in rows {
        let mut xs: Vec<f32> = game
            .hostiles
            .live()
            .filter(|h| h.rect.y == row)
            .map(|h| h.rect.x)
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(xs, columns.to_vec(), "row at y={row}");
    }
}

#[test]
fn ribbon_starts_bottom_middle_inside_canvas() {
    let game = new_game();
    let rect = game.player.entity.rect;
    assert_eq!(rect.x, 262.0); // 600 / 2 - 38
    assert_eq!(rect.y, 324.0); // clamped to 360 - 36
    assert!(game.player.entity.alive);
    assert_eq!(game.player.bullets.live_count(), 0);
}

#[test]
fn invalid_settings_fail_fast() {
    let settings = Settings {
        canvas_width: 0.0,
        ..Settings::default()
    };
    let err = Game::new(settings, SpriteSizes::default()).unwrap_err();
    assert!(matches!(err, GameError::InvalidConfig(_)));
}

// ── Wave exhaustion ───────────────────────────────────────────────────────────

#[test]
fn empty_hostile_pool_triggers_one_respawn() {
    let mut game = new_game();
    game.hostiles.reset();

    let report = game.tick(&KeyStatus::default());
    assert!(report.wave_spawned);
    assert_eq!(game.waves, 2);
    assert_eq!(game.hostiles.live_count(), 18);
    assert!(game.hostiles.live().all(|h| h.alive));

    let report = game.tick(&KeyStatus::default());
    assert!(!report.wave_spawned);
    assert_eq!(game.waves, 2);
}

#[test]
fn live_hostiles_suppress_respawn() {
    let mut game = new_game();
    for _ in 0..50 {
        assert!(!game.tick(&KeyStatus::default()).wave_spawned);
    }
    assert_eq!(game.waves, 1);
}

// ── Collisions through the frame ──────────────────────────────────────────────

#[test]
fn bullet_hitting_hostile_destroys_both_and_scores() {
    let mut game = new_game();
    game.hostiles.reset();
    assert!(game.hostiles.acquire(300.0, 100.0, 0.0));
    assert!(game.player.bullets.acquire(305.0, 105.0, 0.0));

    let report = game.tick(&KeyStatus::default());
    assert_eq!(report.flagged, 2);
    assert_eq!(report.destroyed, 1);
    assert!(!report.wave_spawned);
    assert_eq!(game.score, 1);
    assert_eq!(game.hostiles.live_count(), 0);
    assert_eq!(game.player.bullets.live_count(), 0);

    // No stale flags survive recycling
    assert!(game.hostiles.slots().iter().all(|e| !e.is_colliding));
    assert!(game.player.bullets.slots().iter().all(|e| !e.is_colliding));

    // The emptied pool brings the next wave
    assert!(game.tick(&KeyStatus::default()).wave_spawned);
}

#[test]
fn near_miss_leaves_everything_alive() {
    let mut game = new_game();
    game.hostiles.reset();
    game.hostiles.acquire(300.0, 100.0, 0.0);
    game.player.bullets.acquire(200.0, 200.0, 0.0);

    let report = game.tick(&KeyStatus::default());
    assert_eq!(report.flagged, 0);
    assert_eq!(game.score, 0);
    assert_eq!(game.hostiles.live_count(), 1);
    assert_eq!(game.player.bullets.live_count(), 1);
}

#[test]
fn ribbon_is_indexed_but_never_flagged() {
    let mut game = new_game();
    game.hostiles.reset();
    let ribbon = game.player.entity.rect;
    game.hostiles.acquire(ribbon.x, ribbon.y, 0.0);

    let report = game.tick(&KeyStatus::default());
    assert_eq!(report.flagged, 0);
    assert!(!game.player.entity.is_colliding);
    assert_eq!(game.quadtree().all().len(), 2);
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn ribbon_moves_and_clamps_horizontally() {
    let mut game = new_game();
    game.tick(&holding(&[Action::Left]));
    assert_eq!(game.player.entity.rect.x, 259.0);

    for _ in 0..200 {
        game.tick(&holding(&[Action::Left]));
    }
    assert_eq!(game.player.entity.rect.x, 0.0);

    for _ in 0..300 {
        game.tick(&holding(&[Action::Right]));
    }
    assert_eq!(game.player.entity.rect.x, 562.0); // 600 - 38
}

#[test]
fn ribbon_stays_in_bottom_quarter() {
    let mut game = new_game();
    for _ in 0..100 {
        game.tick(&holding(&[Action::Up]));
    }
    assert_eq!(game.player.entity.rect.y, 270.0);
    for _ in 0..100 {
        game.tick(&holding(&[Action::Down]));
    }
    assert_eq!(game.player.entity.rect.y, 324.0);
}

#[test]
fn movement_takes_first_held_direction_only() {
    let mut game = new_game();
    game.tick(&holding(&[Action::Left, Action::Up]));
    assert_eq!(game.player.entity.rect.x, 259.0);
    assert_eq!(game.player.entity.rect.y, 324.0);
}

#[test]
fn firing_is_rate_limited_and_paired() {
    let settings = Settings::default();
    let mut game = new_game();
    let keys = holding(&[Action::Fire]);

    for _ in 0..settings.fire_rate - 1 {
        game.player.update(&keys, &settings);
    }
    assert_eq!(game.player.bullets.live_count(), 0);

    game.player.update(&keys, &settings);
    assert_eq!(game.player.bullets.live_count(), 2);
    let mut xs: Vec<f32> = game.player.bullets.live().map(|b| b.rect.x).collect();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(xs, vec![264.0, 291.0]); // x + 2 and x + 38 - 7 - 2
    assert!(game.player.bullets.live().all(|b| b.rect.y == 316.0));

    // Counter restarted: the next shot needs another full interval
    game.player.update(&keys, &settings);
    assert_eq!(game.player.bullets.live_count(), 2);
}

#[test]
fn colliding_ribbon_cannot_fire() {
    let settings = Settings::default();
    let mut game = new_game();
    game.player.entity.is_colliding = true;
    for _ in 0..50 {
        game.player.update(&holding(&[Action::Fire]), &settings);
    }
    assert_eq!(game.player.bullets.live_count(), 0);
}

#[test]
fn fire_stops_when_bullet_pool_is_full() {
    let mut game = new_game();
    let fired = (0..20).filter(|_| game.player.fire(3.0)).count();
    assert_eq!(fired, 15);
    assert_eq!(game.player.bullets.live_count(), 30);
}

// ── Background & restart ──────────────────────────────────────────────────────

#[test]
fn background_pans_and_wraps() {
    let mut game = new_game();
    for _ in 0..10 {
        game.tick(&KeyStatus::default());
    }
    assert_eq!(game.background.offset(), 10.0);
    for _ in 0..350 {
        game.tick(&KeyStatus::default());
    }
    assert_eq!(game.background.offset(), 0.0);
}

#[test]
fn restart_returns_to_opening_state() {
    let mut game = new_game();
    for _ in 0..40 {
        game.tick(&holding(&[Action::Fire, Action::Left]));
    }
    game.score = 7;
    game.restart();

    assert_eq!(game.score, 0);
    assert_eq!(game.frame, 0);
    assert_eq!(game.waves, 1);
    assert_eq!(game.hostiles.live_count(), 18);
    assert_eq!(game.player.bullets.live_count(), 0);
    assert_eq!(game.player.entity.rect.x, 262.0);
    assert_eq!(game.background.offset(), 0.0);
}
