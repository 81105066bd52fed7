use ribbon_shooter::entities::*;
use ribbon_shooter::error::GameError;
use ribbon_shooter::pool::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn bullets(capacity: usize) -> Pool {
    Pool::new(EntityKind::Bullet, capacity, &SpriteSizes::default()).unwrap()
}

/// Live slots form a prefix: once a dead slot is seen, none after it is alive.
fn assert_contiguous(pool: &Pool) {
    let slots = pool.slots();
    let live = slots.iter().take_while(|e| e.alive).count();
    assert!(
        slots[live..].iter().all(|e| !e.alive),
        "live entities not contiguous: {:?}",
        slots.iter().map(|e| e.alive).collect::<Vec<_>>()
    );
}

// ── Construction ──────────────────────────────────────────────────────────────

#[test]
fn new_pool_is_all_dead() {
    let pool = bullets(30);
    assert_eq!(pool.capacity(), 30);
    assert_eq!(pool.live_count(), 0);
    assert!(pool.is_exhausted());
    assert!(pool.slots().iter().all(|e| e.kind == EntityKind::Bullet));
    assert!(pool.slots().iter().all(|e| e.rect.width == 7.0 && e.rect.height == 7.0));
}

#[test]
fn unpoolable_kind_is_rejected() {
    let err = Pool::new(EntityKind::Ribbon, 30, &SpriteSizes::default()).unwrap_err();
    assert!(matches!(err, GameError::UnsupportedPoolKind(EntityKind::Ribbon)));
    let err = Pool::new(EntityKind::Background, 30, &SpriteSizes::default()).unwrap_err();
    assert!(matches!(err, GameError::UnsupportedPoolKind(EntityKind::Background)));
}

#[test]
fn zero_capacity_is_rejected() {
    let err = Pool::new(EntityKind::Hostile, 0, &SpriteSizes::default()).unwrap_err();
    assert!(matches!(err, GameError::InvalidConfig(_)));
}

// ── acquire ───────────────────────────────────────────────────────────────────

#[test]
fn acquire_spawns_at_front() {
    let mut pool = bullets(3);
    assert!(pool.acquire(1.0, 2.0, 3.0));
    assert!(pool.acquire(4.0, 5.0, 3.0));

    let slots = pool.slots();
    assert_eq!((slots[0].rect.x, slots[0].rect.y), (4.0, 5.0)); // newest first
    assert_eq!((slots[1].rect.x, slots[1].rect.y), (1.0, 2.0));
    assert!(!slots[2].alive);
}

#[test]
fn acquire_fails_silently_when_saturated() {
    let mut pool = bullets(3);
    for _ in 0..3 {
        assert!(pool.acquire(0.0, 100.0, 1.0));
    }
    let before: Vec<Entity> = pool.slots().to_vec();
    assert!(!pool.acquire(50.0, 50.0, 1.0));
    assert_eq!(pool.slots(), &before[..]);
}

#[test]
fn capacity_is_never_exceeded() {
    let mut pool = bullets(30);
    let accepted = (0..100).filter(|&i| pool.acquire(i as f32, 100.0, 1.0)).count();
    assert_eq!(accepted, 30);
    assert_eq!(pool.live_count(), 30);
}

// ── acquire_pair ──────────────────────────────────────────────────────────────

#[test]
fn acquire_pair_spawns_both() {
    let mut pool = bullets(4);
    assert!(pool.acquire_pair((1.0, 100.0, 3.0), (2.0, 100.0, 3.0)));
    assert_eq!(pool.live_count(), 2);
}

#[test]
fn acquire_pair_refuses_when_only_one_slot_free() {
    let mut pool = bullets(3);
    assert!(pool.acquire(0.0, 100.0, 1.0));
    assert!(pool.acquire(0.0, 100.0, 1.0));
    assert!(!pool.acquire_pair((1.0, 100.0, 3.0), (2.0, 100.0, 3.0)));
    assert_eq!(pool.live_count(), 2);
}

#[test]
fn acquire_pair_on_single_slot_pool_never_succeeds() {
    let mut pool = bullets(1);
    assert!(!pool.acquire_pair((1.0, 100.0, 3.0), (2.0, 100.0, 3.0)));
    assert_eq!(pool.live_count(), 0);
}

// ── advance ───────────────────────────────────────────────────────────────────

#[test]
fn advance_moves_live_entities() {
    let mut pool = bullets(3);
    pool.acquire(10.0, 100.0, 3.0);
    assert_eq!(pool.advance(), 0);
    assert_eq!(pool.slots()[0].rect.y, 97.0);
}

#[test]
fn advance_recycles_finished_entities_to_the_back() {
    let mut pool = bullets(4);
    pool.acquire(1.0, 100.0, 3.0);
    pool.acquire(2.0, -5.0, 3.0); // leaves the canvas on the next step
    pool.acquire(3.0, 100.0, 3.0);
    pool.advance();

    assert_eq!(pool.live_count(), 2);
    assert_contiguous(&pool);
    let xs: Vec<f32> = pool.live().map(|e| e.rect.x).collect();
    assert_eq!(xs, vec![3.0, 1.0]);
}

#[test]
fn advance_does_not_skip_the_entity_shifted_into_a_freed_slot() {
    let mut pool = bullets(3);
    for x in 0..3 {
        pool.acquire(x as f32, -5.0, 3.0);
    }
    pool.advance();
    assert_eq!(pool.live_count(), 0);
}

#[test]
fn advance_counts_colliding_entities_destroyed() {
    let mut pool = Pool::new(EntityKind::Hostile, 5, &SpriteSizes::default()).unwrap();
    for x in 0..3 {
        pool.acquire(100.0 + x as f32 * 50.0, 0.0, 2.0);
    }
    pool.get_mut(1).unwrap().is_colliding = true;
    assert_eq!(pool.advance(), 1);
    assert_eq!(pool.live_count(), 2);
    assert!(pool.slots().iter().all(|e| !e.is_colliding));
}

#[test]
fn snapshot_lists_live_slots_in_order() {
    let mut pool = bullets(5);
    pool.acquire(1.0, 100.0, 3.0);
    pool.acquire(2.0, 100.0, 3.0);
    let snapshot = pool.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].0, 0);
    assert_eq!(snapshot[0].1.rect.x, 2.0);
    assert_eq!(snapshot[1].0, 1);
    assert_eq!(snapshot[1].1.rect.x, 1.0);
}

#[test]
fn reset_kills_everything() {
    let mut pool = bullets(5);
    for _ in 0..5 {
        pool.acquire(1.0, 100.0, 3.0);
    }
    pool.reset();
    assert!(pool.is_exhausted());
    assert!(pool.acquire(1.0, 100.0, 3.0));
}

// ── Invariants under random operation sequences ──────────────────────────────

#[test]
fn random_operations_keep_pool_contiguous_and_bounded() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut pool = bullets(30);

    for _ in 0..5_000 {
        let before = pool.live_count();
        match rng.gen_range(0..4) {
            0 => {
                let y = rng.gen_range(-10.0..360.0);
                pool.acquire(rng.gen_range(0.0..600.0), y, rng.gen_range(1.0..20.0));
            }
            1 => {
                let y = rng.gen_range(-10.0..360.0);
                let ok = pool.acquire_pair((10.0, y, 3.0), (20.0, y, 3.0));
                let spawned = pool.live_count() - before;
                assert_eq!(spawned, if ok { 2 } else { 0 });
            }
            2 => {
                pool.advance();
            }
            _ => {
                let live = pool.live_count();
                if live > 0 {
                    let slot = rng.gen_range(0..live);
                    pool.get_mut(slot).unwrap().is_colliding = true;
                }
            }
        }
        assert_contiguous(&pool);
        assert!(pool.live_count() <= pool.capacity());
    }
}
