//! Tests for the resolution table
//!
//! These tests verify:
//! - Lock-free resolve against the current snapshot
//! - Publish as a single observable step (union semantics)
//! - Readers racing a publish never see a partial batch

use std::sync::atomic::{AtomicBool, Ordering};

use cairn::resolution::{FlushDelta, ResolutionTable};
use cairn::Address;

// =============================================================================
// Helper Functions
// =============================================================================

fn novelty(value: u64) -> Address {
    Address::novelty(value).unwrap()
}

fn persisted(high: u64) -> Address {
    Address::persisted(high, (-1i64) as u64).unwrap()
}

fn delta(pairs: &[(u64, u64)]) -> FlushDelta {
    FlushDelta {
        promoted: pairs
            .iter()
            .map(|&(n, h)| (novelty(n), persisted(h)))
            .collect(),
    }
}

// =============================================================================
// Resolve/Publish Tests
// =============================================================================

#[test]
fn test_empty_table_resolves_nothing() {
    let table = ResolutionTable::new();

    assert!(table.is_empty());
    assert!(table.resolve(&novelty(0)).is_none());
}

#[test]
fn test_publish_then_resolve() {
    let table = ResolutionTable::new();
    table.publish(&delta(&[(0, 10), (1, 11)]));

    assert_eq!(table.resolve(&novelty(0)), Some(persisted(10)));
    assert_eq!(table.resolve(&novelty(1)), Some(persisted(11)));
    assert!(table.resolve(&novelty(2)).is_none());
    assert_eq!(table.len(), 2);
}

#[test]
fn test_publish_unions_with_previous_snapshot() {
    let table = ResolutionTable::new();

    table.publish(&delta(&[(0, 10)]));
    table.publish(&delta(&[(1, 11)]));

    // Entries from the earlier flush stay valid
    assert_eq!(table.resolve(&novelty(0)), Some(persisted(10)));
    assert_eq!(table.resolve(&novelty(1)), Some(persisted(11)));
}

#[test]
fn test_later_publish_wins_on_collision() {
    // A later transaction reissuing a low word remaps it at its flush
    let table = ResolutionTable::new();

    table.publish(&delta(&[(0, 10)]));
    table.publish(&delta(&[(0, 20)]));

    assert_eq!(table.resolve(&novelty(0)), Some(persisted(20)));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_publish_empty_delta_is_noop() {
    let table = ResolutionTable::new();
    table.publish(&FlushDelta::default());

    assert!(table.is_empty());
}

// =============================================================================
// FlushDelta Tests
// =============================================================================

#[test]
fn test_delta_resolve() {
    let d = delta(&[(3, 30), (4, 40)]);

    assert_eq!(d.resolve(&novelty(3)), Some(persisted(30)));
    assert!(d.resolve(&novelty(9)).is_none());
    assert_eq!(d.len(), 2);
    assert!(!d.is_empty());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_readers_never_see_partial_batch() {
    // Each publish carries a batch of 16 entries with the same generation
    // marker; a reader must either see all 16 or none of them.
    let table = ResolutionTable::new();
    let done = AtomicBool::new(false);

    crossbeam::thread::scope(|scope| {
        let table = &table;
        let done = &done;

        let writer = scope.spawn(move |_| {
            for generation in 0u64..50 {
                let base = generation * 16;
                let pairs: Vec<(u64, u64)> = (0..16).map(|i| (base + i, base + i + 1)).collect();
                table.publish(&delta(&pairs));
            }
            done.store(true, Ordering::SeqCst);
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(move |_| {
                    while !done.load(Ordering::SeqCst) {
                        let len = table.len();
                        // Whole batches only: the published count is always
                        // a multiple of the batch size.
                        assert_eq!(len % 16, 0);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    })
    .unwrap();

    assert_eq!(table.len(), 50 * 16);
}

#[test]
fn test_resolution_never_regresses_during_publishes() {
    let table = ResolutionTable::new();
    table.publish(&delta(&[(0, 10)]));

    let done = AtomicBool::new(false);

    crossbeam::thread::scope(|scope| {
        let table = &table;
        let done = &done;

        let writer = scope.spawn(move |_| {
            for generation in 1u64..200 {
                table.publish(&delta(&[(generation, generation + 10)]));
            }
            done.store(true, Ordering::SeqCst);
        });

        let reader = scope.spawn(move |_| {
            // The entry published before the writer started must stay
            // visible through every subsequent swap.
            while !done.load(Ordering::SeqCst) {
                assert_eq!(table.resolve(&novelty(0)), Some(persisted(10)));
            }
        });

        writer.join().unwrap();
        reader.join().unwrap();
    })
    .unwrap();
}
