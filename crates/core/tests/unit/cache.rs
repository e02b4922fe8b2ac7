//! Cache structure tests: address decomposition, LRU victim selection,
//! fill bookkeeping, and the snoop handlers in isolation.

use mesisim_core::cache::{Cache, CacheSet, EvictionKind, MesiState};
use mesisim_core::common::addr::AddrParts;
use mesisim_core::config::TimingConfig;

use crate::common::small_params;

fn small_cache(id: usize) -> Cache {
    Cache::new(id, small_params(), &TimingConfig::default())
}

#[test]
fn address_decomposition() {
    // s=1, b=2: [ tag | 1 set bit | 2 offset bits ]
    let parts = AddrParts::decompose(0x2a, 1, 2);
    assert_eq!(parts.offset, 0x2);
    assert_eq!(parts.set, 0);
    assert_eq!(parts.tag, 5);

    let parts = AddrParts::decompose(0x7, 1, 2);
    assert_eq!(parts.offset, 3);
    assert_eq!(parts.set, 1);
    assert_eq!(parts.tag, 0);
}

#[test]
fn replacement_prefers_unused_way() {
    let set = CacheSet::new(2);
    let (way, kind) = set.find_replacement();
    assert_eq!(way, 0);
    assert_eq!(kind, EvictionKind::None);
}

#[test]
fn replacement_picks_least_recently_used() {
    let mut cache = small_cache(0);
    // Fill both ways of set 0 (tags differ, same set).
    cache.fill(0x00, 5, MesiState::Exclusive, false);
    cache.fill(0x10, 9, MesiState::Exclusive, false);
    // Refresh the older line; the other way becomes the victim.
    cache.begin_read(0x00, 20);
    let evicted = cache.fill(0x20, 21, MesiState::Exclusive, false);
    assert_eq!(evicted, EvictionKind::Clean);
    assert_eq!(cache.state_of(0x00), MesiState::Exclusive);
    assert_eq!(cache.state_of(0x10), MesiState::Invalid);
}

#[test]
fn lru_tie_breaks_to_lowest_way() {
    let mut cache = small_cache(0);
    // Both lines installed on the same cycle: way 0 must lose.
    cache.fill(0x00, 0, MesiState::Exclusive, false);
    cache.fill(0x10, 0, MesiState::Exclusive, false);
    cache.fill(0x20, 1, MesiState::Exclusive, false);
    assert_eq!(cache.state_of(0x00), MesiState::Invalid);
    assert_eq!(cache.state_of(0x10), MesiState::Exclusive);
    assert_eq!(cache.state_of(0x20), MesiState::Exclusive);
}

#[test]
fn dirty_eviction_counts_writeback() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Modified, true);
    cache.fill(0x10, 1, MesiState::Exclusive, false);
    let evicted = cache.fill(0x20, 2, MesiState::Exclusive, false);
    assert_eq!(evicted, EvictionKind::Dirty);
    assert_eq!(cache.stats.evictions, 1);
    assert_eq!(cache.stats.writebacks, 1);
}

#[test]
fn clean_eviction_does_not_count_writeback() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Exclusive, false);
    cache.fill(0x10, 1, MesiState::Exclusive, false);
    cache.fill(0x20, 2, MesiState::Exclusive, false);
    assert_eq!(cache.stats.evictions, 1);
    assert_eq!(cache.stats.writebacks, 0);
}

#[test]
fn snoop_read_downgrades_modified_and_clears_dirty() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Modified, true);
    // 4-byte block at 2 cycles per word.
    assert_eq!(cache.snoop_read(0x00), Some(2));
    let line = cache.line(0x00).expect("line present");
    assert_eq!(line.state, MesiState::Shared);
    assert!(!line.dirty);
}

#[test]
fn snoop_read_supplies_from_shared_without_state_change() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Shared, false);
    assert_eq!(cache.snoop_read(0x00), Some(2));
    assert_eq!(cache.state_of(0x00), MesiState::Shared);
}

#[test]
fn snoop_read_misses_return_nothing() {
    let mut cache = small_cache(0);
    assert_eq!(cache.snoop_read(0x00), None);
}

#[test]
fn snoop_write_invalidates_shared_and_exclusive_only() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Exclusive, false);
    assert!(cache.snoop_write(0x00));
    assert_eq!(cache.state_of(0x00), MesiState::Invalid);
    // Already invalid: no further downgrade to report.
    assert!(!cache.snoop_write(0x00));
}

#[test]
fn snoop_upgrade_only_touches_shared() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Modified, true);
    assert!(!cache.snoop_upgrade(0x00));
    assert_eq!(cache.state_of(0x00), MesiState::Modified);

    let mut cache = small_cache(1);
    cache.fill(0x00, 0, MesiState::Shared, false);
    assert!(cache.snoop_upgrade(0x00));
    assert_eq!(cache.state_of(0x00), MesiState::Invalid);
}

#[test]
fn invalidated_line_does_not_hit() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Exclusive, false);
    cache.snoop_write(0x00);
    assert!(matches!(
        cache.begin_read(0x00, 1),
        mesisim_core::cache::LocalAccess::Miss
    ));
    assert_eq!(cache.stats.read_misses, 1);
}

#[test]
fn refill_after_invalidation_reclaims_the_same_line() {
    let mut cache = small_cache(0);
    cache.fill(0x00, 0, MesiState::Exclusive, false);
    cache.fill(0x10, 1, MesiState::Exclusive, false); // set 0 now full
    cache.snoop_write(0x00); // a peer write drops our copy

    let evicted = cache.fill(0x00, 2, MesiState::Modified, true);
    assert_eq!(evicted, EvictionKind::None);
    assert_eq!(cache.stats.evictions, 0);
    assert_eq!(cache.state_of(0x00), MesiState::Modified);
    // The unrelated resident line is untouched.
    assert_eq!(cache.state_of(0x10), MesiState::Exclusive);
}

#[test]
fn miss_rate_is_zero_before_any_access() {
    let cache = small_cache(0);
    assert_eq!(cache.stats.miss_rate(), 0.0);
}

#[test]
fn mesi_state_display() {
    assert_eq!(MesiState::Modified.to_string(), "M");
    assert_eq!(MesiState::Exclusive.to_string(), "E");
    assert_eq!(MesiState::Shared.to_string(), "S");
    assert_eq!(MesiState::Invalid.to_string(), "I");
}
