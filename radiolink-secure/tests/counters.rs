use proptest::prelude::*;
use radiolink_secure::{
    ByteStore, CounterRecord, MemoryStore, MessageCounter, NodeId, PersistentCounters, RecordFault,
    ResetMode, RestartCounter, RxCounterStore, SecureErrorKind, StorageLayout, TxCounterSource,
};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

const PEER: NodeId = NodeId::new([0x81, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);

/// A store that silently drops every write after `budget` have landed,
/// as if power failed part way through.
struct TornStore {
    inner: MemoryStore<128>,
    budget: usize,
}

impl ByteStore for TornStore {
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn read_byte(&self, addr: u16) -> u8 {
        self.inner.read_byte(addr)
    }

    fn write_byte_if_different(&mut self, addr: u16, value: u8) {
        if self.inner.read_byte(addr) == value {
            return;
        }
        if self.budget > 0 {
            self.budget -= 1;
            self.inner.write_byte_if_different(addr, value);
        }
    }

    fn erase_byte(&mut self, addr: u16) {
        if self.inner.read_byte(addr) == 0xff {
            return;
        }
        if self.budget > 0 {
            self.budget -= 1;
            self.inner.erase_byte(addr);
        }
    }
}

fn counter(value: u64) -> MessageCounter {
    MessageCounter::from_u64(value).unwrap()
}

fn open<S: ByteStore>(store: S) -> PersistentCounters<S, ChaCha8Rng> {
    PersistentCounters::new(store, StorageLayout::compact(1), ChaCha8Rng::seed_from_u64(0)).unwrap()
}

fn torn(inner: MemoryStore<128>, budget: usize) -> PersistentCounters<TornStore, ChaCha8Rng> {
    open(TornStore { inner, budget })
}

/// Place a complete record at `addr` by poking raw bytes.
fn put_record<const N: usize>(store: &mut MemoryStore<128>, addr: u16, value: &[u8; N]) {
    let record = CounterRecord::encode(value);
    let addr = usize::from(addr);
    store.bytes_mut()[addr..addr + N].copy_from_slice(record.counter_bytes());
    store.bytes_mut()[addr + N] = record.check_byte();
}

fn with_restart(value: [u8; 3]) -> MemoryStore<128> {
    let layout = StorageLayout::compact(1);
    let mut store = MemoryStore::new();
    put_record(&mut store, layout.tx_restart_primary, &value);
    put_record(&mut store, layout.tx_restart_secondary, &value);
    store
}

fn associated_store(last: u64) -> MemoryStore<128> {
    let mut counters = open(MemoryStore::new());
    counters.add_association(&PEER).unwrap();
    if last > 0 {
        counters.commit_rx_counter(&PEER, &counter(last)).unwrap();
    }
    counters.into_store()
}

#[test]
fn erased_storage_is_counter_zero() {
    let counters = open(MemoryStore::<128>::new());
    assert_eq!(counters.restart_counter(), Ok(RestartCounter::ZERO));
    let record = CounterRecord::<6>::from_bytes(&[0xff; 7]).unwrap();
    assert_eq!(record.decode(), Ok([0; 6]));
}

#[test]
fn torn_rx_commit_reads_old_or_new() {
    let old = 0x0000_0001_00ff;
    let new = 0x0000_0001_0100;
    let mut budget = 0;
    loop {
        let mut counters = torn(associated_store(old), budget);
        counters.commit_rx_counter(&PEER, &counter(new)).unwrap();
        let complete = counters.store().budget > 0;
        let seen = counters.last_rx_counter(&PEER).unwrap().to_u64();
        assert!(seen == old || seen == new, "budget {budget}: read {seen:#x}");
        if complete {
            assert_eq!(seen, new);
            break;
        }
        budget += 1;
    }
    assert!(budget > 4);
}

#[test]
fn torn_restart_increment_reads_old_or_new() {
    for budget in 0..16 {
        let mut counters = torn(with_restart([0x00, 0x0f, 0xff]), budget);
        counters.increment_restart_counter().unwrap();
        let seen = counters.restart_counter().unwrap().to_u32();
        assert!(seen == 0x000f_ff || seen == 0x0010_00, "budget {budget}: read {seen:#x}");
    }
}

#[test]
fn torn_association_add_never_leaves_a_partial_slot() {
    let mut budget = 0;
    loop {
        let mut counters = torn(MemoryStore::new(), budget);
        counters.add_association(&PEER).unwrap();
        let complete = counters.store().budget > 0;

        // Only the whole ID may ever occupy the slot.
        match counters.association(0) {
            Some(id) => assert_eq!(id, PEER, "budget {budget}"),
            None => assert!(!complete, "budget {budget}"),
        }
        assert!(counters.association_count() <= 1, "budget {budget}");

        // Power comes back and the add is retried.
        counters.store_mut().budget = usize::MAX;
        assert_eq!(counters.add_association(&PEER), Ok(0), "budget {budget}");
        assert_eq!(counters.association_count(), 1, "budget {budget}");
        assert_eq!(counters.candidates(&[0x81]).as_slice(), &[PEER]);
        assert_eq!(counters.last_rx_counter(&PEER), Ok(MessageCounter::ZERO));

        if complete {
            break;
        }
        budget += 1;
    }
    assert!(budget >= 8);
}

#[test]
fn single_bit_flip_in_either_copy_is_survived() {
    let layout = StorageLayout::compact(1);
    let value = 0x0012_3456_789a;
    for addr in [layout.rx_primary(0), layout.rx_secondary(0)] {
        for byte in 0..7u16 {
            for bit in 0..8 {
                let mut store = associated_store(value);
                store.bytes_mut()[usize::from(addr + byte)] ^= 1 << bit;
                assert_eq!(
                    open(store).last_rx_counter(&PEER).unwrap().to_u64(),
                    value,
                    "addr {addr} byte {byte} bit {bit}"
                );
            }
        }
    }
}

#[test]
fn both_copies_corrupt_is_not_zero() {
    let layout = StorageLayout::compact(1);
    let mut store = associated_store(9);
    store.bytes_mut()[usize::from(layout.rx_primary(0))] ^= 0x10;
    store.bytes_mut()[usize::from(layout.rx_secondary(0))] ^= 0x10;
    let mut counters = open(store);
    let err = counters.last_rx_counter(&PEER).unwrap_err();
    assert_eq!(err.kind, SecureErrorKind::CounterUnavailable);
    let err = counters.commit_rx_counter(&PEER, &counter(10)).unwrap_err();
    assert_eq!(err.kind, SecureErrorKind::CounterUnavailable);
}

#[test]
fn torn_record_reports_incomplete_write() {
    let record = CounterRecord::encode(&[0, 0, 0, 0, 0, 5]);
    let torn = CounterRecord::from_parts(*record.counter_bytes(), record.in_progress_check());
    assert_eq!(torn.decode(), Err(RecordFault::WriteIncomplete));
}

#[test]
fn restart_increment_at_top_of_range() {
    let mut counters = open(with_restart([0xff, 0xff, 0xfe]));
    assert_eq!(counters.increment_restart_counter(), Ok(RestartCounter::MAX));
    let snapshot = *counters.store().as_bytes();
    let err = counters.increment_restart_counter().unwrap_err();
    assert_eq!(err.kind, SecureErrorKind::CounterExhausted);
    assert_eq!(counters.store().as_bytes(), &snapshot);
}

#[test]
fn tx_session_can_use_last_restart_value() {
    let mut counters = open(with_restart([0xff, 0xff, 0xfe]));
    let first = counters.next_tx_counter().unwrap();
    assert_eq!(first.restart(), RestartCounter::MAX);
    assert!(first < MessageCounter::MAX);
}

#[test]
fn reset_entropy_mode_never_yields_zero() {
    let layout = StorageLayout::compact(1);
    for seed in 0..64 {
        let mut counters = PersistentCounters::new(
            MemoryStore::<64>::new(),
            layout,
            ChaCha8Rng::seed_from_u64(seed),
        )
        .unwrap();
        let value = counters.reset_restart_counter(ResetMode::Entropy).unwrap();
        assert!(value.to_u32() >= 1 && value.to_u32() <= 0xff);
        let next = counters.next_tx_counter().unwrap();
        assert_eq!(next.restart().to_u32(), value.to_u32() + 1);
    }
}

#[test]
fn rx_commit_requires_strictly_greater() {
    let mut counters = open(associated_store(0));
    let c = counter(0x0000_0200_0000);
    counters.commit_rx_counter(&PEER, &c).unwrap();
    let err = counters.commit_rx_counter(&PEER, &c).unwrap_err();
    assert_eq!(err.kind, SecureErrorKind::Replay);
    let err = counters.commit_rx_counter(&PEER, &counter(1)).unwrap_err();
    assert_eq!(err.kind, SecureErrorKind::Replay);
    counters.commit_rx_counter(&PEER, &counter(0x0000_0200_0001)).unwrap();
    assert_eq!(counters.last_rx_counter(&PEER).unwrap().to_u64(), 0x0000_0200_0001);
}

#[test]
fn rx_commit_for_unknown_peer_fails() {
    let mut counters = open(MemoryStore::<128>::new());
    let err = counters.commit_rx_counter(&PEER, &counter(1)).unwrap_err();
    assert_eq!(err.kind, SecureErrorKind::UnknownPeer);
}

#[test]
fn layout_beyond_address_space_is_rejected() {
    let layout = StorageLayout {
        associations_start: 0xfff0,
        ..StorageLayout::default()
    };
    let err = PersistentCounters::new(MemoryStore::<1024>::new(), layout, ChaCha8Rng::seed_from_u64(0))
        .err()
        .unwrap();
    assert_eq!(err.kind, SecureErrorKind::InvalidLayout);
}

#[test]
fn association_slot_past_table_is_empty() {
    let mut store = associated_store(0);
    // ID-shaped bytes just past the one-slot table
    store.bytes_mut()[31..39].copy_from_slice(&[0x42, 1, 2, 3, 4, 5, 6, 7]);
    let counters = open(store);
    assert_eq!(counters.association(0), Some(PEER));
    assert_eq!(counters.association(1), None);
    assert_eq!(counters.association(3), None);
}

proptest! {
    #[test]
    fn restart_record_round_trips(value in 0u32..=0x00ff_ffff) {
        let bytes = RestartCounter::from_u32(value).unwrap();
        let record = CounterRecord::encode(bytes.as_bytes());
        prop_assert_eq!(record.decode(), Ok(*bytes.as_bytes()));
    }

    #[test]
    fn message_record_round_trips(value in 0u64..=0xffff_ffff_ffff) {
        let bytes = counter(value);
        let record = CounterRecord::encode(bytes.as_bytes());
        prop_assert_eq!(record.decode(), Ok(*bytes.as_bytes()));
    }

    #[test]
    fn tx_counters_never_repeat_across_reboots(seeds in proptest::collection::vec(any::<u64>(), 1..6)) {
        let layout = StorageLayout::compact(1);
        let mut store = MemoryStore::<64>::new();
        let mut last = MessageCounter::ZERO;
        for seed in seeds {
            let mut counters =
                PersistentCounters::new(store, layout, ChaCha8Rng::seed_from_u64(seed)).unwrap();
            for _ in 0..8 {
                let next = counters.next_tx_counter().unwrap();
                prop_assert!(next > last);
                last = next;
            }
            store = counters.into_store();
        }
    }
}
