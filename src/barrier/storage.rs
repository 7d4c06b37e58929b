use std::sync::atomic::{AtomicI64, AtomicU64, AtomicU8, Ordering};

/// Line size the per-core records are padded to.
pub const CACHE_LINE: usize = 64;

/// Byte lanes in one 64-bit barrier word; hard capacity of a flag group.
pub const LANES: usize = 8;

/// A 64-bit word used as eight independent one-byte flag lanes.
///
/// Exactly two operations exist: a thread stores into its own lane, and any
/// thread loads the whole word to compare it against a packed target. There
/// is no read-modify-write; each lane has a single writer, so the one-byte
/// stores never conflict and never tear.
pub struct LaneWord(AtomicU64);

impl LaneWord {
    pub const fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Store `value` into byte lane `lane`, leaving all other lanes alone.
    #[inline]
    pub fn set_lane(&self, lane: usize, value: u8) {
        debug_assert!(lane < LANES);

        // Single-writer lanes: re-viewing the word as AtomicU8 slots keeps
        // the store one byte wide without an atomic RMW on the whole word.
        let lanes = &self.0 as *const AtomicU64 as *const AtomicU8;
        unsafe { (*lanes.add(lane)).store(value, Ordering::Release) };
    }

    /// Load all eight lanes as one comparable value.
    #[inline]
    pub fn load(&self) -> u64 {
        self.0.load(Ordering::Acquire)
    }

    /// The word value in which the first `lanes` lanes hold `value` and the
    /// remaining lanes are zero.
    pub fn packed(lanes: usize, value: u8) -> u64 {
        debug_assert!(lanes <= LANES);

        let mut bytes = [0u8; LANES];
        for byte in bytes.iter_mut().take(lanes) {
            *byte = value;
        }

        u64::from_ne_bytes(bytes)
    }
}

/// Per-core state of the flag barrier.
///
/// Occupies one full cache line so neighboring cores' records never share
/// a line.
#[repr(C, align(64))]
pub struct CoreFlags {
    pub(super) arrive: LaneWord,
    pub(super) depart: LaneWord,
    _pad: [u64; 6],
}

impl CoreFlags {
    pub const fn new() -> Self {
        Self {
            arrive: LaneWord::new(),
            depart: LaneWord::new(),
            _pad: [0; 6],
        }
    }
}

/// Per-core state of the count barrier; same one-line layout as `CoreFlags`.
#[repr(C, align(64))]
pub struct CoreCounters {
    pub(super) arrive: AtomicI64,
    pub(super) depart: AtomicI64,
    _pad: [u64; 6],
}

impl CoreCounters {
    pub const fn new() -> Self {
        Self {
            arrive: AtomicI64::new(0),
            depart: AtomicI64::new(0),
            _pad: [0; 6],
        }
    }
}

const _: () = assert!(std::mem::size_of::<CoreFlags>() == CACHE_LINE);
const _: () = assert!(std::mem::align_of::<CoreFlags>() == CACHE_LINE);
const _: () = assert!(std::mem::size_of::<CoreCounters>() == CACHE_LINE);
const _: () = assert!(std::mem::align_of::<CoreCounters>() == CACHE_LINE);

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn records_fill_exactly_one_line() {
        assert_eq!(std::mem::size_of::<CoreFlags>(), CACHE_LINE);
        assert_eq!(std::mem::align_of::<CoreFlags>(), CACHE_LINE);
        assert_eq!(std::mem::size_of::<CoreCounters>(), CACHE_LINE);
        assert_eq!(std::mem::align_of::<CoreCounters>(), CACHE_LINE);
    }

    #[test]
    fn lane_stores_are_independent() {
        let word = LaneWord::new();
        assert_eq!(word.load(), 0);

        word.set_lane(0, 1);
        word.set_lane(3, 1);
        word.set_lane(7, 1);

        let mut expected = [0u8; LANES];
        expected[0] = 1;
        expected[3] = 1;
        expected[7] = 1;
        assert_eq!(word.load(), u64::from_ne_bytes(expected));

        word.set_lane(3, 0);
        expected[3] = 0;
        assert_eq!(word.load(), u64::from_ne_bytes(expected));
    }

    #[test]
    fn packed_matches_lane_stores() {
        assert_eq!(LaneWord::packed(0, 1), 0);

        for group in 1..=LANES {
            let word = LaneWord::new();
            for lane in 0..group {
                word.set_lane(lane, 1);
            }

            assert_eq!(word.load(), LaneWord::packed(group, 1));
        }
    }
}
