use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Arc,
};

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::trace;

pub type AccountNo = u32;
pub type CustomerId = u32;

/// Identifier namespace. Numbers are unique within a class, not across classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdClass {
    AccountNo,
    CustomerId,
}

/// Inclusive range identifiers are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRange {
    pub low: u32,
    pub high: u32,
}

impl IdRange {
    pub const fn new(low: u32, high: u32) -> Self {
        assert!(low <= high, "empty id range");
        Self { low, high }
    }

    pub fn contains(&self, id: u32) -> bool {
        (self.low..=self.high).contains(&id)
    }
}

/// 8-digit account numbers.
pub const ACCOUNT_NO_RANGE: IdRange = IdRange::new(10_000_000, 99_999_999);
/// 4-digit customer ids.
pub const CUSTOMER_ID_RANGE: IdRange = IdRange::new(1_000, 9_999);

struct AllocatorState {
    rng: StdRng,
    issued: HashMap<IdClass, HashSet<u32>>,
}

/// Issues random, never repeating identifiers per [`IdClass`].
///
/// Cloning yields another handle to the same namespace. Issued numbers are
/// never returned to the pool, even after the entity holding one is removed,
/// so a stale number can never point at an unrelated new entity.
#[derive(Clone)]
pub struct IdentityAllocator {
    state: Arc<Mutex<AllocatorState>>,
}

impl IdentityAllocator {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Deterministic allocator, the same seed yields the same id sequence.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            state: Arc::new(Mutex::new(AllocatorState {
                rng,
                issued: HashMap::new(),
            })),
        }
    }

    /// Draws uniformly from `range` until a number not yet issued in `class`
    /// comes up, then registers and returns it.
    ///
    /// There is no retry limit; exhausting a range loops forever.
    pub fn allocate(&self, class: IdClass, range: IdRange) -> u32 {
        let mut state = self.state.lock();
        let AllocatorState { rng, issued } = &mut *state;
        let issued = issued.entry(class).or_default();
        loop {
            let candidate = rng.gen_range(range.low..=range.high);
            if issued.insert(candidate) {
                return candidate;
            }
            trace!(?class, candidate, "id collision, drawing again");
        }
    }

    pub fn allocate_account_no(&self) -> AccountNo {
        self.allocate(IdClass::AccountNo, ACCOUNT_NO_RANGE)
    }

    pub fn allocate_customer_id(&self) -> CustomerId {
        self.allocate(IdClass::CustomerId, CUSTOMER_ID_RANGE)
    }

    pub fn is_issued(&self, class: IdClass, id: u32) -> bool {
        self.state
            .lock()
            .issued
            .get(&class)
            .is_some_and(|issued| issued.contains(&id))
    }

    pub fn issued_count(&self, class: IdClass) -> usize {
        self.state.lock().issued.get(&class).map_or(0, HashSet::len)
    }
}

impl Default for IdentityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for IdentityAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityAllocator")
            .field("accounts_issued", &self.issued_count(IdClass::AccountNo))
            .field("customers_issued", &self.issued_count(IdClass::CustomerId))
            .finish()
    }
}
