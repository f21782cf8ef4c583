//! Delta caches for memoizing per-node-pair tree kernel contributions.
//!
//! A delta cache maps an ordered pair of node ids `(i, j)`, where `i` comes
//! from the first tree and `j` from the second, to the value of the delta
//! function for the subtrees rooted there. Both backends share one contract:
//! [`DeltaCache::get`] returns `None` for a pair that is unset or still
//! pending, and `Some(value)` once the pair has been computed.
//!
//! ## Backends
//!
//! - [`DenseDeltaCache`]: square array bounded by a configured capacity.
//!   Constant-time access; ids at or beyond the capacity are rejected with
//!   [`KernelError::CapacityExceeded`].
//! - [`SparseDeltaCache`]: nested hash maps with no bound on ids, at a higher
//!   per-access cost.
//!
//! The backend is chosen through [`DeltaCacheConfig`] when a kernel is
//! constructed.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KernelError, Result};

/// Default capacity of the dense backend (maximum node id + 1).
pub const DEFAULT_DENSE_CAPACITY: usize = 200;

/// Memo table for delta function values.
pub trait DeltaCache: Send + Sync + fmt::Debug {
    /// Cached value for `(i, j)`, or `None` when unset or pending.
    fn get(&self, i: usize, j: usize) -> Result<Option<f32>>;

    /// Store `value` for `(i, j)`, overwriting any previous value.
    fn add(&mut self, i: usize, j: usize, value: f32) -> Result<()>;

    /// Mark `(i, j)` as pending: it will be computed during the current
    /// evaluation and reads as unset until then.
    fn reserve(&mut self, i: usize, j: usize) -> Result<()>;

    /// Reset every entry to unset.
    fn clear(&mut self);

    /// Number of pairs currently holding a computed value.
    fn computed(&self) -> usize;

    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;
}

/// Bounded square delta cache.
///
/// Validity is tracked per cell with an `Option`, and every written cell is
/// remembered so that [`clear`](DeltaCache::clear) only resets what the last
/// evaluation touched. The table is allocated on the first write; a table
/// that cannot be allocated is reported as an error rather than aborting.
#[derive(Clone)]
pub struct DenseDeltaCache {
    capacity: usize,
    cells: Vec<Option<f32>>,
    touched: Vec<usize>,
    computed: usize,
}

impl DenseDeltaCache {
    /// Create a dense cache accepting node ids in `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cells: Vec::new(),
            touched: Vec::new(),
            computed: 0,
        }
    }

    /// Largest accepted node id + 1.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn index(&self, i: usize, j: usize) -> Result<usize> {
        for id in [i, j] {
            if id >= self.capacity {
                return Err(KernelError::CapacityExceeded {
                    id,
                    capacity: self.capacity,
                });
            }
        }
        Ok(i * self.capacity + j)
    }

    fn allocate(&mut self) -> Result<()> {
        if !self.cells.is_empty() {
            return Ok(());
        }
        let len = dense_table_len(self.capacity).ok_or_else(|| oversized(self.capacity))?;
        self.cells.try_reserve_exact(len).map_err(|e| {
            KernelError::ComputationError(format!(
                "cannot allocate dense delta cache of capacity {}: {}",
                self.capacity, e
            ))
        })?;
        self.cells.resize(len, None);
        Ok(())
    }

    fn write(&mut self, i: usize, j: usize, value: Option<f32>) -> Result<()> {
        let idx = self.index(i, j)?;
        self.allocate()?;
        match (self.cells[idx], value) {
            (None, Some(_)) => {
                self.touched.push(idx);
                self.computed += 1;
            }
            (Some(_), None) => self.computed -= 1,
            _ => {}
        }
        self.cells[idx] = value;
        Ok(())
    }
}

impl Default for DenseDeltaCache {
    fn default() -> Self {
        Self::new(DEFAULT_DENSE_CAPACITY)
    }
}

impl fmt::Debug for DenseDeltaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DenseDeltaCache")
            .field("capacity", &self.capacity)
            .field("computed", &self.computed())
            .finish()
    }
}

impl DeltaCache for DenseDeltaCache {
    fn get(&self, i: usize, j: usize) -> Result<Option<f32>> {
        let idx = self.index(i, j)?;
        Ok(self.cells.get(idx).copied().flatten())
    }

    fn add(&mut self, i: usize, j: usize, value: f32) -> Result<()> {
        self.write(i, j, Some(value))
    }

    fn reserve(&mut self, i: usize, j: usize) -> Result<()> {
        self.write(i, j, None)
    }

    fn clear(&mut self) {
        for idx in self.touched.drain(..) {
            self.cells[idx] = None;
        }
        self.computed = 0;
    }

    fn computed(&self) -> usize {
        self.computed
    }

    fn backend(&self) -> &'static str {
        "dense"
    }
}

/// Unbounded delta cache backed by nested hash maps.
#[derive(Clone, Debug, Default)]
pub struct SparseDeltaCache {
    rows: HashMap<usize, HashMap<usize, f32>>,
}

impl SparseDeltaCache {
    /// Create an empty sparse cache.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeltaCache for SparseDeltaCache {
    fn get(&self, i: usize, j: usize) -> Result<Option<f32>> {
        Ok(self.rows.get(&i).and_then(|row| row.get(&j)).copied())
    }

    fn add(&mut self, i: usize, j: usize, value: f32) -> Result<()> {
        self.rows.entry(i).or_default().insert(j, value);
        Ok(())
    }

    fn reserve(&mut self, i: usize, j: usize) -> Result<()> {
        if let Some(row) = self.rows.get_mut(&i) {
            row.remove(&j);
        }
        Ok(())
    }

    fn clear(&mut self) {
        self.rows.clear();
    }

    fn computed(&self) -> usize {
        self.rows.values().map(HashMap::len).sum()
    }

    fn backend(&self) -> &'static str {
        "sparse"
    }
}

/// Delta cache backend selection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum DeltaCacheConfig {
    /// Bounded dense array; node ids must be below `capacity`.
    Dense {
        #[serde(default = "default_capacity")]
        capacity: usize,
    },
    /// Unbounded sparse map.
    Sparse,
}

fn default_capacity() -> usize {
    DEFAULT_DENSE_CAPACITY
}

/// Cell count of a dense table, if its byte size stays addressable.
fn dense_table_len(capacity: usize) -> Option<usize> {
    let len = capacity.checked_mul(capacity)?;
    let bytes = len.checked_mul(std::mem::size_of::<Option<f32>>())?;
    (bytes <= isize::MAX as usize).then_some(len)
}

fn oversized(capacity: usize) -> KernelError {
    KernelError::InvalidParameter {
        parameter: "capacity".to_string(),
        value: capacity.to_string(),
        reason: "dense delta cache table exceeds the addressable size".to_string(),
    }
}

impl DeltaCacheConfig {
    /// Dense backend with the given capacity.
    pub fn dense(capacity: usize) -> Self {
        Self::Dense { capacity }
    }

    /// Sparse backend.
    pub fn sparse() -> Self {
        Self::Sparse
    }

    /// Check that a dense table of this capacity can be allocated.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Dense { capacity: 0 } => Err(KernelError::InvalidParameter {
                parameter: "capacity".to_string(),
                value: "0".to_string(),
                reason: "dense delta cache capacity must be positive".to_string(),
            }),
            Self::Dense { capacity } if dense_table_len(capacity).is_none() => {
                Err(oversized(capacity))
            }
            _ => Ok(()),
        }
    }

    /// Instantiate an empty cache for this backend.
    pub fn build(&self) -> Box<dyn DeltaCache> {
        match self {
            Self::Dense { capacity } => Box::new(DenseDeltaCache::new(*capacity)),
            Self::Sparse => Box::new(SparseDeltaCache::new()),
        }
    }
}

impl Default for DeltaCacheConfig {
    fn default() -> Self {
        Self::dense(DEFAULT_DENSE_CAPACITY)
    }
}
