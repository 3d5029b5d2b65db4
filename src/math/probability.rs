//! Cumulative weight tree for logarithmic-time weighted sampling
//!
//! A Fenwick tree over non-negative weights. Supports appending, point updates,
//! swap-removal and inverse-CDF lookup, all in `O(log n)`, so a frontier that
//! changes by a handful of cells per step never needs a full rebuild.
//!
//! [`ScaledWeights`] wraps the tree for weights whose magnitude can exceed `f64`:
//! it keeps log-weights and stores every weight divided by a common scale.

/// Largest log-weight, relative to the current scale, stored without rescaling
///
/// Keeps every stored weight below `e^256`, so sums over any frontier stay finite.
const LOG_SCALE_LIMIT: f64 = 256.0;

/// Fenwick tree of non-negative weights addressed by slot
#[derive(Clone, Debug, Default)]
pub struct CumulativeWeights {
    /// Raw weight per slot
    values: Vec<f64>,
    /// Partial sums; node `i` (one-based) covers slots `(i - lowbit(i), i]`
    tree: Vec<f64>,
}

const fn lowbit(index: usize) -> usize {
    index & index.wrapping_neg()
}

impl CumulativeWeights {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tree with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            tree: Vec::with_capacity(capacity),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the tree holds no slots
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Weight stored at a slot
    pub fn get(&self, slot: usize) -> Option<f64> {
        self.values.get(slot).copied()
    }

    /// Sum of the first `count` weights
    pub fn prefix_sum(&self, count: usize) -> f64 {
        let mut index = count.min(self.tree.len());
        let mut sum = 0.0;
        while index > 0 {
            sum += self.tree.get(index - 1).copied().unwrap_or(0.0);
            index -= lowbit(index);
        }
        sum
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        self.prefix_sum(self.len())
    }

    /// Append a weight as a new last slot
    pub fn push(&mut self, weight: f64) {
        let index = self.values.len() + 1;
        // The new node covers (index - lowbit, index]; all but the last slot already exist
        let covered = self.prefix_sum(index - 1) - self.prefix_sum(index - lowbit(index));
        self.values.push(weight);
        self.tree.push(covered + weight);
    }

    /// Overwrite the weight at a slot
    ///
    /// Returns the previous weight, or `None` if the slot does not exist.
    pub fn set(&mut self, slot: usize, weight: f64) -> Option<f64> {
        let value = self.values.get_mut(slot)?;
        let previous = *value;
        *value = weight;

        let delta = weight - previous;
        let mut index = slot + 1;
        while let Some(node) = self.tree.get_mut(index - 1) {
            *node += delta;
            index += lowbit(index);
        }
        Some(previous)
    }

    /// Remove a slot by moving the last slot into its place
    ///
    /// Mirrors `swap_remove` on vectors and indexed sets. Returns the removed weight.
    pub fn swap_remove(&mut self, slot: usize) -> Option<f64> {
        let last = self.values.len().checked_sub(1)?;
        let removed = self.get(slot)?;
        if slot != last {
            let moved = self.get(last)?;
            self.set(slot, moved);
        }
        // The last node only covers ranges ending at the last slot
        self.values.pop();
        self.tree.pop();
        Some(removed)
    }

    /// Find the slot whose cumulative interval contains `target`
    ///
    /// Returns the smallest slot `i` with `prefix_sum(i + 1) > target`. Targets at or
    /// beyond the total, reachable only through floating point drift, resolve to the
    /// last slot.
    pub fn find(&self, target: f64) -> Option<usize> {
        let len = self.tree.len();
        if len == 0 {
            return None;
        }

        let mut position = 0;
        let mut remaining = target;
        let mut step = 1usize << (usize::BITS - 1 - len.leading_zeros());
        while step > 0 {
            let next = position + step;
            if let Some(&node) = self.tree.get(next - 1) {
                if node <= remaining {
                    position = next;
                    remaining -= node;
                }
            }
            step >>= 1;
        }

        Some(position.min(len - 1))
    }
}

/// Weights held relative to a common scale so that huge exponents stay finite
///
/// Slot `i` stores `exp(log_weight[i] - shift)` in a [`CumulativeWeights`] tree.
/// While every log-weight is at most `LOG_SCALE_LIMIT` the shift is zero and the
/// raw weights are stored unchanged. Otherwise the tree is rebuilt around the
/// largest log-weight, which then stores exactly `1.0`; weights smaller than it by
/// more than `f64` can resolve store zero.
#[derive(Clone, Debug, Default)]
pub struct ScaledWeights {
    /// Raw weight per slot, possibly infinite
    weights: Vec<f64>,
    /// Natural logarithm of each raw weight
    log_weights: Vec<f64>,
    shift: f64,
    scaled: CumulativeWeights,
}

impl ScaledWeights {
    /// Create an empty store with room for `capacity` slots
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            weights: Vec::with_capacity(capacity),
            log_weights: Vec::with_capacity(capacity),
            shift: 0.0,
            scaled: CumulativeWeights::with_capacity(capacity),
        }
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.log_weights.len()
    }

    /// Whether the store holds no slots
    pub fn is_empty(&self) -> bool {
        self.log_weights.is_empty()
    }

    /// Log-weight subtracted from every stored weight
    pub const fn shift(&self) -> f64 {
        self.shift
    }

    /// Scaled weights, proportional to the raw ones
    pub const fn scaled(&self) -> &CumulativeWeights {
        &self.scaled
    }

    /// Append a slot given its raw weight and that weight's natural logarithm
    ///
    /// The raw weight may be infinite; only the log-weight must be finite.
    pub fn push(&mut self, weight: f64, log_weight: f64) {
        self.weights.push(weight);
        self.log_weights.push(log_weight);
        if log_weight - self.shift > LOG_SCALE_LIMIT {
            self.rescale();
        } else {
            self.scaled.push(self.stored(weight, log_weight));
        }
    }

    /// Remove a slot by moving the last slot into its place
    ///
    /// Returns the removed log-weight.
    pub fn swap_remove(&mut self, slot: usize) -> Option<f64> {
        if slot >= self.len() {
            return None;
        }
        self.weights.swap_remove(slot);
        let removed = self.log_weights.swap_remove(slot);
        self.scaled.swap_remove(slot);

        // Removing the dominant slot can leave only weights that underflowed
        if self.shift > 0.0 && self.scaled.total() < (-LOG_SCALE_LIMIT).exp() {
            self.rescale();
        }
        Some(removed)
    }

    fn stored(&self, weight: f64, log_weight: f64) -> f64 {
        if self.shift > 0.0 {
            (log_weight - self.shift).exp()
        } else {
            weight
        }
    }

    /// Rebuild the tree around the largest log-weight
    fn rescale(&mut self) {
        let largest = self
            .log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        self.shift = if largest > LOG_SCALE_LIMIT { largest } else { 0.0 };

        let mut scaled = CumulativeWeights::with_capacity(self.len());
        for (&weight, &log_weight) in self.weights.iter().zip(&self.log_weights) {
            scaled.push(self.stored(weight, log_weight));
        }
        self.scaled = scaled;
    }
}
