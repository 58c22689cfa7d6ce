//! Rolling CoP-angle history and backward-difference derivative.

/// Number of history slots kept by the controller.
pub const HISTORY_LEN: usize = 5;

/// Most-recent-first CoP angle history.
///
/// Slots are `None` until written, so a genuine zero reading is distinct from
/// "no data yet".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CopHistory {
    slots: [Option<f64>; HISTORY_LEN],
}

impl CopHistory {
    /// Empty history.
    pub const fn new() -> Self {
        Self {
            slots: [None; HISTORY_LEN],
        }
    }

    /// Shift older and store `value` at index 0.
    #[inline]
    pub fn push(&mut self, value: f64) {
        self.slots.copy_within(0..HISTORY_LEN - 1, 1);
        self.slots[0] = Some(value);
    }

    /// Value at `index`, if written.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.slots.get(index).copied().flatten()
    }

    /// Three consecutive values starting at `start`, newest first.
    ///
    /// `None` if any of them is unset or the window runs past the end.
    #[inline]
    pub fn window(&self, start: usize) -> Option<[f64; 3]> {
        Some([
            self.get(start)?,
            self.get(start + 1)?,
            self.get(start + 2)?,
        ])
    }

    /// Whether every slot in `range` is written.
    pub fn is_populated(&self, range: core::ops::Range<usize>) -> bool {
        self.slots
            .get(range)
            .is_some_and(|slots| slots.iter().all(Option::is_some))
    }

    /// Forget every value.
    pub fn reset(&mut self) {
        self.slots = [None; HISTORY_LEN];
    }
}

/// Second-order backward difference `(3·y0 − 4·y1 + y2) / (2·dt)`.
///
/// `window` is newest first.
#[inline]
pub fn backward_difference(window: [f64; 3], dt: f64) -> f64 {
    let [y0, y1, y2] = window;
    (3.0 * y0 - 4.0 * y1 + y2) / (2.0 * dt)
}
