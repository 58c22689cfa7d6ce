//! Fixed-length shift registers and the feed-forward/feedback stages built on them.
//!
//! Registers are most-recent-first: slot 0 holds the newest value. A register
//! tracks how many slots have been written since construction or reset, and
//! slots beyond that count are never read as data.

/// Most-recent-first register of `f64` values with an explicit fill count.
///
/// # RT Safety
///
/// - Storage is allocated once in [`ShiftRegister::new`]
/// - `push` is O(len) with no allocation
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftRegister {
    slots: Box<[f64]>,
    filled: usize,
}

impl ShiftRegister {
    /// Create an empty register with `len` slots.
    ///
    /// A zero-length register is always full and yields nothing.
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![0.0; len].into_boxed_slice(),
            filled: 0,
        }
    }

    /// Shift every slot one place older and write `value` into slot 0.
    #[inline]
    pub fn push(&mut self, value: f64) {
        let len = self.slots.len();
        if len == 0 {
            return;
        }
        self.slots.copy_within(0..len - 1, 1);
        self.slots[0] = value;
        if self.filled < len {
            self.filled += 1;
        }
    }

    /// Whether every slot has been written since the last reset.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.slots.len()
    }

    /// Number of slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the register has no slots at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of slots written since the last reset, capped at [`len`](Self::len).
    #[inline]
    pub fn filled(&self) -> usize {
        self.filled
    }

    /// Value `i` pushes ago, or `None` if that slot has not been written yet.
    #[inline]
    pub fn get(&self, i: usize) -> Option<f64> {
        if i < self.filled {
            self.slots.get(i).copied()
        } else {
            None
        }
    }

    /// Iterate over the written slots, newest first.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.slots[..self.filled].iter().copied()
    }

    /// Forget every value.
    pub fn reset(&mut self) {
        self.slots.fill(0.0);
        self.filled = 0;
    }

    /// Dot product of `taps` with the register contents, newest first.
    ///
    /// Returns `None` until the register is full.
    #[inline]
    fn weighted_sum(&self, taps: &[f64]) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        Some(taps.iter().zip(self.slots.iter()).map(|(t, v)| t * v).sum())
    }
}

/// Feed-forward taps applied to the input history, current sample included.
#[derive(Clone, Debug, PartialEq)]
pub struct FirStage {
    taps: Box<[f64]>,
    inputs: ShiftRegister,
}

impl FirStage {
    /// Create a stage whose register is as long as `taps`.
    pub fn new(taps: &[f64]) -> Self {
        Self {
            taps: taps.into(),
            inputs: ShiftRegister::new(taps.len()),
        }
    }

    /// Push `x` and return `Σ taps[i]·x[n-i]`, or `None` while the register is filling.
    #[inline]
    pub fn feed(&mut self, x: f64) -> Option<f64> {
        self.inputs.push(x);
        self.inputs.weighted_sum(&self.taps)
    }

    /// Feed-forward taps.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Whether the input register is full.
    pub fn is_warm(&self) -> bool {
        self.inputs.is_full()
    }

    /// Clear the input history.
    pub fn reset(&mut self) {
        self.inputs.reset();
    }
}

/// Feedback taps applied to the output history, `y[n-1]` first.
#[derive(Clone, Debug, PartialEq)]
pub struct IirStage {
    taps: Box<[f64]>,
    outputs: ShiftRegister,
}

impl IirStage {
    /// Create a stage whose register is as long as `taps`.
    pub fn new(taps: &[f64]) -> Self {
        Self {
            taps: taps.into(),
            outputs: ShiftRegister::new(taps.len()),
        }
    }

    /// `Σ taps[j]·y[n-1-j]`, or `None` while the output register is filling.
    ///
    /// A stage with no taps always returns `Some(0.0)`.
    #[inline]
    pub fn feedback(&self) -> Option<f64> {
        self.outputs.weighted_sum(&self.taps)
    }

    /// Record the output just produced so it becomes `y[n-1]` for the next sample.
    #[inline]
    pub fn record(&mut self, y: f64) {
        self.outputs.push(y);
    }

    /// Feedback taps.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Whether the output register is full.
    pub fn is_warm(&self) -> bool {
        self.outputs.is_full()
    }

    /// Clear the output history.
    pub fn reset(&mut self) {
        self.outputs.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_most_recent_first() {
        let mut reg = ShiftRegister::new(3);
        reg.push(1.0);
        reg.push(2.0);
        reg.push(3.0);
        reg.push(4.0);
        assert_eq!(reg.iter().collect::<Vec<_>>(), vec![4.0, 3.0, 2.0]);
    }

    #[test]
    fn test_register_unset_slots_are_none() {
        let mut reg = ShiftRegister::new(3);
        reg.push(0.0);
        assert_eq!(reg.get(0), Some(0.0));
        assert_eq!(reg.get(1), None);
        assert!(!reg.is_full());
    }

    #[test]
    fn test_register_reset() {
        let mut reg = ShiftRegister::new(2);
        reg.push(5.0);
        reg.push(6.0);
        assert!(reg.is_full());
        reg.reset();
        assert_eq!(reg.filled(), 0);
        assert_eq!(reg.get(0), None);
    }

    #[test]
    fn test_zero_length_register_is_full() {
        let mut reg = ShiftRegister::new(0);
        reg.push(1.0);
        assert!(reg.is_full());
        assert!(reg.is_empty());
        assert_eq!(reg.weighted_sum(&[]), Some(0.0));
    }

    #[test]
    fn test_fir_waits_for_full_register() {
        let mut fir = FirStage::new(&[0.5, 0.25, 0.25]);
        assert_eq!(fir.feed(4.0), None);
        assert_eq!(fir.feed(4.0), None);
        let y = fir.feed(8.0);
        assert_eq!(y, Some(0.5 * 8.0 + 0.25 * 4.0 + 0.25 * 4.0));
    }

    #[test]
    fn test_iir_feedback_uses_recorded_outputs() {
        let mut iir = IirStage::new(&[0.5, -0.25]);
        assert_eq!(iir.feedback(), None);
        iir.record(2.0);
        assert_eq!(iir.feedback(), None);
        iir.record(4.0);
        assert_eq!(iir.feedback(), Some(0.5 * 4.0 - 0.25 * 2.0));
    }
}
