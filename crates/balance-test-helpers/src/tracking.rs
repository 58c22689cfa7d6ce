//! Allocation tracking for the per-tick hot path.
//!
//! Filters, the controller step and link sends are expected to run without
//! touching the heap once constructed. A test binary installs
//! [`TrackingAllocator`] as its global allocator and wraps the code under test
//! in an [`AllocationGuard`]:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static GLOBAL: TrackingAllocator = TrackingAllocator;
//!
//! let guard = track();
//! filter.process(1.0);
//! assert_no_alloc!(guard, "cascade process");
//! ```
//!
//! Counts are per thread, so work done by other threads is not attributed.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
    static ALLOCATION_COUNT: Cell<usize> = const { Cell::new(0) };
    static ALLOCATION_BYTES: Cell<usize> = const { Cell::new(0) };
    static TRACKING_ENABLED: Cell<bool> = const { Cell::new(false) };
}

/// System allocator that counts allocations on threads with an active guard.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() && TRACKING_ENABLED.with(|e| e.get()) {
            ALLOCATION_COUNT.with(|count| count.set(count.get().saturating_add(1)));
            ALLOCATION_BYTES.with(|bytes| bytes.set(bytes.get().saturating_add(layout.size())));
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() && TRACKING_ENABLED.with(|e| e.get()) {
            ALLOCATION_COUNT.with(|count| count.set(count.get().saturating_add(1)));
            if new_size > layout.size() {
                ALLOCATION_BYTES
                    .with(|bytes| bytes.set(bytes.get().saturating_add(new_size - layout.size())));
            }
        }
        new_ptr
    }
}

/// Counts allocations on the current thread while alive.
#[derive(Debug)]
pub struct AllocationGuard {
    start_count: usize,
    start_bytes: usize,
}

impl AllocationGuard {
    pub fn new() -> Self {
        TRACKING_ENABLED.with(|e| e.set(true));
        Self {
            start_count: ALLOCATION_COUNT.with(|c| c.get()),
            start_bytes: ALLOCATION_BYTES.with(|b| b.get()),
        }
    }

    /// Allocations since the guard was created.
    pub fn allocations(&self) -> usize {
        ALLOCATION_COUNT
            .with(|count| count.get())
            .saturating_sub(self.start_count)
    }

    /// Bytes requested since the guard was created.
    pub fn bytes(&self) -> usize {
        ALLOCATION_BYTES
            .with(|bytes| bytes.get())
            .saturating_sub(self.start_bytes)
    }
}

impl Default for AllocationGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for AllocationGuard {
    fn drop(&mut self) {
        TRACKING_ENABLED.with(|e| e.set(false));
    }
}

/// Start counting allocations on this thread.
pub fn track() -> AllocationGuard {
    AllocationGuard::new()
}

/// Panic if `guard` saw any allocation.
#[macro_export]
macro_rules! assert_no_alloc {
    ($guard:expr, $context:expr) => {
        let guard = &$guard;
        let allocs = guard.allocations();
        if allocs > 0 {
            panic!(
                "hot path allocation in '{}': {} allocations ({} bytes) at {}:{}",
                $context,
                allocs,
                guard.bytes(),
                file!(),
                line!()
            );
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_allocations() {
        let guard = track();
        let v: Vec<u64> = std::hint::black_box(Vec::with_capacity(16));
        assert!(guard.allocations() >= 1);
        assert!(guard.bytes() >= 128);
        drop(v);
    }

    #[test]
    fn test_no_allocations_in_arithmetic() {
        let guard = track();
        let mut acc = 0.0_f64;
        for i in 0..100 {
            acc += f64::from(i) * 0.5;
        }
        assert!(acc > 0.0);
        assert_no_alloc!(guard, "arithmetic");
    }
}
