//! Allocation wrapper feeding the memory probe.

use std::alloc::{GlobalAlloc, Layout};
use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{self, AtomicBool};

// Bytes currently allocated by this thread and the high-water mark since the last reset. Memory
// freed on a thread other than the one that allocated it lowers the freeing thread's figure, so
// live bytes saturate at zero rather than wrap.
thread_local! {
    static LIVE_BYTES: Cell<u64> = const { Cell::new(0) };
    static PEAK_BYTES: Cell<u64> = const { Cell::new(0) };
}

static INSTALLED: AtomicBool = AtomicBool::new(false);

/// A snapshot of the calling thread's allocation counters.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ThreadMemory {
    pub(crate) live: u64,
    pub(crate) peak: u64,
}

/// Whether any allocation has gone through a [`TrackingAllocator`] in this process.
#[must_use]
pub fn tracking_allocator_installed() -> bool {
    INSTALLED.load(atomic::Ordering::Relaxed)
}

pub(crate) fn thread_memory() -> ThreadMemory {
    ThreadMemory {
        live: LIVE_BYTES.get(),
        peak: PEAK_BYTES.get(),
    }
}

/// Restarts the calling thread's high-water mark from its current live bytes.
pub(crate) fn reset_thread_peak() {
    PEAK_BYTES.set(LIVE_BYTES.get());
}

/// Raises the calling thread's high-water mark to at least `peak`.
pub(crate) fn restore_thread_peak(peak: u64) {
    PEAK_BYTES.set(PEAK_BYTES.get().max(peak));
}

fn grow(bytes: usize) {
    let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);

    // The thread-local slots can be gone during thread teardown; allocations then go untracked.
    _ = LIVE_BYTES.try_with(|live| {
        let now = live.get().saturating_add(bytes);
        live.set(now);

        _ = PEAK_BYTES.try_with(|peak| {
            if now > peak.get() {
                peak.set(now);
            }
        });
    });
}

fn shrink(bytes: usize) {
    let bytes = u64::try_from(bytes).unwrap_or(u64::MAX);

    _ = LIVE_BYTES.try_with(|live| live.set(live.get().saturating_sub(bytes)));
}

fn mark_installed() {
    if !INSTALLED.load(atomic::Ordering::Relaxed) {
        INSTALLED.store(true, atomic::Ordering::Relaxed);
    }
}

#[cfg(test)]
pub(crate) fn register_fake_allocation(bytes: usize) {
    mark_installed();
    grow(bytes);
}

#[cfg(test)]
pub(crate) fn register_fake_deallocation(bytes: usize) {
    shrink(bytes);
}

/// A global allocator wrapper that tracks live and peak heap usage per thread.
///
/// [`MemoryProbe`](crate::MemoryProbe) reads these counters, so it only works in programs that
/// install this allocator as the global allocator.
///
/// # Examples
///
/// ```
/// use resource_meter::TrackingAllocator;
///
/// #[global_allocator]
/// static ALLOCATOR: TrackingAllocator<std::alloc::System> = TrackingAllocator::system();
/// ```
pub struct TrackingAllocator<A: GlobalAlloc> {
    inner: A,
}

impl<A: GlobalAlloc> fmt::Debug for TrackingAllocator<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("inner", &"<allocator>")
            .finish()
    }
}

impl TrackingAllocator<std::alloc::System> {
    /// Creates a tracking allocator over the system allocator.
    #[must_use]
    #[inline]
    pub const fn system() -> Self {
        Self {
            inner: std::alloc::System,
        }
    }
}

impl<A: GlobalAlloc> TrackingAllocator<A> {
    /// Creates a tracking allocator over `allocator`.
    #[must_use]
    #[inline]
    pub const fn new(allocator: A) -> Self {
        Self { inner: allocator }
    }
}

// SAFETY: We delegate all allocation operations to the underlying allocator and only update
// thread-local counters that never allocate.
unsafe impl<A: GlobalAlloc> GlobalAlloc for TrackingAllocator<A> {
    #[inline]
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        let ptr = unsafe { self.inner.alloc(layout) };

        if !ptr.is_null() {
            mark_installed();
            grow(layout.size());
        }

        ptr
    }

    #[inline]
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        shrink(layout.size());

        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        unsafe { self.inner.dealloc(ptr, layout) }
    }

    #[inline]
    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        let ptr = unsafe { self.inner.alloc_zeroed(layout) };

        if !ptr.is_null() {
            mark_installed();
            grow(layout.size());
        }

        ptr
    }

    #[inline]
    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        // SAFETY: We forward the call to the underlying allocator which implements GlobalAlloc.
        let new_ptr = unsafe { self.inner.realloc(ptr, layout, new_size) };

        if !new_ptr.is_null() {
            mark_installed();
            shrink(layout.size());
            grow(new_size);
        }

        new_ptr
    }
}
