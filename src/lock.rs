//! Exclusive bus access for the duration of one byte transfer.
//!
//! A byte in 4-bit mode is two nibbles plus synchronization. If an interrupt handler touches the
//! same port in the middle of that, the controller sees a torn transfer and falls out of nibble
//! sync. [`BusLock::acquire`] returns a guard that keeps other contexts off the bus until it is
//! dropped, on every exit path.

/// Provides the scoped guard held by the driver while a byte is on the bus.
pub trait BusLock {
    type Guard;

    /// Takes exclusive access. Access is given back when the returned guard is dropped. Guards
    /// must be dropped in the reverse order they were acquired.
    fn acquire(&mut self) -> Self::Guard;
}

/// No exclusion. For systems where nothing but the driver touches the display lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLock;

impl BusLock for NoLock {
    type Guard = ();

    fn acquire(&mut self) -> Self::Guard {}
}

/// Disables interrupts through the `critical-section` implementation of the target for as long
/// as the guard lives, then restores the interrupt state that was in effect before.
#[cfg(feature = "critical-section")]
#[derive(Debug, Default, Clone, Copy)]
pub struct InterruptLock;

#[cfg(feature = "critical-section")]
#[must_use]
pub struct InterruptGuard {
    state: critical_section::RestoreState,
}

#[cfg(feature = "critical-section")]
impl BusLock for InterruptLock {
    type Guard = InterruptGuard;

    fn acquire(&mut self) -> Self::Guard {
        // SAFETY: the guard releases exactly once, on drop
        let state = unsafe { critical_section::acquire() };
        InterruptGuard { state }
    }
}

#[cfg(feature = "critical-section")]
impl Drop for InterruptGuard {
    fn drop(&mut self) {
        // SAFETY: `state` came from the matching `acquire` in `InterruptLock::acquire`
        unsafe { critical_section::release(self.state) }
    }
}
