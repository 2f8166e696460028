//! Thread pinning for timing runs.
//!
//! Pinning keeps the measuring thread from migrating between cores while a
//! candidate is timed. Only Linux supports it (through `libc`); elsewhere
//! the guard is a no-op that reports itself as unpinned.

#[cfg(target_os = "linux")]
mod platform {
    /// Saved affinity mask of the thread before pinning
    pub struct SavedMask(libc::cpu_set_t);

    pub fn current_cpu() -> Option<usize> {
        // SAFETY: sched_getcpu has no preconditions
        let cpu = unsafe { libc::sched_getcpu() };
        usize::try_from(cpu).ok()
    }

    pub fn save() -> Option<SavedMask> {
        // SAFETY: cpu_set_t is plain data; the kernel fills it in
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            let rc = libc::sched_getaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mut set);
            (rc == 0).then_some(SavedMask(set))
        }
    }

    pub fn pin(core: usize) -> bool {
        // SAFETY: the set is zeroed before use and only read by the kernel
        unsafe {
            let mut set: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core, &mut set);
            libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set) == 0
        }
    }

    pub fn restore(mask: &SavedMask) -> bool {
        // SAFETY: mask came from sched_getaffinity on this thread
        unsafe { libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &mask.0) == 0 }
    }
}

#[cfg(not(target_os = "linux"))]
mod platform {
    pub struct SavedMask;

    pub fn current_cpu() -> Option<usize> {
        None
    }

    pub fn save() -> Option<SavedMask> {
        None
    }

    pub fn pin(_core: usize) -> bool {
        false
    }

    pub fn restore(_mask: &SavedMask) -> bool {
        true
    }
}

/// RAII guard: pins the current thread to the core it runs on, restores
/// the previous affinity on drop.
pub struct CpuPinGuard {
    core: Option<usize>,
    saved: Option<platform::SavedMask>,
}

impl CpuPinGuard {
    pub fn new() -> Self {
        let saved = platform::save();
        let core = match (&saved, platform::current_cpu()) {
            (Some(_), Some(cpu)) if platform::pin(cpu) => Some(cpu),
            _ => None,
        };
        if core.is_none() {
            tracing::debug!("thread not pinned");
        }
        Self { core, saved }
    }

    /// Core the thread is pinned to, if pinning succeeded
    pub fn core_id(&self) -> Option<usize> {
        self.core
    }

    pub fn is_pinned(&self) -> bool {
        self.core.is_some()
    }
}

impl Default for CpuPinGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if let (Some(_), Some(mask)) = (self.core, &self.saved) {
            if !platform::restore(mask) {
                tracing::warn!("failed to restore CPU affinity");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_guard_reports_core() {
        let guard = CpuPinGuard::new();
        assert_eq!(guard.is_pinned(), guard.core_id().is_some());
        drop(guard);
    }

    #[test]
    fn test_nested_guards_restore() {
        let outer = CpuPinGuard::new();
        {
            let inner = CpuPinGuard::new();
            if outer.is_pinned() {
                assert_eq!(inner.core_id(), outer.core_id());
            }
        }
        drop(outer);
    }
}
