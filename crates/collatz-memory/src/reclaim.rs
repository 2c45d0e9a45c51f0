/// Ask the allocator to hand free memory back to the OS.
///
/// This is a hint only: on glibc Linux it calls `malloc_trim(0)`, everywhere
/// else it does nothing. Returns whether any memory was actually released (as
/// far as the platform reports it).
pub fn request_reclaim() -> bool {
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    {
        // SAFETY: `malloc_trim` only inspects allocator-internal state and is
        // safe to call at any time from any thread.
        let released = unsafe { libc::malloc_trim(0) };
        tracing::trace!(
            target = "collatz.memory",
            released = released != 0,
            "requested allocator reclamation"
        );
        released != 0
    }

    #[cfg(not(all(target_os = "linux", target_env = "gnu")))]
    {
        false
    }
}
