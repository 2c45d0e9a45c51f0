/// Resident set size of the current process, in bytes.
///
/// Linux reads `VmRSS` from `/proc/self/status`; other platforms (and Linux
/// sandboxes without `/proc`) fall back to `sysinfo`. Returns `None` when no
/// source is available.
pub fn current_rss_bytes() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        if let Some(bytes) = proc_status_bytes("VmRSS:") {
            return Some(bytes);
        }
    }

    sysinfo_rss_bytes()
}

fn sysinfo_rss_bytes() -> Option<u64> {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(err) => {
            tracing::debug!(
                target = "collatz.memory",
                error = err,
                "failed to resolve current pid while sampling rss"
            );
            return None;
        }
    };

    let mut system = sysinfo::System::new();
    if !system.refresh_process(pid) {
        return None;
    }
    system.process(pid).map(|process| process.memory())
}

#[cfg(target_os = "linux")]
fn proc_status_bytes(field: &str) -> Option<u64> {
    let status = match std::fs::read_to_string("/proc/self/status") {
        Ok(status) => status,
        Err(err) => {
            // `/proc` may not be mounted in some sandboxes; only log unexpected errors.
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(
                    target = "collatz.memory",
                    error = %err,
                    "failed to read /proc/self/status while sampling rss"
                );
            }
            return None;
        }
    };
    parse_status_field_bytes(&status, field)
}

/// Extract a `kB` field (e.g. `VmRSS:`) from `/proc/self/status` contents.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_status_field_bytes(status: &str, field: &str) -> Option<u64> {
    for line in status.lines() {
        let Some(rest) = line.trim_start().strip_prefix(field) else {
            continue;
        };
        let kb = rest.split_whitespace().next()?;
        return match kb.parse::<u64>() {
            Ok(kb) => Some(kb.saturating_mul(1024)),
            Err(err) => {
                // Log once; this sits on a hot polling path.
                static REPORTED: std::sync::OnceLock<()> = std::sync::OnceLock::new();
                if REPORTED.set(()).is_ok() {
                    tracing::debug!(
                        target = "collatz.memory",
                        field,
                        value = kb,
                        error = %err,
                        "failed to parse /proc/self/status field"
                    );
                }
                None
            }
        };
    }
    None
}
