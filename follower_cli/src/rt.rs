//! Real-time scheduling for the control thread (Linux SCHED_FIFO + mlockall).

/// Promote the calling thread to SCHED_FIFO and lock resident pages.
///
/// Failures are logged and otherwise ignored; the loop still runs with
/// default scheduling.
#[cfg(target_os = "linux")]
pub fn promote_current_thread(prio: Option<i32>) {
    use libc::{
        MCL_CURRENT, SCHED_FIFO, mlockall, sched_get_priority_max, sched_get_priority_min,
        sched_param, sched_setscheduler,
    };

    if unsafe { mlockall(MCL_CURRENT) } != 0 {
        let err = std::io::Error::last_os_error();
        tracing::warn!(error = %err, "mlockall(current) failed; hint: needs CAP_IPC_LOCK and sufficient 'ulimit -l'");
    }

    let (min, max) = unsafe {
        let min = sched_get_priority_min(SCHED_FIFO);
        let max = sched_get_priority_max(SCHED_FIFO);
        if min < 0 || max < 0 { (1, 99) } else { (min, max) }
    };
    let prio_val = prio.unwrap_or(max).clamp(min, max);
    let param = sched_param {
        sched_priority: prio_val,
    };
    // pid 0 targets the calling thread.
    let rc = unsafe { sched_setscheduler(0, SCHED_FIFO, &param) };
    if rc != 0 {
        let err = std::io::Error::last_os_error();
        tracing::warn!(
            error = %err,
            prio = prio_val,
            "SCHED_FIFO not applied; needs CAP_SYS_NICE or root"
        );
    } else {
        tracing::info!(prio = prio_val, "control thread running SCHED_FIFO");
    }
}

#[cfg(not(target_os = "linux"))]
pub fn promote_current_thread(prio: Option<i32>) {
    let _ = prio;
    tracing::warn!("real-time scheduling is only supported on Linux; continuing without it");
}
