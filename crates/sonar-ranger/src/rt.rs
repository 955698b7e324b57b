//! Preemption control for the pulse-capture window.
//!
//! On Linux the closest thing to disabling interrupts from userspace is
//! lifting the thread to SCHED_FIFO for the duration of the capture.
//! Needs CAP_SYS_NICE; without it the section degrades to a no-op with
//! a single warning, and captures still work with more jitter.

use sonar_core::hal::CriticalSection;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub struct FifoSection {
    engaged: bool,
    warned: bool,
}

impl FifoSection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CriticalSection for FifoSection {
    fn enter(&mut self) {
        // SAFETY: plain libc scheduler calls on the current thread.
        unsafe {
            let priority = libc::sched_get_priority_max(libc::SCHED_FIFO);
            if priority < 0 {
                return;
            }
            let param = libc::sched_param {
                sched_priority: priority,
            };
            if libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) == 0 {
                self.engaged = true;
                debug!(priority, "capture window lifted to SCHED_FIFO");
            } else if !self.warned {
                self.warned = true;
                warn!("cannot set SCHED_FIFO (missing CAP_SYS_NICE?); capture timing may jitter");
            }
        }
    }

    fn exit(&mut self) {
        if !self.engaged {
            return;
        }
        self.engaged = false;
        // SAFETY: restores the default policy on the current thread.
        unsafe {
            let param = libc::sched_param { sched_priority: 0 };
            if libc::sched_setscheduler(0, libc::SCHED_OTHER, &param) != 0 {
                warn!("failed to restore SCHED_OTHER after capture");
            }
        }
    }
}
