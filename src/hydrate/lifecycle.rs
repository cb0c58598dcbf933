//! Mount and annotation lifecycle

use std::time::Duration;

/// `Unmounted → Mounted → TornDown`; there is no error state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MountState {
    #[default]
    Unmounted,
    Mounted,
    TornDown,
}

impl MountState {
    pub fn mount(&mut self) {
        if *self == MountState::Unmounted {
            *self = MountState::Mounted;
        }
    }

    pub fn tear_down(&mut self) {
        if *self == MountState::Mounted {
            *self = MountState::TornDown;
        }
    }

    pub fn is_mounted(self) -> bool {
        self == MountState::Mounted
    }
}

/// Filters container resize notifications
///
/// The first observation is the initial layout, not a genuine resize.
#[derive(Debug, Clone, Default)]
pub struct ResizeGate {
    seen_initial: bool,
}

impl ResizeGate {
    /// Returns true when the observation should trigger a re-annotation
    pub fn observe(&mut self) -> bool {
        if !self.seen_initial {
            self.seen_initial = true;
            return false;
        }
        true
    }
}

/// A delayed post-animation snapshot of one heading annotation
///
/// Tickets are stamped with the session generation at scheduling time; any
/// teardown or re-annotation moves the generation on and invalidates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTicket {
    pub container: String,
    pub heading: usize,
    pub generation: u64,
    /// How long after scheduling the capture should run
    pub delay: Duration,
}

impl CaptureTicket {
    pub fn new(container: &str, heading: usize, generation: u64, animation_ms: u32) -> Self {
        Self {
            container: container.to_string(),
            heading,
            generation,
            delay: Duration::from_millis(u64::from(animation_ms) + 100),
        }
    }
}
