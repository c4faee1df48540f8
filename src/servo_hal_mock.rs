use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace};

use crate::joint::Joint;
use crate::servo_hal::{HalError, HalResult, ServoHal};

/// Records everything written to it.  Clones share the same recording, so a test can keep one
/// clone while the arm owns the other.
#[derive(Debug, Default, Clone)]
pub struct ServoHalMock {
    recording: Arc<Mutex<MockRecording>>,
}

#[derive(Debug, Default)]
pub struct MockRecording {
    pub bring_up_calls: usize,
    pub writes: Vec<SignalWrite>,
    /// Writes still allowed to succeed before every further write fails.  `None` never fails.
    pub writes_before_failure: Option<usize>,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub struct SignalWrite {
    pub joint: Joint,
    pub drive_value: u16,
}

impl ServoHalMock {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn bring_up_calls(&self) -> usize {
        self.lock().bring_up_calls
    }

    pub fn writes(&self) -> Vec<SignalWrite> {
        self.lock().writes.clone()
    }

    pub fn writes_for(&self, joint: Joint) -> Vec<u16> {
        self.lock()
            .writes
            .iter()
            .filter(|w| w.joint == joint)
            .map(|w| w.drive_value)
            .collect()
    }

    pub fn last_signal(&self, joint: Joint) -> Option<u16> {
        self.lock()
            .writes
            .iter()
            .rev()
            .find(|w| w.joint == joint)
            .map(|w| w.drive_value)
    }

    /// Let `n` more writes through, then fail every write after that as if the channel died.
    pub fn fail_after(&self, n: usize) {
        self.lock().writes_before_failure = Some(n);
    }

    pub fn clear(&self) {
        self.lock().writes.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockRecording> {
        self.recording.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ServoHal for ServoHalMock {
    fn bring_up(&mut self) -> HalResult<()> {
        debug!("Beep.");
        self.lock().bring_up_calls += 1;
        Ok(())
    }

    fn write_signal(&mut self, joint: Joint, drive_value: u16) -> HalResult<()> {
        trace!("write_signal: {joint}={drive_value}");
        let mut recording = self.lock();
        if let Some(remaining) = recording.writes_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(HalError::InternalError(format!("{joint} channel stopped responding")));
            }
            *remaining -= 1;
        }
        recording.writes.push(SignalWrite { joint, drive_value });
        Ok(())
    }

    fn dump(&self) -> HalResult<()> {
        let recording = self.lock();
        debug!("bring_up_calls: {}", recording.bring_up_calls);
        debug!("writes: {}", recording.writes.len());
        for joint in Joint::ALL {
            let last = recording.writes.iter().rev().find(|w| w.joint == joint);
            debug!("{joint}: {:?}", last.map(|w| w.drive_value));
        }
        Ok(())
    }
}
