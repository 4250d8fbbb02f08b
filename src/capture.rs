//! Sample routing into capture buffers and live slots.
//!
//! Two independent capture modes gate what happens to samples that arrive
//! from an active stream: `recording` appends to durable, append-only
//! buffers for later export, and `live` overwrites single most-recent-value
//! slots for real-time display. Both may be active at once, in which case
//! every sample is both appended and published live.
//!
//! The router performs no filtering, smoothing or unit conversion; recorded
//! values are only widened to `f64` for uniform storage.

use serde::{Deserialize, Serialize};

use crate::core::{HrSample, SampleBatch};

/// Durable, append-only capture of recorded samples.
///
/// Buffers fill only while `recording` is active and stay readable after it
/// stops; they are emptied the moment recording is next enabled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CaptureBuffers {
    /// ECG samples, microvolts.
    pub ecg: Vec<f64>,
    /// Accelerometer X axis, milli-g.
    pub acc_x: Vec<f64>,
    /// Accelerometer Y axis, milli-g.
    pub acc_y: Vec<f64>,
    /// Accelerometer Z axis, milli-g.
    pub acc_z: Vec<f64>,
    /// Heart rate, beats per minute.
    pub hr: Vec<f64>,
    /// Sensor contact flag accompanying each heart-rate sample.
    pub contact: Vec<bool>,
}

impl CaptureBuffers {
    /// Empties every buffer.
    pub fn clear(&mut self) {
        self.ecg.clear();
        self.acc_x.clear();
        self.acc_y.clear();
        self.acc_z.clear();
        self.hr.clear();
        self.contact.clear();
    }

    /// Per-buffer sample counts for the published snapshot.
    pub fn counts(&self) -> BufferCounts {
        BufferCounts {
            ecg: self.ecg.len(),
            acc: self.acc_x.len(),
            hr: self.hr.len(),
        }
    }
}

/// Sample counts per capture buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferCounts {
    /// Recorded ECG samples.
    pub ecg: usize,
    /// Recorded accelerometer samples (per axis).
    pub acc: usize,
    /// Recorded heart-rate samples.
    pub hr: usize,
}

/// Most-recent-value cells for live display.
///
/// Slots keep each stream's native width; they are zeroed the moment live
/// mode is enabled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveSlots {
    /// Latest ECG sample, microvolts.
    pub ecg: i32,
    /// Latest accelerometer X value, milli-g.
    pub acc_x: i32,
    /// Latest accelerometer Y value, milli-g.
    pub acc_y: i32,
    /// Latest accelerometer Z value, milli-g.
    pub acc_z: i32,
    /// Latest heart rate, beats per minute.
    pub hr: u8,
    /// Representative R-R interval, 1/1024 s units.
    pub rr_samples: u16,
    /// Representative R-R interval, milliseconds.
    pub rr_ms: u16,
}

/// Capture-mode flags together with the state they gate.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CaptureState {
    /// Durable buffering is active.
    pub recording: bool,
    /// Live slots are being updated.
    pub live: bool,
    /// Buffers filled while recording.
    pub buffers: CaptureBuffers,
    /// Latest values published while live.
    pub slots: LiveSlots,
}

impl CaptureState {
    /// Switches recording mode. Enabling empties the buffers; disabling
    /// leaves them readable for export.
    pub fn set_recording(&mut self, on: bool) {
        if on && !self.recording {
            self.buffers.clear();
        }
        self.recording = on;
    }

    /// Switches live mode. Enabling zeroes every slot; disabling leaves
    /// the last values in place.
    pub fn set_live(&mut self, on: bool) {
        if on && !self.live {
            self.slots = LiveSlots::default();
        }
        self.live = on;
    }

    /// Routes one decoded batch, sample by sample in arrival order.
    ///
    /// PPG and PPI batches have no buffer or slot and pass through
    /// untouched; their streams exist for their lifecycle, not capture.
    pub fn route(&mut self, batch: &SampleBatch) {
        match batch {
            SampleBatch::Ecg(samples) => {
                for &microvolts in samples {
                    if self.recording {
                        self.buffers.ecg.push(f64::from(microvolts));
                    }
                    if self.live {
                        self.slots.ecg = microvolts;
                    }
                }
            }
            SampleBatch::Acc(samples) => {
                for sample in samples {
                    if self.recording {
                        self.buffers.acc_x.push(f64::from(sample.x));
                        self.buffers.acc_y.push(f64::from(sample.y));
                        self.buffers.acc_z.push(f64::from(sample.z));
                    }
                    if self.live {
                        self.slots.acc_x = sample.x;
                        self.slots.acc_y = sample.y;
                        self.slots.acc_z = sample.z;
                    }
                }
            }
            SampleBatch::Hr(samples) => {
                for sample in samples {
                    self.route_hr(sample);
                }
            }
            SampleBatch::Ppg(_) | SampleBatch::Ppi(_) => {}
        }
    }

    fn route_hr(&mut self, sample: &HrSample) {
        if self.recording {
            self.buffers.hr.push(f64::from(sample.hr));
            self.buffers.contact.push(sample.contact);
        }
        if self.live {
            self.slots.hr = sample.hr;
            if let Some(rr) = representative_rr(&sample.rr_samples) {
                self.slots.rr_samples = rr;
            }
            if let Some(rr) = representative_rr(&sample.rr_ms) {
                self.slots.rr_ms = rr;
            }
        }
    }
}

/// Representative value of an R-R interval list.
///
/// A single-entry list reports that entry; a longer list reports the
/// second entry, never an average. An empty list reports nothing and the
/// previous value stands.
fn representative_rr(intervals: &[u16]) -> Option<u16> {
    match intervals {
        [] => None,
        [only] => Some(*only),
        [_, second, ..] => Some(*second),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AccSample;

    fn hr_sample(hr: u8, rr_samples: &[u16], rr_ms: &[u16]) -> HrSample {
        HrSample {
            hr,
            contact: true,
            contact_supported: true,
            rr_samples: rr_samples.to_vec(),
            rr_ms: rr_ms.to_vec(),
        }
    }

    #[test]
    fn recording_appends_in_arrival_order() {
        let mut capture = CaptureState::default();
        capture.set_recording(true);
        capture.route(&SampleBatch::Ecg(vec![10, 12, 9]));
        assert_eq!(capture.buffers.ecg, vec![10.0, 12.0, 9.0]);
    }

    #[test]
    fn enabling_recording_empties_buffers() {
        let mut capture = CaptureState::default();
        capture.set_recording(true);
        capture.route(&SampleBatch::Ecg(vec![1, 2]));
        capture.set_recording(false);
        // Buffers stay readable after stopping.
        assert_eq!(capture.buffers.ecg.len(), 2);
        capture.set_recording(true);
        assert!(capture.buffers.ecg.is_empty());
    }

    #[test]
    fn enabling_live_zeroes_slots() {
        let mut capture = CaptureState::default();
        capture.set_live(true);
        capture.route(&SampleBatch::Ecg(vec![42]));
        assert_eq!(capture.slots.ecg, 42);
        capture.set_live(false);
        assert_eq!(capture.slots.ecg, 42);
        capture.set_live(true);
        assert_eq!(capture.slots, LiveSlots::default());
    }

    #[test]
    fn samples_are_dropped_when_both_modes_off() {
        let mut capture = CaptureState::default();
        capture.route(&SampleBatch::Ecg(vec![7]));
        capture.route(&SampleBatch::Hr(vec![hr_sample(70, &[800], &[781])]));
        assert_eq!(capture.buffers, CaptureBuffers::default());
        assert_eq!(capture.slots, LiveSlots::default());
    }

    #[test]
    fn both_modes_append_and_overwrite() {
        let mut capture = CaptureState::default();
        capture.set_recording(true);
        capture.set_live(true);
        capture.route(&SampleBatch::Acc(vec![
            AccSample { x: 1, y: 2, z: 3 },
            AccSample { x: 4, y: 5, z: 6 },
        ]));
        assert_eq!(capture.buffers.acc_x, vec![1.0, 4.0]);
        assert_eq!(capture.buffers.acc_y, vec![2.0, 5.0]);
        assert_eq!(capture.buffers.acc_z, vec![3.0, 6.0]);
        assert_eq!(capture.slots.acc_x, 4);
        assert_eq!(capture.slots.acc_y, 5);
        assert_eq!(capture.slots.acc_z, 6);
    }

    #[test]
    fn single_rr_entry_is_taken_verbatim() {
        let mut capture = CaptureState::default();
        capture.set_live(true);
        capture.route(&SampleBatch::Hr(vec![hr_sample(64, &[800], &[781])]));
        assert_eq!(capture.slots.rr_samples, 800);
        assert_eq!(capture.slots.rr_ms, 781);
    }

    #[test]
    fn second_rr_entry_wins_in_longer_lists() {
        let mut capture = CaptureState::default();
        capture.set_live(true);
        capture.route(&SampleBatch::Hr(vec![hr_sample(
            70,
            &[800, 820, 840],
            &[781, 801],
        )]));
        assert_eq!(capture.slots.hr, 70);
        assert_eq!(capture.slots.rr_samples, 820);
        assert_eq!(capture.slots.rr_ms, 801);
    }

    #[test]
    fn empty_rr_list_keeps_previous_value() {
        let mut capture = CaptureState::default();
        capture.set_live(true);
        capture.route(&SampleBatch::Hr(vec![hr_sample(70, &[820], &[801])]));
        capture.route(&SampleBatch::Hr(vec![hr_sample(72, &[], &[])]));
        assert_eq!(capture.slots.hr, 72);
        assert_eq!(capture.slots.rr_samples, 820);
        assert_eq!(capture.slots.rr_ms, 801);
    }

    #[test]
    fn hr_recording_captures_rate_and_contact() {
        let mut capture = CaptureState::default();
        capture.set_recording(true);
        let mut sample = hr_sample(58, &[900], &[879]);
        sample.contact = false;
        capture.route(&SampleBatch::Hr(vec![sample]));
        assert_eq!(capture.buffers.hr, vec![58.0]);
        assert_eq!(capture.buffers.contact, vec![false]);
    }

    #[test]
    fn ppg_and_ppi_batches_are_not_captured() {
        let mut capture = CaptureState::default();
        capture.set_recording(true);
        capture.set_live(true);
        capture.route(&SampleBatch::Ppg(vec![crate::core::PpgSample {
            channels: [1, 2, 3],
            ambient: 4,
        }]));
        capture.route(&SampleBatch::Ppi(vec![crate::core::PpiSample {
            interval_ms: 810,
            error_estimate_ms: 20,
            blocker: false,
            skin_contact: true,
        }]));
        assert_eq!(capture.buffers, CaptureBuffers::default());
        assert_eq!(capture.slots, LiveSlots::default());
    }
}
