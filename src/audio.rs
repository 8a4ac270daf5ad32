//! Access cues: one short sine blip per paced access, rendered to WAV.
//!
//! Blips are laid end to end in event order rather than on the wall clock,
//! so the recording plays the algorithm at a fixed rate of events per
//! second regardless of pacing.

use std::cell::RefCell;
use std::f32::consts::TAU;
use std::path::Path;
use std::rc::Rc;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::error::CueError;
use crate::item::{Value, BLACK};

const FREQ_LOW: f32 = 120.0;
const FREQ_SPAN: f32 = 1200.0;

/// Collects blips in memory until written out.
#[derive(Debug, Clone)]
pub struct ToneRecorder {
    len: usize,
    sample_rate: u32,
    blip_samples: usize,
    max_samples: usize,
    samples: Vec<f32>,
    dropped: usize,
}

impl ToneRecorder {
    /// `len` is the buffer length used to map values to pitch.
    pub fn new(len: usize, sample_rate: u32, blip_ms: u32) -> Result<Self, CueError> {
        if sample_rate == 0 {
            return Err(CueError::ZeroSampleRate);
        }
        let blip_samples = (sample_rate as usize * blip_ms as usize / 1000).max(1);
        Ok(Self {
            len: len.max(1),
            sample_rate,
            blip_samples,
            // ten minutes
            max_samples: sample_rate as usize * 600,
            samples: Vec::new(),
            dropped: 0,
        })
    }

    pub fn with_max_seconds(mut self, seconds: u32) -> Self {
        self.max_samples = self.sample_rate as usize * seconds as usize;
        self
    }

    /// Wraps the recorder so it can be shared with a telemetry hook.
    pub fn shared(self) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(self))
    }

    /// A hook for [`Telemetry::on_access_sound`](crate::telemetry::Telemetry::on_access_sound).
    pub fn hook(recorder: &Rc<RefCell<Self>>) -> impl FnMut(Value) + 'static {
        let recorder = Rc::clone(recorder);
        move |value| recorder.borrow_mut().record(value)
    }

    /// Pitch for a value: low values low, quadratic towards the top.
    pub fn frequency(&self, value: Value) -> f32 {
        let x = f32::from(value) / self.len as f32;
        FREQ_LOW + FREQ_SPAN * x * x
    }

    /// Appends one blip. The erased sentinel is silent.
    pub fn record(&mut self, value: Value) {
        if value == BLACK {
            return;
        }
        if self.samples.len() + self.blip_samples > self.max_samples {
            self.dropped += 1;
            return;
        }
        let freq = self.frequency(value);
        let rate = self.sample_rate as f32;
        let n = self.blip_samples;
        self.samples.extend((0..n).map(|k| {
            // triangle envelope avoids clicks at both ends
            let env = 1.0 - (2.0 * k as f32 / n as f32 - 1.0).abs();
            0.5 * env * (TAU * freq * k as f32 / rate).sin()
        }));
    }

    pub fn blips(&self) -> usize {
        self.samples.len() / self.blip_samples
    }

    /// Blips skipped because the recording was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.dropped = 0;
    }

    /// Writes a mono 16-bit WAV.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<(), CueError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path.as_ref(), spec)?;
        for &s in &self.samples {
            writer.write_sample((s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
        debug!(
            path = %path.as_ref().display(),
            blips = self.blips(),
            dropped = self.dropped,
            "access cues written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_sample_rate() {
        assert!(matches!(
            ToneRecorder::new(8, 0, 10),
            Err(CueError::ZeroSampleRate)
        ));
    }

    #[test]
    fn pitch_rises_with_value() {
        let rec = ToneRecorder::new(100, 8000, 5).unwrap();
        assert_eq!(rec.frequency(0), FREQ_LOW);
        assert!(rec.frequency(50) < rec.frequency(99));
    }

    #[test]
    fn black_is_silent_and_cap_drops() {
        let mut rec = ToneRecorder::new(4, 1000, 100).unwrap().with_max_seconds(1);
        rec.record(BLACK);
        assert_eq!(rec.blips(), 0);
        for v in 0..12 {
            rec.record(v % 4);
        }
        assert_eq!(rec.blips(), 10);
        assert_eq!(rec.dropped(), 2);
        assert!(rec.samples().iter().all(|s| s.abs() <= 0.5));
    }

    #[test]
    fn writes_readable_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cues.wav");
        let rec = ToneRecorder::new(8, 8000, 10).unwrap().shared();
        let mut hook = ToneRecorder::hook(&rec);
        hook(1);
        hook(7);
        rec.borrow().write_wav(&path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.spec().sample_rate, 8000);
        assert_eq!(reader.len(), 160);
    }
}
