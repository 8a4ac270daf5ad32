//! Device module: the output capability consumed by the renderer.

use crate::color::Color;

/// A strip of addressable lights.
///
/// The renderer only ever paints pixels, polls `is_busy`, and asks for a
/// transmit. It never waits for a transmit to finish.
pub trait OutputDevice {
    /// Number of addressable pixels.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set the color of pixel `index` in the device's shadow state.
    fn set_pixel(&mut self, index: usize, color: Color);

    /// True while a previous frame is still being transmitted.
    fn is_busy(&mut self) -> bool;

    /// Start sending the shadow state to the lights.
    fn begin_transmit(&mut self);

    /// Global brightness, may change between frames.
    fn intensity(&self) -> u8;
}

impl<D: OutputDevice + ?Sized> OutputDevice for &mut D {
    fn len(&self) -> usize {
        (**self).len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        (**self).set_pixel(index, color)
    }

    fn is_busy(&mut self) -> bool {
        (**self).is_busy()
    }

    fn begin_transmit(&mut self) {
        (**self).begin_transmit()
    }

    fn intensity(&self) -> u8 {
        (**self).intensity()
    }
}

/// In-memory strip. Records what a real device would have shown.
///
/// A transmit keeps the strip busy for `busy_polls` subsequent polls,
/// which models a transport that drains frames on its own schedule.
#[derive(Debug, Clone)]
pub struct MemoryStrip {
    pixels: Vec<Color>,
    shown: Vec<Color>,
    intensity: u8,
    busy_polls: usize,
    busy_remaining: usize,
    /// Number of `begin_transmit` calls.
    pub transmits: usize,
    /// Number of `set_pixel` calls that landed on a pixel.
    pub writes: usize,
}

impl MemoryStrip {
    pub fn new(len: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK; len],
            shown: vec![Color::BLACK; len],
            intensity: 64,
            busy_polls: 0,
            busy_remaining: 0,
            transmits: 0,
            writes: 0,
        }
    }

    /// Keep the strip busy for `polls` polls after each transmit.
    pub fn with_busy_polls(mut self, polls: usize) -> Self {
        self.busy_polls = polls;
        self
    }

    pub fn with_intensity(mut self, intensity: u8) -> Self {
        self.intensity = intensity;
        self
    }

    pub fn set_intensity(&mut self, intensity: u8) {
        self.intensity = intensity;
    }

    /// Current shadow state, including pixels not yet transmitted.
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// State as of the last transmit.
    pub fn shown(&self) -> &[Color] {
        &self.shown
    }

    /// Renders the shadow state as one line of ANSI cells.
    pub fn ansi_line(&self) -> String {
        self.pixels.iter().map(Color::ansi_block).collect()
    }
}

impl OutputDevice for MemoryStrip {
    fn len(&self) -> usize {
        self.pixels.len()
    }

    fn set_pixel(&mut self, index: usize, color: Color) {
        if let Some(p) = self.pixels.get_mut(index) {
            *p = color;
            self.writes += 1;
        }
    }

    fn is_busy(&mut self) -> bool {
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            true
        } else {
            false
        }
    }

    fn begin_transmit(&mut self) {
        self.shown.copy_from_slice(&self.pixels);
        self.busy_remaining = self.busy_polls;
        self.transmits += 1;
    }

    fn intensity(&self) -> u8 {
        self.intensity
    }
}
