//! Color module: RGBW pixels and integer HSV conversion.

/// Exclusive upper bound of the hue wheel: six sectors of 256 steps.
pub const HUE_MAX: u32 = 6 * 256;

/// One device pixel. Channel semantics beyond "more is brighter" belong to
/// the device adapter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, w: 0 }
    }

    /// Equal intensity on every channel, white included.
    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v, w: v }
    }

    pub const fn with_white(self, w: u8) -> Self {
        Self { w, ..self }
    }

    /// Renders the pixel as one 24-bit ANSI background cell. White is
    /// folded into the RGB channels.
    pub fn ansi_block(&self) -> String {
        let r = self.r.saturating_add(self.w);
        let g = self.g.saturating_add(self.w);
        let b = self.b.saturating_add(self.w);
        format!("\x1b[48;2;{};{};{}m \x1b[0m", r, g, b)
    }
}

/// Converts hue (`0..HUE_MAX`, wrapped), saturation and value to a color.
pub fn hsv(hue: u32, sat: u8, val: u8) -> Color {
    let hue = hue % HUE_MAX;
    let sector = hue / 256;
    let frac = hue % 256;
    let (s, v) = (u32::from(sat), u32::from(val));

    let p = v * (255 - s) / 255;
    let q = v * (255 - s * frac / 255) / 255;
    let t = v * (255 - s * (255 - frac) / 255) / 255;

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    // Every component is bounded by `v <= 255`.
    Color::rgb(r as u8, g as u8, b as u8)
}

/// Hue for a value in a buffer of `len` slots.
pub fn value_to_hue(value: u32, len: usize) -> u32 {
    if len == 0 {
        return 0;
    }
    (u64::from(value) * u64::from(HUE_MAX) / len as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_hues() {
        assert_eq!(hsv(0, 255, 255), Color::rgb(255, 0, 0));
        assert_eq!(hsv(512, 255, 255), Color::rgb(0, 255, 0));
        assert_eq!(hsv(1024, 255, 255), Color::rgb(0, 0, 255));
    }

    #[test]
    fn zero_saturation_is_gray() {
        let c = hsv(700, 0, 90);
        assert_eq!((c.r, c.g, c.b), (90, 90, 90));
    }

    #[test]
    fn zero_value_is_black() {
        assert_eq!(hsv(300, 255, 0), Color::BLACK);
    }

    #[test]
    fn hue_spreads_over_wheel() {
        assert_eq!(value_to_hue(0, 8), 0);
        assert_eq!(value_to_hue(4, 8), HUE_MAX / 2);
        assert!(value_to_hue(7, 8) < HUE_MAX);
        assert_eq!(value_to_hue(3, 0), 0);
    }

    #[test]
    fn ansi_folds_white() {
        let cell = Color::rgb(250, 0, 0).with_white(10).ansi_block();
        assert!(cell.contains("255;10;10"));
    }
}
