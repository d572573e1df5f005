/// NDVI layer stretch: 17 stops from bare (white/tan) to dense (dark green).
pub const NDVI_PALETTE: [&str; 17] = [
    "ffffff", "ce7e45", "df923d", "f1b555", "fcd163", "99b718", "74a901", "66a000", "529400",
    "3e8601", "207401", "056201", "004c00", "023b01", "012e01", "011d01", "011301",
];

/// Linear color ramp over `[min, max]`.
#[derive(Debug, Clone)]
pub struct Palette {
    min: f32,
    max: f32,
    stops: Vec<[u8; 3]>,
}

impl Palette {
    pub fn ndvi() -> Self {
        Self::from_hex(0.0, 1.0, &NDVI_PALETTE).unwrap_or_else(|| Self {
            min: 0.0,
            max: 1.0,
            stops: vec![[0, 0, 0], [255, 255, 255]],
        })
    }

    /// `None` if any stop is not six hex digits or fewer than two are given.
    pub fn from_hex(min: f32, max: f32, stops: &[&str]) -> Option<Self> {
        let stops = stops
            .iter()
            .map(|hex| parse_hex(hex))
            .collect::<Option<Vec<_>>>()?;
        (stops.len() >= 2 && max > min).then_some(Self { min, max, stops })
    }

    pub fn color_at(&self, value: f32) -> [u8; 3] {
        let t = ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0);
        let scaled = t * (self.stops.len() - 1) as f32;
        let lower = scaled.floor() as usize;
        let upper = (lower + 1).min(self.stops.len() - 1);
        let frac = scaled - lower as f32;
        let (a, b) = (self.stops[lower], self.stops[upper]);
        let mut out = [0u8; 3];
        for i in 0..3 {
            out[i] = (a[i] as f32 + (b[i] as f32 - a[i] as f32) * frac).round() as u8;
        }
        out
    }
}

fn parse_hex(hex: &str) -> Option<[u8; 3]> {
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndvi_palette_clamps_to_end_stops() {
        let palette = Palette::ndvi();
        assert_eq!(palette.color_at(-0.5), [255, 255, 255]);
        assert_eq!(palette.color_at(0.0), [255, 255, 255]);
        assert_eq!(palette.color_at(1.0), [0x01, 0x13, 0x01]);
        assert_eq!(palette.color_at(3.0), [0x01, 0x13, 0x01]);
    }

    #[test]
    fn palette_interpolates_between_stops() {
        let palette = Palette::from_hex(0.0, 1.0, &["000000", "ffffff"]).unwrap();
        assert_eq!(palette.color_at(0.5), [128, 128, 128]);
    }

    #[test]
    fn palette_rejects_malformed_hex() {
        assert!(Palette::from_hex(0.0, 1.0, &["00000", "ffffff"]).is_none());
        assert!(Palette::from_hex(0.0, 1.0, &["zz0000", "ffffff"]).is_none());
        assert!(Palette::from_hex(0.0, 1.0, &["ffffff"]).is_none());
    }
}
