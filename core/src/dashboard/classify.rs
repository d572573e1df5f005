use serde::{Deserialize, Serialize};

/// Land-cover class from fixed NDVI breakpoints (0.2, 0.4, 0.6), closed below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NdviClass {
    BareSoil,
    Sparse,
    Moderate,
    Dense,
}

impl NdviClass {
    pub fn classify(value: f32) -> Self {
        if value < 0.2 {
            NdviClass::BareSoil
        } else if value < 0.4 {
            NdviClass::Sparse
        } else if value < 0.6 {
            NdviClass::Moderate
        } else {
            NdviClass::Dense
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NdviClass::BareSoil => "Bare soil / Built-up",
            NdviClass::Sparse => "Sparse vegetation",
            NdviClass::Moderate => "Moderate vegetation",
            NdviClass::Dense => "Dense vegetation",
        }
    }

    pub fn color(self) -> MarkerColor {
        match self {
            NdviClass::BareSoil => MarkerColor::Red,
            NdviClass::Sparse => MarkerColor::Orange,
            NdviClass::Moderate => MarkerColor::Yellow,
            NdviClass::Dense => MarkerColor::Green,
        }
    }
}

/// Click marker color; white until a value is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    #[default]
    White,
    Red,
    Orange,
    Yellow,
    Green,
}

impl MarkerColor {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerColor::White => "white",
            MarkerColor::Red => "red",
            MarkerColor::Orange => "orange",
            MarkerColor::Yellow => "yellow",
            MarkerColor::Green => "green",
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            MarkerColor::White => [255, 255, 255],
            MarkerColor::Red => [255, 0, 0],
            MarkerColor::Orange => [255, 165, 0],
            MarkerColor::Yellow => [255, 255, 0],
            MarkerColor::Green => [0, 128, 0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakpoints_are_closed_below() {
        assert_eq!(NdviClass::classify(0.199), NdviClass::BareSoil);
        assert_eq!(NdviClass::classify(0.2), NdviClass::Sparse);
        assert_eq!(NdviClass::classify(0.4), NdviClass::Moderate);
        assert_eq!(NdviClass::classify(0.6), NdviClass::Dense);
        assert_eq!(NdviClass::classify(-0.3), NdviClass::BareSoil);
    }

    #[test]
    fn moderate_value_is_yellow() {
        let class = NdviClass::classify(0.55);
        assert_eq!(class.label(), "Moderate vegetation");
        assert_eq!(class.color().as_str(), "yellow");
    }

    #[test]
    fn colors_follow_breakpoints() {
        let colors: Vec<_> = [0.1, 0.3, 0.5, 0.9]
            .into_iter()
            .map(|v| NdviClass::classify(v).color())
            .collect();
        assert_eq!(
            colors,
            vec![
                MarkerColor::Red,
                MarkerColor::Orange,
                MarkerColor::Yellow,
                MarkerColor::Green
            ]
        );
    }
}
