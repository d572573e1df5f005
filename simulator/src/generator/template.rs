use ndvicore::geo::GeoPoint;
use std::f64::consts::PI;

/// Seasonal green-up curve in `[-1, 1]`, peaking around day 255 (late monsoon).
pub fn seasonal_wave(day_of_year: u32) -> f64 {
    (((day_of_year as f64 - 255.0) / 365.25) * 2.0 * PI).cos()
}

fn ring(points: &[(f64, f64)]) -> Vec<GeoPoint> {
    points
        .iter()
        .map(|&(lon, lat)| GeoPoint::new(lon, lat))
        .collect()
}

/// Coarse outline of Bangladesh: mainland plus Bhola island.
pub fn bangladesh_outline() -> Vec<Vec<GeoPoint>> {
    vec![
        ring(&[
            (88.03, 24.30),
            (88.70, 24.25),
            (88.45, 25.20),
            (88.90, 26.00),
            (89.35, 26.40),
            (89.85, 25.95),
            (90.20, 25.25),
            (91.50, 25.20),
            (92.40, 25.00),
            (92.05, 24.05),
            (91.65, 23.20),
            (92.25, 22.20),
            (92.60, 21.30),
            (92.30, 20.75),
            (91.90, 21.50),
            (91.40, 22.40),
            (90.60, 22.60),
            (90.30, 21.85),
            (89.10, 21.75),
            (88.90, 22.50),
            (88.60, 23.30),
        ]),
        ring(&[(90.55, 22.15), (90.85, 22.20), (90.80, 22.75), (90.60, 22.70)]),
    ]
}

pub fn bhutan_outline() -> Vec<Vec<GeoPoint>> {
    vec![ring(&[
        (88.75, 27.15),
        (89.60, 28.25),
        (90.90, 28.05),
        (92.10, 27.80),
        (92.05, 26.85),
        (90.35, 26.80),
        (89.10, 26.75),
    ])]
}

pub fn myanmar_outline() -> Vec<Vec<GeoPoint>> {
    vec![ring(&[
        (92.20, 20.70),
        (92.60, 21.30),
        (93.20, 22.60),
        (93.40, 24.10),
        (94.60, 25.20),
        (95.30, 26.60),
        (97.30, 28.20),
        (98.70, 25.90),
        (98.30, 24.10),
        (100.10, 21.40),
        (98.50, 16.10),
        (98.60, 10.00),
        (97.60, 16.50),
        (94.30, 16.00),
        (94.20, 18.80),
    ])]
}
