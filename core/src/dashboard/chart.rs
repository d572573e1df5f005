use crate::processing::SeriesPoint;
use serde::{Deserialize, Serialize};

/// Line chart payload; gaps are `None` values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<SeriesPoint>,
    /// Reducer scale in metres, when the series is a region reduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl ChartSeries {
    pub fn point_series(year: i32, points: Vec<SeriesPoint>) -> Self {
        Self {
            title: format!("NDVI Time Series ({year})"),
            x_label: "Date".into(),
            y_label: "NDVI".into(),
            points,
            scale: None,
        }
    }

    pub fn annual_mean(
        start_year: i32,
        end_year: i32,
        scale: f64,
        points: Vec<SeriesPoint>,
    ) -> Self {
        Self {
            title: format!("Annual Mean NDVI ({start_year}–{end_year})"),
            x_label: "Year".into(),
            y_label: "NDVI".into(),
            points,
            scale: Some(scale),
        }
    }

    /// Min and max of the present values.
    pub fn value_range(&self) -> Option<(f32, f32)> {
        self.points
            .iter()
            .filter_map(|p| p.value)
            .fold(None, |range, v| match range {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn titles_embed_years() {
        assert_eq!(
            ChartSeries::point_series(2015, Vec::new()).title,
            "NDVI Time Series (2015)"
        );
        let annual = ChartSeries::annual_mean(2015, 2025, 1000.0, Vec::new());
        assert_eq!(annual.title, "Annual Mean NDVI (2015–2025)");
        assert_eq!(annual.scale, Some(1000.0));
        assert_eq!(ChartSeries::point_series(2015, Vec::new()).scale, None);
    }

    #[test]
    fn value_range_ignores_gaps() {
        let date = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let chart = ChartSeries::point_series(
            2015,
            vec![
                SeriesPoint { date, value: Some(0.4) },
                SeriesPoint { date, value: None },
                SeriesPoint { date, value: Some(0.1) },
            ],
        );
        assert_eq!(chart.value_range(), Some((0.1, 0.4)));
        assert_eq!(ChartSeries::default().value_range(), None);
    }
}
