pub struct StatsHelper;

impl StatsHelper {
    /// Mean of the present values, `None` when there are none.
    pub fn mean(values: impl IntoIterator<Item = Option<f32>>) -> Option<f32> {
        let (sum, count) = values
            .into_iter()
            .flatten()
            .fold((0.0f64, 0usize), |(sum, count), v| (sum + v as f64, count + 1));
        (count > 0).then(|| (sum / count as f64) as f32)
    }

    /// `valid / max(total, 1) * 100`.
    pub fn percentage(valid: usize, total: usize) -> f64 {
        valid as f64 / total.max(1) as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_skips_missing_values() {
        let mean = StatsHelper::mean([Some(0.2), None, Some(0.4)]).unwrap();
        assert!((mean - 0.3).abs() < 1e-6);
        assert_eq!(StatsHelper::mean([None, None]), None);
        assert_eq!(StatsHelper::mean(std::iter::empty()), None);
    }

    #[test]
    fn percentage_floors_total_at_one() {
        assert_eq!(StatsHelper::percentage(0, 0), 0.0);
        assert_eq!(StatsHelper::percentage(1, 2), 50.0);
        assert_eq!(StatsHelper::percentage(3, 3), 100.0);
    }
}
