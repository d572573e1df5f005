use ndarray::{Array2, Zip};

pub struct MatrixHelper;

impl MatrixHelper {
    /// Per-cell mean over `layers`, ignoring `NaN`; cells with no values stay `NaN`.
    pub fn nan_mean<'a>(
        shape: (usize, usize),
        layers: impl IntoIterator<Item = &'a Array2<f32>>,
    ) -> Array2<f32> {
        let mut sum = Array2::<f64>::zeros(shape);
        let mut count = Array2::<u32>::zeros(shape);
        for layer in layers {
            Zip::from(&mut sum)
                .and(&mut count)
                .and(layer)
                .for_each(|s, c, &v| {
                    if !v.is_nan() {
                        *s += v as f64;
                        *c += 1;
                    }
                });
        }
        let mut mean = Array2::from_elem(shape, f32::NAN);
        Zip::from(&mut mean)
            .and(&sum)
            .and(&count)
            .for_each(|m, &s, &c| {
                if c > 0 {
                    *m = (s / c as f64) as f32;
                }
            });
        mean
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn nan_mean_averages_present_values() {
        let a = array![[0.2f32, f32::NAN], [0.4, f32::NAN]];
        let b = array![[0.4f32, 0.6], [f32::NAN, f32::NAN]];
        let mean = MatrixHelper::nan_mean((2, 2), [&a, &b]);
        assert!((mean[[0, 0]] - 0.3).abs() < 1e-6);
        assert_eq!(mean[[0, 1]], 0.6);
        assert_eq!(mean[[1, 0]], 0.4);
        assert!(mean[[1, 1]].is_nan());
    }

    #[test]
    fn nan_mean_of_nothing_is_all_missing() {
        let mean = MatrixHelper::nan_mean((2, 3), std::iter::empty());
        assert!(mean.iter().all(|v| v.is_nan()));
    }
}
