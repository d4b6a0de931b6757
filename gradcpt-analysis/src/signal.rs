//! Numeric helpers for gappy 1-D series.
//!
//! Gaps are `None`. Statistics skip them, interpolation fills them, and the
//! Gaussian filter works on the filled series with half-sample symmetric
//! boundaries (`d c b a | a b c d | d c b a`).

/// Standard deviation of a Gaussian with the given full width at half maximum.
pub fn fwhm_to_sigma(fwhm: f64) -> f64 {
    fwhm / (2.0 * (2.0 * std::f64::consts::LN_2).sqrt())
}

/// Mean over the defined entries, `None` if there are none.
pub fn nan_mean(values: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = values
        .iter()
        .flatten()
        .fold((0.0_f64, 0usize), |(sum, count), v| (sum + *v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Population standard deviation over the defined entries around `mean`.
pub fn nan_std(values: &[Option<f64>], mean: f64) -> Option<f64> {
    let (sq, count) = values
        .iter()
        .flatten()
        .fold((0.0_f64, 0usize), |(sq, count), v| (sq + (*v - mean).powi(2), count + 1));
    (count > 0).then(|| (sq / count as f64).sqrt())
}

/// Fills gaps by linear interpolation over the entry index.
///
/// Leading and trailing gaps take the nearest defined value. Returns `None`
/// when nothing is defined.
pub fn interpolate_gaps(values: &[Option<f64>]) -> Option<Vec<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    let (&(first_x, first_y), &(last_x, last_y)) = (known.first()?, known.last()?);

    let mut filled = Vec::with_capacity(values.len());
    let mut next = 0;
    for (i, v) in values.iter().enumerate() {
        if let Some(v) = v {
            filled.push(*v);
            next += 1;
            continue;
        }
        let y = if i < first_x {
            first_y
        } else if i > last_x {
            last_y
        } else {
            let (x0, y0) = known[next - 1];
            let (x1, y1) = known[next];
            let t = (i - x0) as f64 / (x1 - x0) as f64;
            y0 + t * (y1 - y0)
        };
        filled.push(y);
    }
    Some(filled)
}

/// Normalized Gaussian weights spanning `round(truncate * sigma)` samples each side.
pub fn gaussian_kernel(sigma: f64, truncate: f64) -> Vec<f64> {
    let radius = (truncate * sigma + 0.5) as i64;
    let denom = 2.0 * sigma * sigma;
    let mut weights: Vec<f64> = (-radius..=radius)
        .map(|x| (-(x * x) as f64 / denom).exp())
        .collect();
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Maps an index outside `0..len` back inside by half-sample symmetric reflection.
fn reflect_index(j: i64, len: usize) -> usize {
    let n = len as i64;
    let m = j.rem_euclid(2 * n);
    if m < n { m as usize } else { (2 * n - 1 - m) as usize }
}

/// Gaussian smoothing with reflected edges.
pub fn gaussian_filter(signal: &[f64], sigma: f64, truncate: f64) -> Vec<f64> {
    if signal.is_empty() {
        return Vec::new();
    }
    let kernel = gaussian_kernel(sigma, truncate);
    let radius = (kernel.len() / 2) as i64;
    (0..signal.len() as i64)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * signal[reflect_index(i + k as i64 - radius, signal.len())])
                .sum()
        })
        .collect()
}

/// Median, averaging the two middle values for even lengths.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fwhm_nine_gives_expected_sigma() {
        assert!((fwhm_to_sigma(9.0) - 3.821_948).abs() < 1e-6);
    }

    #[test]
    fn gap_statistics_skip_missing_entries() {
        let values = [Some(2.0), None, Some(4.0), None, Some(6.0)];
        assert_eq!(nan_mean(&values), Some(4.0));
        let std = nan_std(&values, 4.0).unwrap();
        assert!(close(std, (8.0f64 / 3.0).sqrt()));
        assert_eq!(nan_mean(&[None, None]), None);
    }

    #[test]
    fn interior_gaps_are_linear() {
        let filled = interpolate_gaps(&[Some(1.0), None, None, Some(4.0)]).unwrap();
        assert_eq!(filled, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn edge_gaps_hold_the_nearest_value() {
        let filled = interpolate_gaps(&[None, None, Some(5.0), None, Some(7.0), None]).unwrap();
        assert_eq!(filled, vec![5.0, 5.0, 5.0, 6.0, 7.0, 7.0]);
        assert!(interpolate_gaps(&[None, None]).is_none());
    }

    #[test]
    fn kernel_is_normalized_and_sized_by_truncate() {
        let kernel = gaussian_kernel(fwhm_to_sigma(9.0), 4.0);
        assert_eq!(kernel.len(), 31);
        assert!(close(kernel.iter().sum::<f64>(), 1.0));
        assert!(close(kernel[0], kernel[30]));
        assert!(kernel[15] > kernel[14]);
    }

    #[test]
    fn reflection_repeats_for_short_signals() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-4, 4), 3);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(8, 4), 0);
        assert_eq!(reflect_index(-5, 1), 0);
    }

    #[test]
    fn filter_preserves_constants_and_mass() {
        let flat = gaussian_filter(&[3.0; 7], 2.0, 4.0);
        assert!(flat.iter().all(|v| close(*v, 3.0)));

        let mut impulse = vec![0.0; 101];
        impulse[50] = 1.0;
        let smoothed = gaussian_filter(&impulse, 2.0, 4.0);
        assert!(close(smoothed.iter().sum::<f64>(), 1.0));
        assert!(close(smoothed[48], smoothed[52]));
        assert_eq!(gaussian_filter(&[], 2.0, 4.0), Vec::<f64>::new());
    }

    #[test]
    fn filter_mirrors_at_the_edges() {
        // A ramp reflected at the left edge folds back on itself, lifting the first sample.
        let ramp: Vec<f64> = (0..20).map(f64::from).collect();
        let smoothed = gaussian_filter(&ramp, 1.0, 4.0);
        assert!(smoothed[0] > 0.0);
        assert!(close(smoothed[10], 10.0));

        // Kernel wider than the signal: every tap folds back through the edges.
        let squares = [0.0, 1.0, 4.0, 9.0, 16.0, 25.0];
        let smoothed = gaussian_filter(&squares, fwhm_to_sigma(9.0), 4.0);
        assert!((smoothed[0] - 7.600_149_193).abs() < 1e-6);
        assert!((smoothed[5] - 10.735_236_524).abs() < 1e-6);
    }

    #[test]
    fn median_handles_odd_and_even_lengths() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }
}
