//! Normalized price momentum

/// Average successive difference of a newest-first series, divided by the
/// newest value
///
/// With newest-first ordering, `values[i + 1] - values[i]` is the step from
/// a newer price back to an older one. Returns `0.0` for fewer than two
/// values or a zero newest value.
pub fn momentum(values: &[f64]) -> f64 {
    if values.len() < 2 || values[0] == 0.0 {
        return 0.0;
    }

    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    let avg_diff = diffs.iter().sum::<f64>() / diffs.len() as f64;

    avg_diff / values[0]
}
