//! Useful functions.

/// Arithmetic mean. None if `xs` is empty.
pub fn mean(xs: &[f64]) -> Option<f64> {
    match xs.len() {
        0 => None,
        len => Some(xs.iter().sum::<f64>() / len as f64),
    }
}

// LogSumExp(xs). If all the elements are -inf (or `xs` is empty), returns -inf.
pub fn logsumexp(xs: &[f64]) -> f64 {
    let max = xs.iter().fold(std::f64::NEG_INFINITY, |x, &y| x.max(y));
    if max.is_infinite() {
        return max;
    }
    let sum = xs.iter().map(|x| (x - max).exp()).sum::<f64>().ln();
    max + sum
}
