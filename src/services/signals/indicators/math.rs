//! Rolling-window and regression helpers shared by the indicators.
//!
//! Rolling functions return one entry per input sample; entries whose
//! window is not yet full (or contains an undefined value) are `None`.

/// Apply `f` to every full window of `values`.
pub fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![None; values.len()];
    if window == 0 {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for end in (window - 1)..values.len() {
        buf.clear();
        let slice = &values[end + 1 - window..=end];
        if slice.iter().all(|v| v.is_some()) {
            buf.extend(slice.iter().flatten());
            out[end] = Some(f(&buf));
        }
    }
    out
}

pub fn defined(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().map(|v| Some(*v)).collect()
}

pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&defined(values), window, mean)
}

pub fn rolling_mean_opt(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Rolling sample standard deviation (n - 1).
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&defined(values), window, |w| std_sample(w).unwrap_or(0.0))
}

pub fn rolling_min(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&defined(values), window, |w| {
        w.iter().copied().fold(f64::INFINITY, f64::min)
    })
}

pub fn rolling_max(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(&defined(values), window, |w| {
        w.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    })
}

/// Exponentially weighted mean, `alpha = 2 / (span + 1)`, seeded with the
/// first value.
pub fn ewm(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let next = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None => v,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// First difference; the first entry is `None`.
pub fn diff(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(values.windows(2).map(|w| Some(w[1] - w[0])));
    out
}

/// Percentage changes between consecutive samples (length `n - 1`).
pub fn pct_changes(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| {
            if w[0] != 0.0 {
                (w[1] - w[0]) / w[0] * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_population(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Sample standard deviation; undefined below two samples.
pub fn std_sample(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Least-squares line through `(i, values[i])`. Returns `(slope, intercept)`.
pub fn linear_fit(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (0.0, 0.0);
    }
    if n == 1 {
        return (0.0, values[0]);
    }

    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }

    let slope = num / den;
    (slope, y_mean - slope * x_mean)
}

pub fn linear_slope(values: &[f64]) -> f64 {
    linear_fit(values).0
}

/// Pearson correlation; `None` for fewer than two samples or zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x);
    let my = mean(y);

    let mut cov = 0.0;
    let mut vx = 0.0;
    let mut vy = 0.0;
    for (a, b) in x.iter().zip(y) {
        cov += (a - mx) * (b - my);
        vx += (a - mx).powi(2);
        vy += (b - my).powi(2);
    }

    if vx == 0.0 || vy == 0.0 {
        return None;
    }
    Some((cov / (vx.sqrt() * vy.sqrt())).clamp(-1.0, 1.0))
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Last entry of a derived column, if defined.
pub fn last_defined(column: &[Option<f64>]) -> Option<f64> {
    column.last().copied().flatten()
}
