use rand::SeedableRng;
use rand::rngs::StdRng;

/// Percentile `p` (0..=100) of ascending `sorted`, interpolating linearly
/// between the two closest ranks.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
            let lo = rank.floor() as usize;
            let hi = rank.ceil() as usize;
            let frac = rank - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Sorted finite copy of `values` as f64.
pub fn sorted_finite(values: &[f32]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| *v as f64)
        .collect();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Keeps at most `max` of `values`, drawn without replacement with a
/// generator seeded by `seed`, so repeated runs pick the same pixels.
pub fn sample_values(values: Vec<f32>, max: usize, seed: u64) -> Vec<f32> {
    if values.len() <= max {
        return values;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    rand::seq::index::sample(&mut rng, values.len(), max)
        .into_iter()
        .map(|i| values[i])
        .collect()
}

/// Distribution summary printed after a burn-ratio run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub p5: f64,
    pub median: f64,
    pub p95: f64,
    pub max: f64,
    pub count: usize,
}

pub fn summarize(values: &[f32]) -> Option<Summary> {
    let sorted = sorted_finite(values);
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    Some(Summary {
        min,
        p5: percentile_sorted(&sorted, 5.0),
        median: percentile_sorted(&sorted, 50.0),
        p95: percentile_sorted(&sorted, 95.0),
        max,
        count: sorted.len(),
    })
}
