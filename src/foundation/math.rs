/// Median over the present values only; `None` when every value is missing.
///
/// `scratch` is cleared and reused to avoid per-call allocation.
pub(crate) fn median_of_present(
    values: impl IntoIterator<Item = Option<f64>>,
    scratch: &mut Vec<f64>,
) -> Option<f64> {
    scratch.clear();
    scratch.extend(values.into_iter().flatten());
    median_sorted(scratch)
}

/// Even/odd median by full sort. Even counts average the two middle values.
pub(crate) fn median_sorted(data: &mut [f64]) -> Option<f64> {
    let n = data.len();
    if n == 0 {
        return None;
    }
    data.sort_by(f64::total_cmp);
    if n % 2 == 1 {
        Some(data[n / 2])
    } else {
        Some((data[n / 2 - 1] + data[n / 2]) / 2.0)
    }
}

/// Same result as [`median_sorted`], via partial selection.
pub(crate) fn median_select(data: &mut [f64]) -> Option<f64> {
    let n = data.len();
    if n == 0 {
        return None;
    }
    let mid = n / 2;
    let (lower, upper, _) = data.select_nth_unstable_by(mid, f64::total_cmp);
    let upper = *upper;
    if n % 2 == 1 {
        return Some(upper);
    }
    let below = lower
        .iter()
        .copied()
        .max_by(f64::total_cmp)
        .unwrap_or(upper);
    Some((below + upper) / 2.0)
}

/// Has the median moved to (or past) `target` in the requested direction?
pub(crate) fn median_crossed(increase: bool, median: f64, target: f64) -> bool {
    if increase {
        median >= target
    } else {
        median <= target
    }
}
