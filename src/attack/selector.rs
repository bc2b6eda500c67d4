/// Candidate cells for pushing a window's median toward `target`.
///
/// `cells` is the window in row-major order, `width` columns wide; `None` marks a missing cell.
/// When `increase` is set, returns the present cells strictly below `target`, largest first;
/// otherwise the present cells strictly above `target`, smallest first. Equal values keep scan
/// order. Coordinates are window-local `(row, col)`.
pub fn take_closest_values(
    cells: &[Option<f64>],
    width: usize,
    increase: bool,
    target: f64,
) -> Vec<(usize, usize)> {
    let mut picked: Vec<(usize, f64)> = cells
        .iter()
        .enumerate()
        .filter_map(|(i, cell)| cell.map(|v| (i, v)))
        .filter(|&(_, v)| if increase { v < target } else { v > target })
        .collect();

    // `sort_by` is stable, so ties stay in scan order.
    if increase {
        picked.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        picked.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    let width = width.max(1);
    picked
        .into_iter()
        .map(|(i, _)| (i / width, i % width))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/attack/selector.rs"]
mod tests;
