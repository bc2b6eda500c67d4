use crate::foundation::core::{Plane, TargetMask, WindowBounds};
use crate::foundation::error::{AttackError, AttackResult};
use crate::foundation::math::median_of_present;

/// Float copy of one channel where marked pixels are missing.
///
/// Marked pixels stay missing for the whole run; resolved windows write their target into the
/// present cells they pick, so later windows observe those writes.
#[derive(Clone, Debug)]
pub(crate) struct WorkingState {
    width: usize,
    height: usize,
    cells: Vec<Option<f64>>,
}

impl WorkingState {
    pub(crate) fn from_plane(plane: &Plane, mask: &TargetMask) -> AttackResult<Self> {
        mask.ensure_shape(plane.width(), plane.height())?;
        let cells: Vec<Option<f64>> = plane
            .as_slice()
            .iter()
            .zip(mask.as_slice())
            .map(|(&v, &marked)| (!marked).then_some(f64::from(v)))
            .collect();

        let state = Self {
            width: plane.width(),
            height: plane.height(),
            cells,
        };
        state.check_unmarked_present(mask)?;
        Ok(state)
    }

    fn check_unmarked_present(&self, mask: &TargetMask) -> AttackResult<()> {
        let hole = self
            .cells
            .iter()
            .zip(mask.as_slice())
            .position(|(cell, &marked)| !marked && !cell.is_some_and(f64::is_finite));
        match hole {
            Some(i) => Err(AttackError::consistency(format!(
                "unmarked pixel ({}, {}) is missing from the working state",
                i / self.width.max(1),
                i % self.width.max(1)
            ))),
            None => Ok(()),
        }
    }

    pub(crate) fn width(&self) -> usize {
        self.width
    }

    pub(crate) fn height(&self) -> usize {
        self.height
    }

    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.cells[self.index(row, col)]
    }

    pub(crate) fn assign(&mut self, row: usize, col: usize, value: f64) {
        let i = self.index(row, col);
        self.cells[i] = Some(value);
    }

    /// Window contents in row-major order.
    pub(crate) fn window_cells(&self, bounds: WindowBounds) -> Vec<Option<f64>> {
        bounds.cells().map(|(r, c)| self.get(r, c)).collect()
    }

    pub(crate) fn window_median(&self, bounds: WindowBounds, scratch: &mut Vec<f64>) -> Option<f64> {
        median_of_present(bounds.cells().map(|(r, c)| self.get(r, c)), scratch)
    }

    pub(crate) fn present_in(&self, bounds: WindowBounds) -> usize {
        bounds
            .cells()
            .filter(|&(r, c)| self.get(r, c).is_some())
            .count()
    }
}

/// Tracks which cells are still free to be claimed in unused-pixel-only mode.
///
/// Starts as the present set of the working state and only ever shrinks.
#[derive(Clone, Debug)]
pub(crate) struct ConsumptionMarker {
    width: usize,
    available: Vec<bool>,
}

impl ConsumptionMarker {
    pub(crate) fn from_state(state: &WorkingState) -> Self {
        Self {
            width: state.width,
            available: state.cells.iter().map(Option::is_some).collect(),
        }
    }

    pub(crate) fn is_available(&self, row: usize, col: usize) -> bool {
        self.available[row * self.width + col]
    }

    pub(crate) fn consume(&mut self, row: usize, col: usize) {
        self.available[row * self.width + col] = false;
    }

    pub(crate) fn available_in(&self, bounds: WindowBounds) -> usize {
        bounds
            .cells()
            .filter(|&(r, c)| self.is_available(r, c))
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/attack/state.rs"]
mod tests;
