//! Buffer-reusing kernel for overlap mode.
//!
//! Produces exactly the same pixels and statistics as [`crate::resolve_plane`] with
//! [`PixelReuse::AllowOverlap`], but keeps the channel in a flat `f64` buffer with the mask as
//! validity bitmap, reuses its scratch buffers across windows and finds medians by selection.

use crate::attack::config::PixelReuse;
use crate::attack::engine::{PlaneOutcome, ResolveParams, budget_exhausted};
use crate::attack::stats::RunRecord;
use crate::foundation::core::{Plane, TargetMask, WindowBounds};
use crate::foundation::error::{AttackError, AttackResult};
use crate::foundation::math::{median_crossed, median_select};

#[tracing::instrument(skip(plane, mask), fields(width = plane.width(), height = plane.height()))]
pub(crate) fn resolve_plane_accelerated(
    plane: &Plane,
    mask: &TargetMask,
    params: ResolveParams,
) -> AttackResult<PlaneOutcome> {
    params.validate()?;
    if params.reuse != PixelReuse::AllowOverlap {
        return Err(AttackError::unsupported_config(
            "accelerated kernel only supports overlapping reuse",
        ));
    }
    mask.ensure_shape(plane.width(), plane.height())?;

    let total = mask.marked_count();
    if total == 0 {
        tracing::warn!("mask marks no pixels; channel left unchanged");
        return Ok(PlaneOutcome::untouched(plane));
    }

    let (width, height) = (plane.width(), plane.height());
    // Marked cells never become present and unmarked cells never go missing, so the mask
    // doubles as the missing bitmap for the whole run.
    let missing = mask.as_slice();
    let mut values: Vec<f64> = plane.as_slice().iter().map(|&v| f64::from(v)).collect();
    let mut output = plane.clone();
    let mut kernel = Kernel {
        width,
        missing,
        scratch: Vec::new(),
        candidates: Vec::new(),
    };

    let mut change_ratios = Vec::with_capacity(total);
    let mut no_success = 0usize;
    for (row, col) in mask.marked_positions() {
        let bounds = params.bandwidth.window_at(row, col, height, width);
        let target = plane.get(row, col);
        let (changes, possible_changes, success) =
            kernel.resolve(&mut values, output.as_mut_slice(), bounds, target, &params)?;
        if changes > possible_changes {
            return Err(AttackError::consistency(format!(
                "window at ({row}, {col}) made {changes} edits with only {possible_changes} assignable cells"
            )));
        }
        change_ratios.push(if possible_changes == 0 {
            0.0
        } else {
            changes as f64 / possible_changes as f64
        });
        if !success {
            no_success += 1;
        }
    }

    tracing::debug!(no_success, total, "channel resolved");
    Ok(PlaneOutcome {
        plane: output,
        record: Some(RunRecord {
            change_ratios,
            no_success_fraction: no_success as f64 / total as f64,
        }),
    })
}

struct Kernel<'a> {
    width: usize,
    missing: &'a [bool],
    scratch: Vec<f64>,
    candidates: Vec<(f64, usize)>,
}

impl Kernel<'_> {
    fn median(&mut self, values: &[f64], bounds: WindowBounds) -> Option<f64> {
        self.scratch.clear();
        for r in bounds.row_start..bounds.row_end {
            let row = r * self.width;
            for i in row + bounds.col_start..row + bounds.col_end {
                if !self.missing[i] {
                    self.scratch.push(values[i]);
                }
            }
        }
        median_select(&mut self.scratch)
    }

    /// Returns `(changes, possible_changes, success)`.
    fn resolve(
        &mut self,
        values: &mut [f64],
        output: &mut [u8],
        bounds: WindowBounds,
        target: u8,
        params: &ResolveParams,
    ) -> AttackResult<(usize, usize, bool)> {
        let t = f64::from(target);
        let Some(median) = self.median(values, bounds) else {
            return Ok((0, 0, false));
        };
        if (t - median).abs() < params.eps {
            return Ok((0, 0, true));
        }
        let increase = t > median;

        self.candidates.clear();
        let mut possible_changes = 0usize;
        for r in bounds.row_start..bounds.row_end {
            let row = r * self.width;
            for i in row + bounds.col_start..row + bounds.col_end {
                if self.missing[i] {
                    continue;
                }
                possible_changes += 1;
                let v = values[i];
                if (increase && v < t) || (!increase && v > t) {
                    self.candidates.push((v, i));
                }
            }
        }
        if increase {
            self.candidates.sort_by(|a, b| b.0.total_cmp(&a.0));
        } else {
            self.candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        }

        let mut changes = 0usize;
        for k in 0..self.candidates.len() {
            let i = self.candidates[k].1;
            let median = self.median(values, bounds).ok_or_else(|| {
                AttackError::consistency("window lost every present cell")
            })?;
            if median_crossed(increase, median, t) {
                return Ok((changes, possible_changes, true));
            }
            if budget_exhausted(changes, possible_changes, params.budget_ratio) {
                break;
            }
            values[i] = t;
            output[i] = target;
            changes += 1;
        }
        Ok((changes, possible_changes, false))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/attack/accelerated.rs"]
mod tests;
