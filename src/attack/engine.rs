use crate::attack::config::PixelReuse;
use crate::attack::selector::take_closest_values;
use crate::attack::state::{ConsumptionMarker, WorkingState};
use crate::attack::stats::RunRecord;
use crate::foundation::core::{Bandwidth, Plane, TargetMask};
use crate::foundation::error::{AttackError, AttackResult};
use crate::foundation::math::median_crossed;

/// Parameters shared by every window of one channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveParams {
    /// Half-extent of each window.
    pub bandwidth: Bandwidth,
    /// Tolerance below which a window already matches its target.
    pub eps: f64,
    /// Maximum `changes / possible_changes` per window.
    pub budget_ratio: f64,
    /// Overlap policy for cells claimed by earlier windows.
    pub reuse: PixelReuse,
}

impl ResolveParams {
    pub(crate) fn validate(&self) -> AttackResult<()> {
        if !self.budget_ratio.is_finite() || !(0.0..=1.0).contains(&self.budget_ratio) {
            return Err(AttackError::validation(format!(
                "budget ratio must be within [0, 1], got {}",
                self.budget_ratio
            )));
        }
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(AttackError::validation(format!(
                "eps must be finite and >= 0, got {}",
                self.eps
            )));
        }
        Ok(())
    }
}

/// What happened inside one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct WindowOutcome {
    /// Cells overwritten with the target.
    pub changes: usize,
    /// Cells that were eligible for overwriting when the window was visited.
    pub possible_changes: usize,
    /// The window median reached the target.
    pub success: bool,
}

impl WindowOutcome {
    /// Median already within tolerance; nothing to do.
    pub(crate) const SATISFIED: Self = Self {
        changes: 0,
        possible_changes: 0,
        success: true,
    };

    /// Every cell of the window is missing, so there is no median to move.
    pub(crate) const UNRESOLVABLE: Self = Self {
        changes: 0,
        possible_changes: 0,
        success: false,
    };

    /// `changes / possible_changes`, or `0` when nothing was eligible.
    pub fn change_ratio(&self) -> f64 {
        if self.possible_changes == 0 {
            return 0.0;
        }
        self.changes as f64 / self.possible_changes as f64
    }
}

/// Filtered channel plus its statistics. `record` is `None` when the mask marked nothing.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneOutcome {
    /// Perturbed channel.
    pub plane: Plane,
    /// Statistics for this channel.
    pub record: Option<RunRecord>,
}

impl PlaneOutcome {
    pub(crate) fn untouched(plane: &Plane) -> Self {
        Self {
            plane: plane.clone(),
            record: None,
        }
    }
}

/// Perturb one channel so the median of each marked pixel's window moves onto that pixel's value.
///
/// Windows are resolved in row-major order of the marked positions; later windows see the
/// cells earlier windows overwrote.
#[tracing::instrument(skip(plane, mask), fields(width = plane.width(), height = plane.height()))]
pub fn resolve_plane(
    plane: &Plane,
    mask: &TargetMask,
    params: ResolveParams,
) -> AttackResult<PlaneOutcome> {
    params.validate()?;
    mask.ensure_shape(plane.width(), plane.height())?;

    let total = mask.marked_count();
    if total == 0 {
        tracing::warn!("mask marks no pixels; channel left unchanged");
        return Ok(PlaneOutcome::untouched(plane));
    }

    let mut resolver = ChannelResolver::new(plane, mask, params)?;
    let mut change_ratios = Vec::with_capacity(total);
    let mut no_success = 0usize;
    for (row, col) in mask.marked_positions() {
        let outcome = resolver.resolve_window(row, col, plane.get(row, col))?;
        change_ratios.push(outcome.change_ratio());
        if !outcome.success {
            no_success += 1;
        }
    }

    tracing::debug!(no_success, total, "channel resolved");
    Ok(PlaneOutcome {
        plane: resolver.into_output(),
        record: Some(RunRecord {
            change_ratios,
            no_success_fraction: no_success as f64 / total as f64,
        }),
    })
}

pub(crate) fn budget_exhausted(changes: usize, possible_changes: usize, budget_ratio: f64) -> bool {
    possible_changes == 0 || changes as f64 / possible_changes as f64 >= budget_ratio
}

/// Mutable state of one channel while its windows are resolved.
pub(crate) struct ChannelResolver {
    params: ResolveParams,
    state: WorkingState,
    marker: ConsumptionMarker,
    output: Plane,
    scratch: Vec<f64>,
}

impl ChannelResolver {
    pub(crate) fn new(plane: &Plane, mask: &TargetMask, params: ResolveParams) -> AttackResult<Self> {
        let state = WorkingState::from_plane(plane, mask)?;
        let marker = ConsumptionMarker::from_state(&state);
        Ok(Self {
            params,
            state,
            marker,
            output: plane.clone(),
            scratch: Vec::new(),
        })
    }

    #[cfg(test)]
    pub(crate) fn window_median_at(&mut self, row: usize, col: usize) -> Option<f64> {
        let bounds = self
            .params
            .bandwidth
            .window_at(row, col, self.state.height(), self.state.width());
        self.state.window_median(bounds, &mut self.scratch)
    }

    pub(crate) fn resolve_window(
        &mut self,
        row: usize,
        col: usize,
        target: u8,
    ) -> AttackResult<WindowOutcome> {
        let bounds = self
            .params
            .bandwidth
            .window_at(row, col, self.state.height(), self.state.width());
        let target_value = f64::from(target);

        let Some(median) = self.state.window_median(bounds, &mut self.scratch) else {
            return Ok(WindowOutcome::UNRESOLVABLE);
        };
        if (target_value - median).abs() < self.params.eps {
            return Ok(WindowOutcome::SATISFIED);
        }

        let increase = target_value > median;
        let candidates = take_closest_values(
            &self.state.window_cells(bounds),
            bounds.width(),
            increase,
            target_value,
        );
        let possible_changes = match self.params.reuse {
            PixelReuse::UnusedOnly => self.marker.available_in(bounds),
            PixelReuse::AllowOverlap => self.state.present_in(bounds),
        };

        let mut changes = 0usize;
        let mut success = false;
        for (local_row, local_col) in candidates {
            let median = self
                .state
                .window_median(bounds, &mut self.scratch)
                .ok_or_else(|| {
                    AttackError::consistency(format!(
                        "window at ({row}, {col}) lost every present cell"
                    ))
                })?;
            if median_crossed(increase, median, target_value) {
                success = true;
                break;
            }
            if budget_exhausted(changes, possible_changes, self.params.budget_ratio) {
                break;
            }

            let (r, c) = bounds.to_absolute(local_row, local_col);
            let claimable = match self.params.reuse {
                PixelReuse::AllowOverlap => true,
                PixelReuse::UnusedOnly => self.marker.is_available(r, c),
            };
            if self.state.get(r, c).is_some() && claimable {
                self.state.assign(r, c, target_value);
                self.output.set(r, c, target);
                self.marker.consume(r, c);
                changes += 1;
            }
        }

        if changes > possible_changes {
            return Err(AttackError::consistency(format!(
                "window at ({row}, {col}) made {changes} edits with only {possible_changes} assignable cells"
            )));
        }
        Ok(WindowOutcome {
            changes,
            possible_changes,
            success,
        })
    }

    pub(crate) fn into_output(self) -> Plane {
        self.output
    }
}

#[cfg(test)]
#[path = "../../tests/unit/attack/engine.rs"]
mod tests;
