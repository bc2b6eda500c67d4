//! Baseline median-filter defense.
//!
//! Every marked pixel is replaced by the median of its window, computed over the unmarked pixels
//! only. This is the filter [`crate::AdaptiveMedianAttack`] is built to survive; it is handy for
//! measuring how close an attacked image gets to its targets.

use crate::attack::state::WorkingState;
use crate::foundation::core::{AttackImage, Bandwidth, Plane, TargetMask};
use crate::foundation::error::AttackResult;

/// Filter one channel. Pixels whose window holds no unmarked cell keep their value.
pub fn median_filter_defense(
    plane: &Plane,
    mask: &TargetMask,
    bandwidth: Bandwidth,
) -> AttackResult<Plane> {
    let state = WorkingState::from_plane(plane, mask)?;
    let mut out = plane.clone();
    let mut scratch = Vec::new();
    for (row, col) in mask.marked_positions() {
        let bounds = bandwidth.window_at(row, col, plane.height(), plane.width());
        if let Some(median) = state.window_median(bounds, &mut scratch) {
            out.set(row, col, median.round().clamp(0.0, 255.0) as u8);
        }
    }
    Ok(out)
}

/// Filter every channel of `image` with the same mask.
#[tracing::instrument(skip_all, fields(channels = image.channels()))]
pub fn defend_image(
    image: &AttackImage,
    mask: &TargetMask,
    bandwidth: Bandwidth,
) -> AttackResult<AttackImage> {
    let planes = image
        .planes()
        .iter()
        .map(|plane| median_filter_defense(plane, mask, bandwidth))
        .collect::<AttackResult<Vec<_>>>()?;
    AttackImage::from_planes(planes)
}
