//! median-adapt perturbs attacker-controlled pixels so that a median-filter defense against
//! image-scaling attacks hands them back unchanged.
//!
//! A median-filter defense replaces every suspicious pixel (a [`TargetMask`] entry) with the
//! median of its surrounding window, ignoring the other suspicious pixels. The attack walks the
//! marked pixels in row-major order and, for each, overwrites the window cells closest to the
//! target on the wrong side until the window median crosses the target or a per-window budget
//! runs out.
//!
//! # Pipeline overview
//!
//! 1. **Configure**: [`AttackConfig`] → [`AttackSettings`] (rejects unsupported mode combinations)
//! 2. **Attack**: [`AdaptiveMedianAttack::counter_attack`] splits channels, resolves each with
//!    [`resolve_plane`] and reassembles the image
//! 3. **Record**: one [`RunRecord`] per channel is appended to a caller-owned [`RunStatistics`]
//! 4. **Check** (optional): [`defend_image`] applies the baseline defense to the result
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod attack;
mod defense;
mod foundation;

pub use assets::decode::{
    attack_image_from_dynamic, decode_attack_image, decode_target_mask, encode_png,
};
pub use attack::config::{AttackConfig, AttackSettings, DEFAULT_EPS, ExecutionPath, PixelReuse};
pub use attack::engine::{PlaneOutcome, ResolveParams, resolve_plane};
pub use attack::median::AdaptiveMedianAttack;
pub use attack::selector::take_closest_values;
pub use attack::stats::{RunRecord, RunStatistics};
pub use defense::{defend_image, median_filter_defense};
pub use foundation::core::{AttackImage, Bandwidth, Plane, TargetMask, WindowBounds};
pub use foundation::error::{AttackError, AttackResult};
