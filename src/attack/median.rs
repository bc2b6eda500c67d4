use rayon::prelude::*;

use crate::attack::accelerated::resolve_plane_accelerated;
use crate::attack::config::{AttackConfig, AttackSettings, ExecutionPath};
use crate::attack::engine::{PlaneOutcome, ResolveParams, resolve_plane};
use crate::attack::stats::RunStatistics;
use crate::foundation::core::{AttackImage, Bandwidth, Plane, TargetMask};
use crate::foundation::error::{AttackError, AttackResult};

/// Adaptive attack against a median-filter defense.
///
/// The defense replaces every marked pixel with the median of its window (marked pixels
/// excluded). This attack rewrites neighbouring pixels so that median lands back on the
/// marked pixel's value. Each channel is attacked independently with the same mask.
#[derive(Clone, Debug)]
pub struct AdaptiveMedianAttack {
    settings: AttackSettings,
    bandwidth: Bandwidth,
}

impl AdaptiveMedianAttack {
    /// Build an attack from validated settings and the defense's window bandwidth.
    pub fn new(settings: AttackSettings, bandwidth: Bandwidth) -> Self {
        Self {
            settings,
            bandwidth,
        }
    }

    /// Validate `config` and build an attack from it.
    pub fn from_config(config: &AttackConfig, bandwidth: Bandwidth) -> AttackResult<Self> {
        Ok(Self::new(config.validate()?, bandwidth))
    }

    /// Settings in effect.
    pub fn settings(&self) -> &AttackSettings {
        &self.settings
    }

    /// Window half-extent in effect.
    pub fn bandwidth(&self) -> Bandwidth {
        self.bandwidth
    }

    fn params(&self) -> ResolveParams {
        ResolveParams {
            bandwidth: self.bandwidth,
            eps: self.settings.eps(),
            budget_ratio: self.settings.allowed_ratio_of_change(),
            reuse: self.settings.path().reuse(),
        }
    }

    /// Attack every channel of `image` and append one record per channel to `stats`.
    ///
    /// An empty mask returns the image unchanged and appends nothing.
    #[tracing::instrument(skip_all, fields(channels = image.channels()))]
    pub fn counter_attack(
        &self,
        image: &AttackImage,
        mask: &TargetMask,
        stats: &mut RunStatistics,
    ) -> AttackResult<AttackImage> {
        mask.ensure_shape(image.width(), image.height())?;
        let params = self.params();
        let planes = image.planes();

        let outcomes = match self.settings.path() {
            ExecutionPath::Reference { .. } => planes
                .iter()
                .enumerate()
                .map(|(ch, plane)| {
                    tracing::debug!(channel = ch, "resolving channel");
                    resolve_plane(plane, mask, params)
                })
                .collect::<AttackResult<Vec<_>>>()?,
            ExecutionPath::Accelerated { threads } => {
                let pool = build_thread_pool(threads)?;
                pool.install(|| {
                    planes
                        .par_iter()
                        .map(|plane| resolve_plane_accelerated(plane, mask, params))
                        .collect::<AttackResult<Vec<_>>>()
                })?
            }
        };

        let mut filtered: Vec<Plane> = Vec::with_capacity(outcomes.len());
        for (ch, PlaneOutcome { plane, record }) in outcomes.into_iter().enumerate() {
            if let Some(record) = record {
                let pct = record.no_success_fraction * 100.0;
                if self.settings.verbose() {
                    tracing::info!(channel = ch, "no success: {pct:.2}%");
                } else {
                    tracing::debug!(channel = ch, "no success: {pct:.2}%");
                }
                stats.push(record);
            }
            filtered.push(plane);
        }
        AttackImage::from_planes(filtered)
    }
}

fn build_thread_pool(threads: Option<usize>) -> AttackResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(AttackError::validation("'threads' must be >= 1 when set"));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| AttackError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/attack/median.rs"]
mod tests;
