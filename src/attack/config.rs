use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{AttackError, AttackResult};

/// Tolerance below which a window is considered to already match its target.
pub const DEFAULT_EPS: f64 = 3.0;

/// User-facing attack options, typically loaded from JSON.
///
/// Validate with [`AttackConfig::validate`] to obtain [`AttackSettings`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AttackConfig {
    /// Emit per-channel summaries at `info` level instead of `debug`.
    pub verbose: bool,
    /// Only overwrite cells no earlier window has claimed.
    pub unused_only: bool,
    /// Maximum fraction of a window's assignable cells that may be overwritten, in `[0, 1]`.
    pub allowed_ratio_of_change: f64,
    /// Tolerance below which no perturbation is attempted.
    pub eps: f64,
    /// Use the buffer-reusing kernel with parallel channels.
    pub use_accelerated_path: bool,
    /// Worker threads for the accelerated path. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            unused_only: false,
            allowed_ratio_of_change: 1.0,
            eps: DEFAULT_EPS,
            use_accelerated_path: false,
            threads: None,
        }
    }
}

impl AttackConfig {
    /// Parse a config from a JSON reader. Missing fields take their defaults.
    pub fn from_reader<R: std::io::Read>(r: R) -> AttackResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| AttackError::validation(format!("parse attack config JSON: {e}")))
    }

    /// Parse a config from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> AttackResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AttackError::validation(format!("open attack config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check ranges and mode compatibility.
    pub fn validate(&self) -> AttackResult<AttackSettings> {
        let ratio = self.allowed_ratio_of_change;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            return Err(AttackError::validation(format!(
                "allowed_ratio_of_change must be within [0, 1], got {ratio}"
            )));
        }
        if !self.eps.is_finite() || self.eps < 0.0 {
            return Err(AttackError::validation(format!(
                "eps must be finite and >= 0, got {}",
                self.eps
            )));
        }
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(AttackError::validation("'threads' must be >= 1 when set"));
        }

        let path = match (self.use_accelerated_path, self.unused_only) {
            (true, true) => {
                return Err(AttackError::unsupported_config(
                    "unused_only is not available on the accelerated path",
                ));
            }
            (true, false) => ExecutionPath::Accelerated {
                threads: self.threads,
            },
            (false, unused_only) => ExecutionPath::Reference {
                reuse: if unused_only {
                    PixelReuse::UnusedOnly
                } else {
                    PixelReuse::AllowOverlap
                },
            },
        };

        Ok(AttackSettings {
            verbose: self.verbose,
            allowed_ratio_of_change: ratio,
            eps: self.eps,
            path,
        })
    }
}

/// How overlapping windows treat cells an earlier window already overwrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelReuse {
    /// Any present cell may be overwritten again.
    AllowOverlap,
    /// Cells claimed by an earlier window are off limits.
    UnusedOnly,
}

/// Which kernel resolves the windows.
///
/// The accelerated kernel only implements [`PixelReuse::AllowOverlap`], so it carries no reuse
/// option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionPath {
    /// Straightforward kernel; channels run one after another.
    Reference {
        /// Overlap policy.
        reuse: PixelReuse,
    },
    /// Buffer-reusing kernel; channels run on a dedicated rayon pool.
    Accelerated {
        /// Worker thread override.
        threads: Option<usize>,
    },
}

impl ExecutionPath {
    /// Overlap policy implied by this path.
    pub fn reuse(self) -> PixelReuse {
        match self {
            Self::Reference { reuse } => reuse,
            Self::Accelerated { .. } => PixelReuse::AllowOverlap,
        }
    }
}

/// Validated attack options. Only obtainable through [`AttackConfig::validate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttackSettings {
    verbose: bool,
    allowed_ratio_of_change: f64,
    eps: f64,
    path: ExecutionPath,
}

impl AttackSettings {
    /// Whether summaries are logged at `info`.
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Per-window change budget.
    pub fn allowed_ratio_of_change(&self) -> f64 {
        self.allowed_ratio_of_change
    }

    /// Satisfaction tolerance.
    pub fn eps(&self) -> f64 {
        self.eps
    }

    /// Selected kernel.
    pub fn path(&self) -> ExecutionPath {
        self.path
    }
}

impl Default for AttackSettings {
    fn default() -> Self {
        Self {
            verbose: false,
            allowed_ratio_of_change: 1.0,
            eps: DEFAULT_EPS,
            path: ExecutionPath::Reference {
                reuse: PixelReuse::AllowOverlap,
            },
        }
    }
}

impl TryFrom<&AttackConfig> for AttackSettings {
    type Error = AttackError;

    fn try_from(config: &AttackConfig) -> AttackResult<Self> {
        config.validate()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/attack/config.rs"]
mod tests;
