//! Percentage-deviation calculation
//!
//! Diffs use integer-truncating division, matching how the values are
//! consumed downstream. A recommended value of zero makes the ratio
//! undefined; that dimension yields "no diff available" instead of a
//! division fault.

use crate::join::JoinedContainer;

/// Deviation of a container's requests from its recommendation, in
/// whole percent. `None` means the ratio is undefined for that
/// dimension (zero recommendation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContainerDiff {
    pub cpu: Option<i64>,
    pub memory: Option<i64>,
}

impl ContainerDiff {
    /// Combined severity score, present only when both dimensions are.
    pub fn combined(&self) -> Option<i64> {
        match (self.cpu, self.memory) {
            (Some(c), Some(m)) => Some(c + m),
            _ => None,
        }
    }
}

/// `(requested - recommended) * 100 / recommended`, truncated toward
/// zero. Zero recommendations have no defined deviation.
pub fn percent_diff(requested: i64, recommended: i64) -> Option<i64> {
    if recommended == 0 {
        return None;
    }
    Some((requested - recommended) * 100 / recommended)
}

/// Diff a container against its matched recommendation, if any.
pub fn container_diff(container: &JoinedContainer) -> ContainerDiff {
    match container.target {
        Some(target) => ContainerDiff {
            cpu: percent_diff(container.cpu_milli, target.cpu_milli),
            memory: percent_diff(container.memory_bytes, target.memory_bytes),
        },
        None => ContainerDiff::default(),
    }
}

/// Convert bytes to mebibytes with one decimal place for display.
pub fn mebibytes(bytes: i64) -> f64 {
    ((bytes as f64) * 10.0 / 1_048_576.0).round() / 10.0
}
