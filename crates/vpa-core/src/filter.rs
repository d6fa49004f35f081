//! Mode-based row filtering
//!
//! The invert/mode interaction is easy to get wrong as inline boolean
//! algebra, so the gate is an explicit four-case decision table and
//! each case is tested directly.

use crate::models::Mode;

/// The mode gate, fixed at argument-parsing time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeGate {
    /// No modes selected, no invert: everything passes the gate.
    NoFilter,
    /// Only rows whose recommendation carries one of these modes pass;
    /// rows without a recommendation never do.
    Modes(Vec<Mode>),
    /// Invert with no modes selected: identity passthrough.
    InvertAll,
    /// Invert with modes selected: rows that would match are dropped,
    /// everything else passes.
    InvertModes(Vec<Mode>),
}

impl ModeGate {
    pub fn new(modes: &[Mode], invert: bool) -> Self {
        match (modes.is_empty(), invert) {
            (true, false) => ModeGate::NoFilter,
            (false, false) => ModeGate::Modes(modes.to_vec()),
            (true, true) => ModeGate::InvertAll,
            (false, true) => ModeGate::InvertModes(modes.to_vec()),
        }
    }

    /// Evaluate the gate for a row. `mode` is the recommendation's mode
    /// when the row has a matched recommendation with one.
    pub fn allows(&self, mode: Option<Mode>) -> bool {
        let matches = |selected: &[Mode]| mode.is_some_and(|m| selected.contains(&m));
        match self {
            ModeGate::NoFilter | ModeGate::InvertAll => true,
            ModeGate::Modes(selected) => matches(selected),
            ModeGate::InvertModes(selected) => !matches(selected),
        }
    }

    fn inverted(&self) -> bool {
        matches!(self, ModeGate::InvertAll | ModeGate::InvertModes(_))
    }
}

/// Full row-inclusion decision: the mode gate plus the eligibility
/// clause (all pods, a full recommendation-plus-container match, or an
/// inverted filter).
#[derive(Debug, Clone)]
pub struct RowFilter {
    pub gate: ModeGate,
    pub all_pods: bool,
}

impl RowFilter {
    pub fn new(modes: &[Mode], invert: bool, all_pods: bool) -> Self {
        RowFilter {
            gate: ModeGate::new(modes, invert),
            all_pods,
        }
    }

    pub fn includes(&self, full_match: bool, mode: Option<Mode>) -> bool {
        let eligible = self.all_pods || full_match || self.gate.inverted();
        eligible && self.gate.allows(mode)
    }
}
