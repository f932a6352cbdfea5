//! Pi sets produced by the Buckingham tab

use serde::{Deserialize, Serialize};

use crate::parameter::ParameterSet;

/// The three ways a pi set can be produced: simple Buckingham, forced
/// Buckingham, and the automatic candidate search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiSetTriple {
    pub simple: Option<ParameterSet>,
    pub forced: Option<ParameterSet>,
    pub automatic: Vec<ParameterSet>,
}

impl PiSetTriple {
    pub fn is_empty(&self) -> bool {
        self.simple.is_none() && self.forced.is_none() && self.automatic.is_empty()
    }
}

/// Same triple as `PiSetTriple`, in expression-list form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PiListTriple {
    pub simple: Vec<String>,
    pub forced: Vec<String>,
    pub automatic: Vec<Vec<String>>,
}

impl PiListTriple {
    pub fn is_empty(&self) -> bool {
        self.simple.is_empty() && self.forced.is_empty() && self.automatic.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab2State {
    pub simple_selected: bool,
    pub forced_selected: bool,
    pub auto_selected: bool,
    pub forced_locked: bool,
    /// 1-based index into the automatic candidates, 0 when none is chosen
    pub auto_chosen_index: u32,
}

impl Tab2State {
    /// Zero-based index of the chosen automatic candidate
    pub fn chosen_candidate(&self) -> Option<usize> {
        match self.auto_chosen_index {
            0 => None,
            n => Some(n as usize - 1),
        }
    }
}

/// Row of the automatic Buckingham table as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoCandidateRow {
    pub pi_set_number: usize,
    pub expressions: String,
}
