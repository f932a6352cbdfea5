//! Session state aggregate
//!
//! `SessionState` is the snapshot handed to the encoder right before a save
//! and rebuilt by the decoder right after a load. The serializer keeps no
//! state between calls.

use serde::{Deserialize, Serialize};

use crate::doe::{DoeBundle, DoeConstraints, DoeParams};
use crate::parameter::{ParameterRecord, ParameterSet, Role};
use crate::pi::{AutoCandidateRow, PiListTriple, PiSetTriple, Tab2State};
use crate::regression::{ModelCollection, RegressionTabState};
use crate::result::{DependencyState, ImportedResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Physical parameter table rows
    pub parameters: Vec<ParameterRecord>,

    /// Content of the simple Buckingham area
    pub buckingham_text: String,

    /// Content of the forced Buckingham area
    pub forced_text: String,

    /// Expressions of the automatic Buckingham table, one per candidate
    pub auto_candidates: Vec<String>,

    /// Checkbox state of the Buckingham tab
    pub tab2: Tab2State,

    /// Defined physical parameters
    pub physical_params: Option<ParameterSet>,

    /// All generated pi sets
    pub pi_sets: PiSetTriple,

    /// Pi set currently chosen in the Buckingham tab
    pub chosen_pi_set: Option<ParameterSet>,

    /// All generated pi sets in expression form
    pub pi_lists: PiListTriple,

    /// Chosen pi set in expression form
    pub chosen_pi_list: Vec<String>,

    /// Physical and pi constraint texts of the DOE tab
    pub constraints: DoeConstraints,

    /// Inputs used to generate the DOE
    pub doe_params: DoeParams,

    /// Last generated DOE arrays
    pub doe: DoeBundle,

    /// Last imported result
    pub result: ImportedResult,

    /// Dependency tab checkboxes and R^2 threshold
    pub dependency: DependencyState,

    /// Effective pi list for the regression, `None` for excluded pi numbers
    pub regression_pi_list: Vec<Option<String>>,

    /// Regression tab widget state
    pub regression_tab: RegressionTabState,

    /// Computed regression models
    pub models: ModelCollection,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameters declared as outputs
    pub fn output_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.role == Role::Output).count()
    }

    /// Automatic candidates numbered the way the Buckingham table shows them
    pub fn auto_candidate_rows(&self) -> Vec<AutoCandidateRow> {
        self.auto_candidates
            .iter()
            .enumerate()
            .map(|(i, expressions)| AutoCandidateRow {
                pi_set_number: i + 1,
                expressions: expressions.clone(),
            })
            .collect()
    }
}
