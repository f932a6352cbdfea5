//! Regression model export
//!
//! Writes the chosen regression model as a standalone Python function, so a
//! fitted model can be evaluated outside the workbench:
//!
//! ```text
//! """
//! <physical parameters>
//! <chosen pi set>
//! """
//!
//! from numpy import log10 as log      (logarithmic models only)
//!
//! #  Constant(s):                     (constant input pi numbers only)
//!
//! pi3 = 2.0
//! def pyvplm_model(pi2, pi4):
//!     if 0.1 > pi2 or pi2 > 10.0:
//!         print('Warning: pi2 out of bounds, model is out of its validity domain')
//!     ...
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::parameter::{Bounds, ParameterSet};
use crate::save::codec::fmt_float;
use crate::save::{open_unique, SaveError};

const FUNCTION_NAME: &str = "pyvplm_model";
const LOG_CALL: &str = "log(";

/// Inputs of one model export
#[derive(Debug, Clone, Copy)]
pub struct ModelExport<'a> {
    /// Full model, `lhs = rhs`, e.g. `log(pi1) = 0.3 + 1.2*log(pi2)`
    pub expression: &'a str,
    /// Names of the input pi numbers, in argument order
    pub input_pi_names: &'a [String],
    pub chosen_pi_set: &'a ParameterSet,
    pub physical_params: &'a ParameterSet,
}

impl ModelExport<'_> {
    pub fn is_logarithmic(&self) -> bool {
        self.expression.contains(LOG_CALL)
    }

    /// Input pi numbers the expression refers to
    pub fn used_inputs(&self) -> Vec<&str> {
        self.input_pi_names
            .iter()
            .map(String::as_str)
            .filter(|name| mentions(self.expression, name))
            .collect()
    }

    /// Python source of the exported module
    pub fn render(&self) -> Result<String, SaveError> {
        let (lhs, rhs) = self
            .expression
            .split_once('=')
            .ok_or_else(|| SaveError::Export(format!("no '=' in model {:?}", self.expression)))?;
        let (lhs, rhs) = (lhs.trim(), rhs.trim());

        let mut src = format!("\"\"\"\n{}\n{}\n\"\"\"\n\n", self.physical_params, self.chosen_pi_set);
        if self.is_logarithmic() {
            src.push_str("from numpy import log10 as log\n\n");
        }

        let mut constants = String::new();
        let mut arguments = Vec::new();
        let mut warnings = String::new();
        for name in self.used_inputs() {
            let pi = self.chosen_pi_set.get(name).ok_or_else(|| {
                SaveError::Export(format!("{} is not part of the chosen pi set", name))
            })?;
            match pi.bounds {
                Bounds::Constant(value) => {
                    constants.push_str(&format!("{} = {}\n", name, fmt_float(value)));
                }
                Bounds::Range { lower, upper } => {
                    arguments.push(name);
                    warnings.push_str(&format!(
                        "    if {} > {name} or {name} > {}:\n        print('Warning: {name} out of bounds, model is out of its validity domain')\n",
                        fmt_float(lower),
                        fmt_float(upper),
                    ));
                }
            }
        }
        if !constants.is_empty() {
            src.push_str("#  Constant(s):\n\n");
            src.push_str(&constants);
        }

        src.push_str(&format!("def {}({}):\n", FUNCTION_NAME, arguments.join(", ")));
        src.push_str(&warnings);
        if self.is_logarithmic() {
            let output = lhs.replace(LOG_CALL, "").replace(')', "");
            src.push_str(&format!("    log10_{} = {}\n", output, rhs));
            src.push_str(&format!("    {output} = 10**log10_{output}\n"));
            src.push_str(&format!("    return {}\n", output));
        } else {
            src.push_str(&format!("    {}\n", self.expression.trim()));
            src.push_str(&format!("    return {}\n", lhs));
        }
        Ok(src)
    }
}

/// Write `export` to `<dir>/<prefix>_<ddmmyy_HHMMSS>.py`, or a marked variant
/// of that name if it is taken. Returns the path actually written.
pub fn export_model_function(
    dir: &Path,
    prefix: &str,
    now: NaiveDateTime,
    export: &ModelExport<'_>,
) -> Result<PathBuf, SaveError> {
    let source = export.render()?;
    let target = dir.join(format!("{}_{}.py", prefix, now.format("%d%m%y_%H%M%S")));

    let (mut file, path) = open_unique(&target)?;
    if let Err(e) = file.write_all(source.as_bytes()).and_then(|_| file.sync_all()) {
        drop(file);
        let _ = std::fs::remove_file(&path);
        return Err(e.into());
    }

    log::info!("Saved python file as: {}", path.display());
    Ok(path)
}

/// `name` appears in `expression` as a whole identifier
fn mentions(expression: &str, name: &str) -> bool {
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    expression.match_indices(name).any(|(start, _)| {
        let before = expression[..start].chars().next_back();
        let after = expression[start + name.len()..].chars().next();
        !before.is_some_and(is_ident) && !after.is_some_and(is_ident)
    })
}
