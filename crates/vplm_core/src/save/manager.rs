use super::error::SaveError;
use super::format::{decode_session, encode_session};
use super::path::open_unique;

use chrono::NaiveDateTime;
use std::fs::{remove_file, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use crate::config::{ArrayLayout, SaveConfig};
use crate::export::{export_model_function, ModelExport};
use crate::session::SessionState;

const QUICK_SAVE_STAMP: &str = "%d-%m-%y_%H-%M-%S";

/// Encode `state` and write it to `path`, or to a marked variant if `path` is taken.
///
/// Encoding happens before any file is created, so a state that cannot be
/// written leaves nothing behind. An existing file is never truncated.
pub fn save_session(
    path: &Path,
    state: &SessionState,
    layout: ArrayLayout,
) -> Result<PathBuf, SaveError> {
    let text = encode_session(state, layout)?;

    let (mut file, path) = open_unique(path)?;
    let written = file
        .write_all(text.as_bytes())
        .and_then(|_| file.flush())
        // sync_all ensures data is written to disk (portable fsync)
        .and_then(|_| file.sync_all());
    if let Err(e) = written {
        drop(file);
        let _ = remove_file(&path);
        return Err(e.into());
    }

    log::debug!("Saved {} bytes to {:?}", text.len(), path);
    log::info!("Saved at: {}", path.display());
    Ok(path)
}

/// Read and decode a session file.
///
/// A missing path is retried once with doubled backslashes collapsed, which is
/// how Windows paths typed into the UI arrive.
pub fn load_session(path: &Path) -> Result<SessionState, SaveError> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => retry_normalized(path)?,
        Err(e) => return Err(e.into()),
    };
    let mut text = String::new();
    file.read_to_string(&mut text)?;

    let state = decode_session(&text)?;
    log::debug!("Loaded {} bytes from {:?}", text.len(), path);
    log::info!("Loaded {}", path.display());
    Ok(state)
}

fn retry_normalized(path: &Path) -> Result<File, SaveError> {
    let not_found = || SaveError::FileNotFound { path: path.display().to_string() };
    let original = path.to_string_lossy();
    if !original.contains("\\\\") {
        return Err(not_found());
    }
    let normalized = PathBuf::from(original.replace("\\\\", "\\"));
    log::warn!("{} not found, retrying as {}", path.display(), normalized.display());
    match File::open(&normalized) {
        Ok(file) => Ok(file),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found()),
        Err(e) => Err(e.into()),
    }
}

/// Session files of one working directory
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    config: SaveConfig,
}

impl SessionStore {
    pub fn new(config: SaveConfig) -> Self {
        Self { config }
    }

    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self::new(SaveConfig::with_work_dir(work_dir))
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    /// Quick save to `<prefix>_<dd-mm-yy_HH-MM-SS>.<ext>` in the working directory
    pub fn save(&self, state: &SessionState, now: NaiveDateTime) -> Result<PathBuf, SaveError> {
        let name = format!("{}_{}", self.config.session_prefix, now.format(QUICK_SAVE_STAMP));
        save_session(&self.session_path(&name), state, self.config.array_layout)
    }

    /// Save under a user-chosen name, extension added
    pub fn save_as(&self, state: &SessionState, name: &str) -> Result<PathBuf, SaveError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SaveError::InvalidName(name.to_string()));
        }
        save_session(&self.session_path(name), state, self.config.array_layout)
    }

    /// Load a session; relative paths resolve against the working directory
    pub fn load(&self, path: impl AsRef<Path>) -> Result<SessionState, SaveError> {
        load_session(&self.config.work_dir.join(path))
    }

    /// Export the model of the chosen term count as a Python function.
    ///
    /// `input_pi_names` are the regression inputs, in argument order.
    pub fn export_model(
        &self,
        state: &SessionState,
        input_pi_names: &[String],
        now: NaiveDateTime,
    ) -> Result<PathBuf, SaveError> {
        let term_count = state.regression_tab.chosen_term_count as usize;
        let model = state.models.model(term_count).ok_or_else(|| {
            SaveError::Export(format!("no regression model with {} terms", term_count))
        })?;
        let (Some(physical_params), Some(chosen_pi_set)) =
            (state.physical_params.as_ref(), state.chosen_pi_set.as_ref())
        else {
            return Err(SaveError::Export("physical parameters and pi set must be defined".into()));
        };

        let export = ModelExport {
            expression: &model.expression,
            input_pi_names,
            chosen_pi_set,
            physical_params,
        };
        export_model_function(&self.config.work_dir, &self.config.model_prefix, now, &export)
    }

    fn session_path(&self, name: &str) -> PathBuf {
        self.config.work_dir.join(format!("{}.{}", name, self.config.session_extension))
    }
}
