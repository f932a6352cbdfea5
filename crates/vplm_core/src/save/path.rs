//! Non-clobbering file creation
//!
//! A taken name gets `(1)` inserted before its extension. Markers nest rather
//! than count, so the third file written as `a.txt` becomes `a(1)(1).txt`.

use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// `dir/name.ext` -> `dir/name(1).ext`. `None` if `path` has no file name.
pub fn with_copy_marker(path: &Path) -> Option<PathBuf> {
    let stem = path.file_stem()?;
    let mut name = OsString::from(stem);
    name.push("(1)");
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    Some(path.with_file_name(name))
}

/// Create a new file at `path` or at the first free marked variant of it.
///
/// Existence check and creation are one `create_new` call, so two writers
/// racing for the same name never end up sharing a file. Errors other than
/// `AlreadyExists` are returned unchanged.
pub fn open_unique(path: &Path) -> io::Result<(File, PathBuf)> {
    let mut candidate = path.to_path_buf();
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => {
                if candidate != path {
                    log::warn!("{:?} already exists, writing {:?}", path, candidate);
                }
                return Ok((file, candidate));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                candidate = with_copy_marker(&candidate).ok_or_else(|| {
                    io::Error::new(io::ErrorKind::InvalidInput, "path has no file name")
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}
