//! Startup requirement validation for pmon.
//!
//! This module checks that the memory accounting files can be read before
//! sampling starts.

use nix::unistd::geteuid;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("cannot read {path}: {source}")]
    ProcUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validate all runtime requirements
pub fn validate_requirements(proc_root: &Path) -> Result<(), ValidationError> {
    check_user_privileges();
    check_proc_access(proc_root)?;
    debug!("All runtime requirements validated");
    Ok(())
}

/// Other users' processes are only readable with enough privileges
fn check_user_privileges() {
    report_privileges(geteuid().is_root());
}

fn report_privileges(is_root: bool) {
    if is_root {
        debug!("Running as root (uid=0)");
    } else {
        warn!("Not running as root - processes of other users may not be readable");
    }
}

/// Check that our own statm record can be read
fn check_proc_access(proc_root: &Path) -> Result<(), ValidationError> {
    let path = proc_root.join("self").join("statm");

    match fs::read_to_string(&path) {
        Ok(_) => {
            debug!("{} is readable", path.display());
            Ok(())
        }
        Err(source) => {
            warn!("Cannot read {}: {}", path.display(), source);
            Err(ValidationError::ProcUnreadable { path, source })
        }
    }
}
