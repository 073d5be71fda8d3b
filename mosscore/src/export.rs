//! Handing search results to an external mail reader.

use std::fs;
use std::path::Path;
use std::process::Command;

use log::{debug, info};

use crate::error::{MossError, MossResult};
use crate::mailstore::StoredMessage;

/// Placeholder for the maildir path in viewer command templates.
pub const PATH_PLACEHOLDER: &str = "{}";

pub trait ResultViewer {
    fn show(&mut self, messages: &[StoredMessage]) -> MossResult<()>;
}

/// Write `messages` as a maildir rooted at `dir`, one file per message in `new/`.
pub fn write_maildir(dir: &Path, messages: &[StoredMessage]) -> MossResult<()> {
    for sub in ["cur", "new", "tmp"] {
        fs::create_dir_all(dir.join(sub))?;
    }
    for (i, message) in messages.iter().enumerate() {
        fs::write(dir.join("new").join(format!("{:06}.moss", i + 1)), &message.raw)?;
    }
    debug!("Wrote {} messages to {}", messages.len(), dir.display());
    Ok(())
}

/// Split a command template into program and arguments, substituting `path`.
///
/// The path is appended as the last argument when the template does not mention it.
pub fn viewer_command(template: &str, path: &Path) -> MossResult<Command> {
    let path = path.display().to_string();
    let mut words = template.split_whitespace();
    let program = words
        .next()
        .ok_or_else(|| MossError::Viewer("empty viewer command".to_string()))?;

    let mut command = Command::new(program.replace(PATH_PLACEHOLDER, &path));
    let mut substituted = program.contains(PATH_PLACEHOLDER);
    for word in words {
        substituted |= word.contains(PATH_PLACEHOLDER);
        command.arg(word.replace(PATH_PLACEHOLDER, &path));
    }
    if !substituted {
        command.arg(&path);
    }
    Ok(command)
}

/// Runs a mail reader on a temporary maildir holding the results.
#[derive(Debug, Clone)]
pub struct ExternalViewer {
    template: String,
}

impl ExternalViewer {
    pub fn new(template: impl Into<String>) -> Self {
        ExternalViewer {
            template: template.into(),
        }
    }
}

impl ResultViewer for ExternalViewer {
    fn show(&mut self, messages: &[StoredMessage]) -> MossResult<()> {
        // Removed on drop, whichever way this function returns.
        let dir = tempfile::Builder::new().prefix("moss-results-").tempdir()?;
        write_maildir(dir.path(), messages)?;

        let mut command = viewer_command(&self.template, dir.path())?;
        info!("Showing {} messages with {:?}", messages.len(), command);
        let status = command
            .status()
            .map_err(|e| MossError::Viewer(format!("cannot run '{}': {e}", self.template)))?;
        if !status.success() {
            return Err(MossError::Viewer(format!("'{}' exited with {status}", self.template)));
        }
        Ok(())
    }
}
