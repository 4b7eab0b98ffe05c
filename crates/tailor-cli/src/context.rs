//! Project context detection
//!
//! Finds the project root from any directory by walking up to the nearest
//! `.tailor/config.toml`, like git does with `.git`. Collaborator clients are
//! built here once per process and handed to commands by reference.

use std::path::{Path, PathBuf};

use tailor_core::settings::{CONFIG_FILE, STATE_DIR};
use tailor_core::{
    CommandGenerator, CommandJobSource, JobQueue, LocalDocumentService, Settings, VersionLog,
};
use tailor_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Walk up from `cwd` to the directory holding `.tailor/config.toml`.
pub fn find_root(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .find(|dir| dir.join(STATE_DIR).join(CONFIG_FILE).is_file())
        .map(Path::to_path_buf)
}

/// Project root for an explicit settings file.
///
/// A file inside a `.tailor` directory belongs to that directory's parent;
/// any other file's own directory is the root.
fn root_for_config(config: &Path) -> PathBuf {
    let dir = config.parent().unwrap_or(Path::new("."));
    match dir.file_name() {
        Some(name) if name == STATE_DIR => dir.parent().unwrap_or(dir).to_path_buf(),
        _ => dir.to_path_buf(),
    }
}

/// Everything a command needs about the current project.
pub struct Context {
    pub root: NormalizedPath,
    pub settings: Settings,
    pub service: LocalDocumentService,
    pub log: VersionLog,
}

impl Context {
    /// Load the project containing `cwd`, or the one `config` points at.
    pub fn load(cwd: &Path, config: Option<&Path>) -> Result<Self> {
        let (root, settings) = match config {
            Some(config) => {
                let config = cwd.join(config);
                if !config.is_file() {
                    return Err(CliError::user(format!(
                        "settings file not found: {}",
                        config.display()
                    )));
                }
                let settings = Settings::load_from(&NormalizedPath::new(&config))?;
                (root_for_config(&config), settings)
            }
            None => {
                let root = find_root(cwd).ok_or_else(|| {
                    CliError::user("not a tailor project (run `tailor init <resume>` first)")
                })?;
                let settings = Settings::load(&NormalizedPath::new(&root))?;
                (root, settings)
            }
        };

        let root = NormalizedPath::new(root);
        tracing::debug!(root = %root, document = %settings.document.id, "loaded project");

        Ok(Self {
            service: LocalDocumentService::new(settings.store_path(&root)),
            log: VersionLog::new(settings.log_path(&root)),
            root,
            settings,
        })
    }

    pub fn document_id(&self) -> &str {
        &self.settings.document.id
    }

    pub fn generator(&self) -> Result<CommandGenerator> {
        Ok(CommandGenerator::new(self.settings.generator.command.clone())?)
    }

    pub fn job_source(&self) -> Result<CommandJobSource> {
        Ok(CommandJobSource::new(
            self.settings.monitor.describe_command.clone(),
        )?)
    }

    pub fn queue(&self) -> JobQueue {
        JobQueue::new(self.settings.queue_path(&self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tailor_test_utils::TestProject;

    #[test]
    fn finds_root_from_nested_directory() {
        let project = TestProject::new().init("Jane Doe");
        let nested = project.root().join("applications").join("2024");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_root(&nested).as_deref(), Some(project.root()));
    }

    #[test]
    fn uninitialized_directory_is_a_user_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Context::load(dir.path(), None).err().unwrap();
        assert!(matches!(err, CliError::User { .. }));
    }

    #[test]
    fn config_inside_state_dir_roots_at_its_parent() {
        assert_eq!(
            root_for_config(Path::new("/work/.tailor/config.toml")),
            PathBuf::from("/work")
        );
        assert_eq!(
            root_for_config(Path::new("/work/alt.toml")),
            PathBuf::from("/work")
        );
    }
}
