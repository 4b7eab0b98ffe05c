//! [`TestProject`] builder for scenarios that need an on-disk `.tailor`
//! directory.

use std::fs;
use std::path::Path;

use tailor_core::{LocalDocumentService, Settings, VersionLog};
use tailor_fs::NormalizedPath;
use tempfile::TempDir;

/// A temporary project directory with helpers for setup and assertion.
///
/// # Example
///
/// ```rust,no_run
/// use tailor_test_utils::TestProject;
///
/// let project = TestProject::new().init("Jane Doe\nRust developer\n");
/// project.assert_file_exists(".tailor/config.toml");
/// ```
pub struct TestProject {
    temp_dir: TempDir,
    settings: Settings,
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProject {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            settings: Settings::default(),
        }
    }

    /// Set the generator command written by [`TestProject::init`].
    pub fn with_generator(mut self, argv: &[&str]) -> Self {
        self.settings.generator.command = argv.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Write `.tailor/config.toml` and create the document baseline.
    pub fn init(self, resume_text: &str) -> Self {
        self.settings.save(&self.normalized_root()).unwrap();
        self.service()
            .create(&self.settings.document.id, resume_text)
            .unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn normalized_root(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn document_id(&self) -> &str {
        &self.settings.document.id
    }

    pub fn service(&self) -> LocalDocumentService {
        LocalDocumentService::new(self.settings.store_path(&self.normalized_root()))
    }

    pub fn log(&self) -> VersionLog {
        VersionLog::new(self.settings.log_path(&self.normalized_root()))
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    pub fn read_file(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to the root) contains `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read_file(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
