//! Init command implementation

use std::path::Path;

use colored::Colorize;
use tailor_core::{LocalDocumentService, Settings};
use tailor_fs::NormalizedPath;

use crate::error::{CliError, Result};

/// Create the document baseline from `body` and write default settings.
pub fn run_init(cwd: &Path, body: &Path, document_id: Option<&str>) -> Result<()> {
    let root = NormalizedPath::new(cwd);
    let config_path = Settings::config_path(&root);
    if config_path.exists() {
        return Err(CliError::user(format!(
            "already initialized: {} exists",
            config_path
        )));
    }

    let body_path = cwd.join(body);
    let text = std::fs::read_to_string(&body_path).map_err(|e| {
        CliError::user(format!("cannot read {}: {}", body_path.display(), e))
    })?;

    let mut settings = Settings::default();
    if let Some(id) = document_id {
        settings.document.id = id.to_string();
    }
    settings.validate()?;

    let service = LocalDocumentService::new(settings.store_path(&root));
    let baseline = service.create(&settings.document.id, &text)?;
    settings.save(&root)?;

    println!(
        "{} Initialized document {} (baseline revision {})",
        "=>".blue().bold(),
        settings.document.id.cyan(),
        baseline.id.dimmed()
    );
    println!(
        "   Set {} in {} before running {}.",
        "[generator] command".yellow(),
        config_path,
        "tailor update".cyan()
    );
    Ok(())
}
