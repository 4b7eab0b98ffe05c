//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// resume-tailor - Keep a resume aligned with job postings, with history
#[derive(Parser, Debug)]
#[command(name = "tailor")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the nearest .tailor/config.toml
    #[arg(long, global = true, env = "TAILOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Job metadata recorded on a log entry
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct TagArgs {
    /// Hiring company
    #[arg(long)]
    pub company: Option<String>,

    /// Job title
    #[arg(long)]
    pub title: Option<String>,

    /// Posting URL
    #[arg(long)]
    pub url: Option<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Create the local document and write .tailor/config.toml
    ///
    /// The body file becomes the document's baseline revision.
    ///
    /// Examples:
    ///   tailor init resume.txt
    ///   tailor init resume.txt --document-id cv-2024
    Init {
        /// Plain-text resume to start from
        body: PathBuf,

        /// Identifier of the document in the store
        #[arg(long)]
        document_id: Option<String>,
    },

    /// Tailor the resume to one job description
    ///
    /// Examples:
    ///   tailor update --job posting.txt --company Acme --title "Backend Engineer"
    ///   tailor update --job posting.txt --dry-run
    Update {
        /// File containing the job description
        #[arg(long)]
        job: PathBuf,

        #[command(flatten)]
        tags: TagArgs,

        /// Show what would change without touching the document or log
        #[arg(long)]
        dry_run: bool,
    },

    /// Run several updates in sequence from a JSON file
    ///
    /// The file holds an array of objects with `jobFile` or `description`
    /// and optional `company`, `jobTitle`, `jobUrl`.
    Batch {
        /// JSON batch file
        file: PathBuf,
    },

    /// List version log entries and desync warnings
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Restore the document to a logged revision
    ///
    /// Examples:
    ///   tailor revert 0
    ///   tailor revert 3f1c9a52-...
    Revert {
        /// Log index or revision id
        target: String,
    },

    /// Write a logged revision's text to a file or stdout
    Export {
        /// Log index or revision id
        target: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Correct the job metadata of a log entry
    Tag {
        /// Log index or revision id
        target: String,

        #[command(flatten)]
        tags: TagArgs,
    },

    /// Find log entries by company, title, URL, revision or change text
    Search {
        /// Case-insensitive search term
        term: String,
    },

    /// Queue newly discovered postings and optionally process the queue
    ///
    /// Examples:
    ///   tailor monitor                      # show the queue
    ///   tailor monitor --feed postings.json # queue live postings
    ///   tailor monitor --process            # tailor for each queued posting
    Monitor {
        /// JSON array of discovered postings (`company`, `url`, `jobTitle`)
        #[arg(long)]
        feed: Option<PathBuf>,

        /// Run an update for every queued posting
        #[arg(long)]
        process: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn tag_flags_parse_into_tag_args() {
        let cli = Cli::parse_from(["tailor", "tag", "1", "--company", "Acme"]);
        assert_eq!(
            cli.command,
            Commands::Tag {
                target: "1".into(),
                tags: TagArgs {
                    company: Some("Acme".into()),
                    ..TagArgs::default()
                },
            }
        );
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::parse_from(["tailor", "list", "--verbose"]);
        assert!(cli.verbose);
    }
}
