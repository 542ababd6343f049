// reconcile/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reconcile")]
#[command(about = "Review and resolve data incongruences in imported batches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project directory (holds reconcile.yaml)
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📂 Lists the batches available for analysis
    Files,

    /// 📤 Uploads a spreadsheet (.xls / .xlsx)
    Upload {
        /// Spreadsheet to upload
        path: PathBuf,
    },

    /// 🧭 Walks through the incongruences of a batch, one at a time
    Review {
        /// Batch name, as listed by `reconcile files`
        batch: String,
    },

    /// 📏 Manages normalization and automatic rules
    Rules {
        #[command(subcommand)]
        action: RulesCommand,
    },
}

#[derive(Subcommand)]
pub enum RulesCommand {
    /// Lists every rule with totals
    List,

    /// Maps a spelling (case-insensitive) to its canonical value
    AddNormalization {
        pattern: String,
        value: String,
    },

    /// Re-applies an action to every future incongruence of a kind
    AddAutomatic {
        /// Incongruence kind tag (ex: "valores_cero")
        kind: String,

        /// normalize | delete | keep | flag-for-review | fill
        #[arg(long)]
        action: String,

        /// Field the rule applies to (default: any field)
        #[arg(long)]
        field: Option<String>,

        /// Replacement value (required for normalize / fill)
        #[arg(long)]
        value: Option<String>,
    },

    /// Deletes a normalization by pattern
    DeleteNormalization { pattern: String },

    /// Deletes an automatic rule by index (see `rules list`)
    DeleteAutomatic { index: usize },

    /// Removes every rule, keeping a backup
    Clear {
        /// Overwrite an existing backup
        #[arg(long)]
        force: bool,
    },

    /// Restores the rules saved by the last `clear`
    Restore,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_review_defaults() -> Result<()> {
        let args = Cli::parse_from(["reconcile", "review", "entradas.xlsx"]);
        assert_eq!(args.project_dir.to_string_lossy(), ".");
        match args.command {
            Commands::Review { batch } => {
                assert_eq!(batch, "entradas.xlsx");
                Ok(())
            }
            _ => bail!("Expected Review command"),
        }
    }

    #[test]
    fn test_cli_parse_global_project_dir() -> Result<()> {
        let args = Cli::parse_from(["reconcile", "files", "--project-dir", "/tmp/project"]);
        assert_eq!(args.project_dir.to_string_lossy(), "/tmp/project");
        match args.command {
            Commands::Files => Ok(()),
            _ => bail!("Expected Files command"),
        }
    }

    #[test]
    fn test_cli_parse_add_automatic() -> Result<()> {
        let args = Cli::parse_from([
            "reconcile",
            "rules",
            "add-automatic",
            "valores_cero",
            "--action",
            "delete",
            "--field",
            "Precio",
        ]);
        match args.command {
            Commands::Rules {
                action:
                    RulesCommand::AddAutomatic {
                        kind,
                        action,
                        field,
                        value,
                    },
            } => {
                assert_eq!(kind, "valores_cero");
                assert_eq!(action, "delete");
                assert_eq!(field.as_deref(), Some("Precio"));
                assert_eq!(value, None);
                Ok(())
            }
            _ => bail!("Expected rules add-automatic"),
        }
    }

    #[test]
    fn test_cli_parse_clear_force() -> Result<()> {
        let args = Cli::parse_from(["reconcile", "rules", "clear", "--force"]);
        match args.command {
            Commands::Rules {
                action: RulesCommand::Clear { force },
            } => {
                assert!(force);
                Ok(())
            }
            _ => bail!("Expected rules clear"),
        }
    }

    #[test]
    fn test_cli_rejects_missing_upload_path() {
        assert!(Cli::try_parse_from(["reconcile", "upload"]).is_err());
    }
}
