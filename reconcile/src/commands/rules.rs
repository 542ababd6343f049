// reconcile/src/commands/rules.rs
//
// USE CASE: Rule CRUD with bulk clear and restore.

use std::path::PathBuf;

use reconcile_core::domain::decision::Action;

use crate::cli::RulesCommand;

use super::backend::Backend;
use super::output::table;

pub async fn execute(project_dir: PathBuf, command: RulesCommand) -> anyhow::Result<()> {
    let backend = Backend::connect(&project_dir)?;
    let rules = &backend.rules;

    match command {
        RulesCommand::List => {
            let listing = rules.list().await?;
            println!(
                "📏 {} normalization(s), {} automatic rule(s)",
                listing.total_normalizations, listing.total_automatic_rules
            );

            if listing.total_normalizations > 0 {
                let mut out = table(&["Pattern", "Normalized value"]);
                for rule in listing.rules.normalizations() {
                    out.add_row(vec![rule.pattern, rule.normalized_value]);
                }
                println!("{}", out);
            }

            if listing.total_automatic_rules > 0 {
                let mut out = table(&["#", "Kind", "Field", "Action", "Value", "Created"]);
                for (index, rule) in listing.rules.automatic_rules().iter().enumerate() {
                    out.add_row(vec![
                        index.to_string(),
                        rule.kind.clone(),
                        rule.field.clone(),
                        rule.action.to_string(),
                        rule.value.clone().unwrap_or_else(|| "-".into()),
                        rule.created_at.clone().unwrap_or_else(|| "-".into()),
                    ]);
                }
                println!("{}", out);
            }
        }

        RulesCommand::AddNormalization { pattern, value } => {
            let rule = rules.add_normalization(&pattern, &value).await?;
            println!(
                "✅ Normalization saved: '{}' -> '{}'",
                rule.pattern, rule.normalized_value
            );
        }

        RulesCommand::AddAutomatic {
            kind,
            action,
            field,
            value,
        } => {
            let action: Action = action.parse().map_err(anyhow::Error::msg)?;
            let rule = rules
                .add_automatic(&kind, field.as_deref(), action, value.as_deref())
                .await?;
            println!(
                "✅ Automatic rule saved: {} on '{}' -> {}",
                rule.kind, rule.field, rule.action
            );
        }

        RulesCommand::DeleteNormalization { pattern } => {
            rules.delete_normalization(&pattern).await?;
            println!("🗑️  Normalization '{}' deleted", pattern);
        }

        RulesCommand::DeleteAutomatic { index } => {
            rules.delete_automatic(index).await?;
            println!("🗑️  Automatic rule #{} deleted", index);
        }

        RulesCommand::Clear { force } => {
            if let Err(e) = rules.clear_all(force).await {
                if e.is_conflict() {
                    anyhow::bail!("❌ {}\n👉 Use 'reconcile rules clear --force' to replace it.", e);
                }
                return Err(e.into());
            }
            println!("🧹 All rules cleared. Undo with 'reconcile rules restore'.");
        }

        RulesCommand::Restore => {
            rules.restore_backup().await?;
            println!("♻️  Rules restored from backup");
        }
    }

    Ok(())
}
