// reconcile/src/commands/files.rs
//
// USE CASE: List the batches available for analysis.

use std::path::PathBuf;

use reconcile_core::application::list_batches;

use super::backend::Backend;
use super::output::{format_size, table};

pub async fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    let backend = Backend::connect(&project_dir)?;
    let files = list_batches(backend.batches.as_ref()).await?;

    if files.is_empty() {
        println!("📭 No batches found. Upload one with 'reconcile upload <file.xlsx>'.");
        return Ok(());
    }

    let mut out = table(&["Batch", "Type", "Size", "Modified"]);
    for file in &files {
        out.add_row(vec![
            file.name.clone(),
            file.kind.to_string(),
            format_size(file.size),
            file.modified_at.clone().unwrap_or_else(|| "-".into()),
        ]);
    }
    println!("📂 {} batch(es) available:", files.len());
    println!("{}", out);
    Ok(())
}
