// reconcile/src/commands/upload.rs
//
// USE CASE: Upload a spreadsheet so it can be analyzed.

use std::path::PathBuf;

use reconcile_core::application::upload_batch;
use reconcile_core::domain::batch::validate_upload_name;

use super::backend::Backend;

pub async fn execute(project_dir: PathBuf, path: PathBuf) -> anyhow::Result<()> {
    // Wrong formats are refused before any config or network access
    validate_upload_name(&path)?;
    if !path.is_file() {
        anyhow::bail!("❌ File not found: {}", path.display());
    }

    let backend = Backend::connect(&project_dir)?;
    println!("📤 Uploading {}...", path.display());
    let receipt = upload_batch(backend.batches.as_ref(), &path).await?;

    println!("✅ {}", receipt.message);
    println!("👉 Next: reconcile review {}", receipt.batch);
    Ok(())
}
