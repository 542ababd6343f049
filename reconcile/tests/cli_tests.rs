use anyhow::Result;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// A throwaway project directory for one test.
struct ReconcileTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl ReconcileTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let root = tmp.path().join("project");
        std::fs::create_dir_all(&root)?;
        Ok(Self { _tmp: tmp, root })
    }

    /// Points every collaborator at a port nothing listens on.
    fn with_offline_backend(self) -> Result<Self> {
        std::fs::write(
            self.root.join("reconcile.yaml"),
            "api:\n  base_url: http://127.0.0.1:9\n  timeout_secs: 5\n",
        )?;
        Ok(self)
    }

    fn reconcile(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("reconcile"));
        cmd.current_dir(&self.root)
            .env_remove("RECONCILE_API_URL")
            .env_remove("RECONCILE_RULES_PATH")
            .env_remove("RECONCILE_EXPORT_DIR");
        cmd
    }
}

#[test]
fn test_upload_rejects_non_spreadsheets() -> Result<()> {
    let env = ReconcileTestEnv::new()?.with_offline_backend()?;
    std::fs::write(env.root.join("report.csv"), "a,b\n1,2\n")?;

    env.reconcile()
        .args(["upload", "report.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Only Excel files are accepted"));

    Ok(())
}

#[test]
fn test_upload_and_list_local_batches() -> Result<()> {
    let env = ReconcileTestEnv::new()?;
    std::fs::write(env.root.join("Entradas_Marzo.XLSX"), b"fake workbook")?;

    env.reconcile()
        .args(["upload", "Entradas_Marzo.XLSX"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reconcile review Entradas_Marzo.XLSX"));
    assert!(env.root.join("data/Entradas_Marzo.XLSX").exists());

    env.reconcile()
        .arg("files")
        .assert()
        .success()
        .stdout(predicate::str::contains("Entradas_Marzo.XLSX"))
        .stdout(predicate::str::contains("entradas"));

    Ok(())
}

#[test]
fn test_rules_crud_on_local_file() -> Result<()> {
    let env = ReconcileTestEnv::new()?;

    env.reconcile()
        .args(["rules", "add-normalization", "MANZANA ", "Manzana"])
        .assert()
        .success();
    env.reconcile()
        .args(["rules", "add-automatic", "valores_cero", "--action", "delete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("on '*'"));

    env.reconcile()
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 normalization(s), 1 automatic rule(s)",
        ))
        .stdout(predicate::str::contains("manzana"))
        .stdout(predicate::str::contains("valores_cero"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(env.root.join("rules/rules.json"))?)?;
    assert_eq!(saved["normalizaciones"]["manzana"], "Manzana");
    assert_eq!(saved["reglas_automaticas"][0]["accion"], "eliminar");

    env.reconcile()
        .args(["rules", "delete-automatic", "4"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("automatic rule #4"));
    env.reconcile()
        .args(["rules", "delete-normalization", "manzana"])
        .assert()
        .success();

    Ok(())
}

#[test]
fn test_rule_needing_a_value_is_rejected() -> Result<()> {
    let env = ReconcileTestEnv::new()?;

    env.reconcile()
        .args(["rules", "add-automatic", "valores_vacios", "--action", "fill"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("needs a value"));
    assert!(!env.root.join("rules/rules.json").exists());

    Ok(())
}

#[test]
fn test_clear_and_restore_rules() -> Result<()> {
    let env = ReconcileTestEnv::new()?;
    env.reconcile()
        .args(["rules", "add-normalization", "pera", "Pera"])
        .assert()
        .success();

    env.reconcile().args(["rules", "clear"]).assert().success();
    env.reconcile()
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "0 normalization(s), 0 automatic rule(s)",
        ));

    // A second clear would overwrite the backup
    env.reconcile()
        .args(["rules", "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    env.reconcile().args(["rules", "restore"]).assert().success();
    env.reconcile()
        .args(["rules", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pera"));

    env.reconcile()
        .args(["rules", "restore"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("rule backup"));

    Ok(())
}

#[test]
fn test_review_reports_unreachable_detector() -> Result<()> {
    let env = ReconcileTestEnv::new()?.with_offline_backend()?;

    assert_cmd::Command::from_std(env.reconcile())
        .args(["review", "entradas.xlsx"])
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("detector failed"));

    Ok(())
}
