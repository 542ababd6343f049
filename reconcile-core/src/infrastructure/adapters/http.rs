// reconcile-core/src/infrastructure/adapters/http.rs
//
// Every port, served by the processing backend over HTTP/JSON.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::domain::batch::BatchFile;
use crate::domain::decision::DecisionRecord;
use crate::domain::error::DomainError;
use crate::domain::rules::{AutomaticRule, NormalizationRule, RuleListing};
use crate::error::ReconcileError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::{
    AnalysisReport, ApplyResponse, BatchSource, Detector, ExportPayload, ExportReceipt, Exporter,
    Processor, RuleStore, UploadReceipt,
};

pub struct HttpBackend {
    client: Client,
    base: Url,
}

#[derive(Deserialize)]
struct FileListing {
    #[serde(rename = "archivos", default)]
    files: Vec<BatchFile>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InfrastructureError> {
        let base = Url::parse(base_url).map_err(|e| {
            InfrastructureError::ConfigError(format!("invalid api.base_url '{}': {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(InfrastructureError::ConfigError(format!(
                "api.base_url '{}' cannot hold paths",
                base_url
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Base URL plus percent-encoded path segments; a trailing `""` keeps a
    /// trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ReconcileError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ReconcileError::InternalError(format!("bad base URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call<T: DeserializeOwned>(
        service: &'static str,
        request: RequestBuilder,
    ) -> Result<T, ReconcileError> {
        let response = request
            .send()
            .await
            .map_err(|e| ReconcileError::collaborator(service, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = readable_body(service, response.text().await);
            return Err(status_error(service, status, &body));
        }
        let body = response.json::<T>().await.map_err(InfrastructureError::from)?;
        Ok(body)
    }
}

/// An unreadable error body is logged and reported as empty.
fn readable_body<E: std::fmt::Display>(service: &'static str, read: Result<String, E>) -> String {
    read.unwrap_or_else(|e| {
        warn!(service, error = %e, "Could not read error body");
        String::new()
    })
}

/// Reads FastAPI-style `{"detail": ...}` bodies; falls back to the raw text.
pub fn error_detail(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").cloned());
    match detail {
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
        None if body.trim().is_empty() => format!("HTTP {}", status),
        None => format!("HTTP {}: {}", status, body.trim()),
    }
}

/// 404 and 409 keep their domain meaning; anything else is the collaborator's failure.
pub fn status_error(service: &'static str, status: StatusCode, body: &str) -> ReconcileError {
    let detail = error_detail(status, body);
    match status {
        StatusCode::NOT_FOUND => DomainError::NotFound(detail).into(),
        StatusCode::CONFLICT => DomainError::Conflict(detail).into(),
        _ => ReconcileError::collaborator(service, detail),
    }
}

#[async_trait]
impl Detector for HttpBackend {
    #[instrument(skip(self))]
    async fn analyze(&self, batch: &str) -> Result<AnalysisReport, ReconcileError> {
        let url = self.endpoint(&["procesador", "analizar-incongruencias", batch])?;
        let report: AnalysisReport = Self::call("detector", self.client.post(url)).await?;
        debug!(found = report.incongruences.len(), "Analysis received");
        Ok(report)
    }
}

#[async_trait]
impl Processor for HttpBackend {
    #[instrument(skip(self, decisions), fields(decisions = decisions.len()))]
    async fn apply(
        &self,
        batch: &str,
        decisions: &[DecisionRecord],
        confirm: bool,
    ) -> Result<ApplyResponse, ReconcileError> {
        let url = self.endpoint(&["procesador", "aplicar-decisiones", batch])?;
        let body = json!({ "decisiones": decisions, "confirmar": confirm });
        Self::call("processor", self.client.post(url).json(&body)).await
    }
}

#[async_trait]
impl Exporter for HttpBackend {
    #[instrument(skip(self, payload))]
    async fn export(
        &self,
        payload: &ExportPayload,
        filename: &str,
    ) -> Result<ExportReceipt, ReconcileError> {
        let url = self.endpoint(&["procesador", "exportar-json"])?;
        let body = json!({
            "datos": payload,
            "nombre_archivo": filename,
            "convertir_nan": true,
        });
        Self::call("exporter", self.client.post(url).json(&body)).await
    }
}

#[async_trait]
impl RuleStore for HttpBackend {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<RuleListing, ReconcileError> {
        let url = self.endpoint(&["reglas", ""])?;
        Self::call("rule api", self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn create_normalization(&self, rule: NormalizationRule) -> Result<(), ReconcileError> {
        let url = self.endpoint(&["reglas", "crear"])?;
        let body = json!({ "tipo": "normalizacion", "normalizacion": rule });
        let _: serde_json::Value = Self::call("rule api", self.client.post(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_automatic(&self, rule: AutomaticRule) -> Result<(), ReconcileError> {
        let url = self.endpoint(&["reglas", "crear"])?;
        let body = json!({ "tipo": "automatica", "regla_automatica": rule });
        let _: serde_json::Value = Self::call("rule api", self.client.post(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_normalization(&self, pattern: &str) -> Result<(), ReconcileError> {
        let url = self.endpoint(&["reglas", "eliminar"])?;
        let body = json!({ "tipo": "normalizacion", "patron": pattern });
        let _: serde_json::Value =
            Self::call("rule api", self.client.delete(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_automatic(&self, index: usize) -> Result<(), ReconcileError> {
        let url = self.endpoint(&["reglas", "eliminar"])?;
        let body = json!({ "tipo": "automatica", "indice": index });
        let _: serde_json::Value =
            Self::call("rule api", self.client.delete(url).json(&body)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn clear_all(&self, overwrite_backup: bool) -> Result<(), ReconcileError> {
        // The backend always replaces its backup and does not say whether one exists.
        if !overwrite_backup {
            return Err(DomainError::Conflict(
                "the remote rule store overwrites its backup on every clear".into(),
            )
            .into());
        }
        let url = self.endpoint(&["reglas", "limpiar-todo"])?;
        let _: serde_json::Value = Self::call("rule api", self.client.delete(url)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn restore_backup(&self) -> Result<(), ReconcileError> {
        let url = self.endpoint(&["reglas", "restaurar-backup"])?;
        let _: serde_json::Value = Self::call("rule api", self.client.post(url)).await?;
        Ok(())
    }
}

#[async_trait]
impl BatchSource for HttpBackend {
    #[instrument(skip(self))]
    async fn list_files(&self) -> Result<Vec<BatchFile>, ReconcileError> {
        let url = self.endpoint(&["procesador", "archivos"])?;
        let listing: FileListing = Self::call("batch source", self.client.get(url)).await?;
        Ok(listing.files)
    }

    #[instrument(skip(self))]
    async fn upload(&self, path: &Path) -> Result<UploadReceipt, ReconcileError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let bytes = tokio::fs::read(path).await?;
        debug!(bytes = bytes.len(), "Uploading spreadsheet");

        let form = Form::new().part("file", Part::bytes(bytes).file_name(name));
        let url = self.endpoint(&["procesador", "upload"])?;
        Self::call("upload", self.client.post(url).multipart(form)).await
    }
}
