//! Document-generation entry points.
//!
//! This is the orchestration layer: it owns the order of operations and
//! the terminal-error decisions, and nothing else — every transformation
//! lives in a pipeline stage. Three entry points, smallest to largest:
//!
//! * [`generate_bytes`] — records + extraction → rendered DOCX bytes.
//! * [`generate`] — the above, plus an atomic write into the
//!   request-scoped output location.
//! * [`process_scan`] — the full flow: recognize an image, extract
//!   fields, render, and optionally hand the result to document storage.
//!
//! Output discipline: the rendered file is written to
//! `<output_dir>/<request_id>/contrato_<subject>.docx` via a temp file and
//! rename. The request-scoped directory removes the last-writer-wins race
//! that a purely name-derived path would have, and the rename guarantees a
//! terminal error never leaves a partial artifact behind.

use crate::config::GenerationConfig;
use crate::error::ContractError;
use crate::fields::ExtractionOutput;
use crate::pipeline::context::build_context;
use crate::pipeline::docx::DocxArchive;
use crate::pipeline::engine::{self, SubstitutionStats};
use crate::pipeline::extract;
use crate::store::{DocumentStorage, RecordStore, TextRecognizer};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// A render request: which template, which records, whose fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Caller-supplied unique id; becomes the output subdirectory.
    pub request_id: String,
    /// Template file name, resolved against the configured template dir.
    pub template_name: String,
    /// Contract authored date, free text (usually `YYYY-MM-DD`).
    pub fecha_contrato: String,
    pub empresa_id: u32,
    pub representante_id: u32,
    /// Extracted (or hand-corrected) form fields.
    pub colaborador_data: ExtractionOutput,
}

/// What a successful generation produced.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutput {
    /// Final path of the rendered document.
    pub path: PathBuf,
    pub file_name: String,
    /// Document parts visited by the engine.
    pub parts: usize,
    /// Paragraphs that contained placeholders and were rewritten.
    pub paragraphs_rewritten: usize,
    pub duration_ms: u64,
}

/// Parameters of the full scan flow (everything but the image).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub request_id: String,
    pub template_name: String,
    pub fecha_contrato: String,
    pub empresa_id: u32,
    pub representante_id: u32,
}

/// Outcome of the full scan flow.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub extraction: ExtractionOutput,
    pub document: GenerationOutput,
    /// Reference returned by document storage, when a store was supplied.
    pub storage_reference: Option<String>,
}

/// Render a contract to DOCX bytes without touching the file system
/// (beyond reading the template).
pub fn generate_bytes(
    store: &dyn RecordStore,
    request: &GenerationRequest,
    config: &GenerationConfig,
) -> Result<(Vec<u8>, SubstitutionStats, String), ContractError> {
    // ── Step 1: reference records ────────────────────────────────────────
    let company = store
        .company(request.empresa_id)?
        .ok_or(ContractError::CompanyNotFound {
            id: request.empresa_id,
        })?;
    let representative = store.representative(request.representante_id)?.ok_or(
        ContractError::RepresentativeNotFound {
            id: request.representante_id,
        },
    )?;
    info!(
        empresa = %company.razon_social,
        representante = %representative.nombre_completo,
        "records resolved"
    );

    // ── Step 2: render context ───────────────────────────────────────────
    let context = build_context(
        &company,
        &representative,
        &request.colaborador_data,
        &request.fecha_contrato,
        config.effective_today(),
    );
    let replacements = context.flatten();
    debug!(placeholders = replacements.len(), "replacement map ready");

    // ── Step 3: template ─────────────────────────────────────────────────
    let template_path = config.template_dir.join(&request.template_name);
    if !template_path.exists() {
        return Err(ContractError::TemplateNotFound {
            path: template_path,
        });
    }
    let mut archive = DocxArchive::from_path(&template_path)?;

    // ── Step 4: substitution ─────────────────────────────────────────────
    let stats = engine::substitute_document(&mut archive, &replacements)?;
    info!(
        parts = stats.parts,
        paragraphs = stats.paragraphs_rewritten,
        "substitution complete"
    );

    let subject = request
        .colaborador_data
        .datos_persona
        .nombre_completo
        .as_deref()
        .unwrap_or("sin_nombre");
    let file_name = format!("contrato_{}.docx", sanitize_component(subject));

    Ok((archive.to_bytes()?, stats, file_name))
}

/// Render a contract and write it into the request-scoped output location.
pub fn generate(
    store: &dyn RecordStore,
    request: &GenerationRequest,
    config: &GenerationConfig,
) -> Result<GenerationOutput, ContractError> {
    let start = Instant::now();
    info!(request_id = %request.request_id, template = %request.template_name, "generating document");
    validate_request_id(&request.request_id)?;

    let (bytes, stats, file_name) = generate_bytes(store, request, config)?;

    // ── Step 5: atomic write ─────────────────────────────────────────────
    let out_dir = config.output_dir.join(&request.request_id);
    std::fs::create_dir_all(&out_dir).map_err(|e| ContractError::OutputWrite {
        path: out_dir.clone(),
        source: e,
    })?;
    let path = out_dir.join(&file_name);
    let mut tmp =
        tempfile::NamedTempFile::new_in(&out_dir).map_err(|e| ContractError::OutputWrite {
            path: path.clone(),
            source: e,
        })?;
    tmp.write_all(&bytes).map_err(|e| ContractError::OutputWrite {
        path: path.clone(),
        source: e,
    })?;
    tmp.persist(&path).map_err(|e| ContractError::OutputWrite {
        path: path.clone(),
        source: e.error,
    })?;

    info!(path = %path.display(), "document written");
    Ok(GenerationOutput {
        path,
        file_name,
        parts: stats.parts,
        paragraphs_rewritten: stats.paragraphs_rewritten,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// The full flow: recognize → extract → render → (optionally) upload.
pub fn process_scan(
    recognizer: &dyn TextRecognizer,
    store: &dyn RecordStore,
    storage: Option<&dyn DocumentStorage>,
    image: &[u8],
    request: &ScanRequest,
    config: &GenerationConfig,
) -> Result<ScanOutcome, ContractError> {
    info!(request_id = %request.request_id, "scan flow started");

    let text = recognizer.recognize(image, &config.language)?;
    debug!(chars = text.len(), "text recognized");

    let extraction = extract::extract(&text);

    let generation_request = GenerationRequest {
        request_id: request.request_id.clone(),
        template_name: request.template_name.clone(),
        fecha_contrato: request.fecha_contrato.clone(),
        empresa_id: request.empresa_id,
        representante_id: request.representante_id,
        colaborador_data: extraction.clone(),
    };
    let document = generate(store, &generation_request, config)?;

    let storage_reference = match storage {
        Some(sink) => {
            let bytes = std::fs::read(&document.path).map_err(|e| ContractError::OutputWrite {
                path: document.path.clone(),
                source: e,
            })?;
            let remote_path = format!("{}/{}", config.storage_prefix, document.file_name);
            let reference = sink.upload(&remote_path, &bytes)?;
            info!(%reference, "document uploaded");
            Some(reference)
        }
        None => None,
    };

    Ok(ScanOutcome {
        extraction,
        document,
        storage_reference,
    })
}

/// Reject request ids that would escape the output directory.
fn validate_request_id(id: &str) -> Result<(), ContractError> {
    if id.trim().is_empty() {
        return Err(ContractError::InvalidConfig(
            "request id must not be empty".into(),
        ));
    }
    if id.contains('/') || id.contains('\\') || id.contains("..") {
        return Err(ContractError::InvalidConfig(format!(
            "request id '{id}' must not contain path separators"
        )));
    }
    Ok(())
}

/// Make a subject name safe as a file-name component.
fn sanitize_component(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect()
}
