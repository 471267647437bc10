//! Collaborator seams: record store, text recognition, document storage.
//!
//! The three external systems the pipeline talks to are deliberately kept
//! behind traits. The relational store (stored-procedure repositories in
//! the original service), the OCR engine, and the remote object store all
//! have their real implementations with the caller; the library only
//! defines what it consumes. [`JsonRecordStore`] is the one implementation
//! shipped here — a fixture-file store that stands in for SQL in the CLI
//! and in tests.

use crate::error::ContractError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ── Records ──────────────────────────────────────────────────────────────

/// A company row, as returned by the external store.
///
/// Field names follow the store's column names; everything except the
/// registered name is optional in practice and defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub razon_social: String,
    #[serde(default)]
    pub autorizada_en: String,
    #[serde(default)]
    pub fecha_autorizacion: Option<NaiveDate>,
    #[serde(default)]
    pub autorizada_por: String,
    #[serde(default)]
    pub inscrita_en: String,
    #[serde(default)]
    pub numero_registro: String,
    #[serde(default)]
    pub numero_folio: String,
    #[serde(default)]
    pub numero_libro: String,
    #[serde(default)]
    pub tipo_libro: String,
    #[serde(default)]
    pub lugar_notificaciones: String,
    #[serde(default)]
    pub segundo_lugar_notificaciones: String,
}

/// A legal-representative row, as returned by the external store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeRecord {
    pub nombre_completo: String,
    pub cui: String,
    /// Needed to derive the age that legal prose quotes.
    pub fecha_nacimiento: NaiveDate,
    #[serde(default)]
    pub estado_civil: String,
    #[serde(default)]
    pub profesion: String,
    #[serde(default)]
    pub nacionalidad: String,
    #[serde(default)]
    pub extendido_en: String,
}

// ── Collaborator traits ──────────────────────────────────────────────────

/// Lookup of reference records by id.
///
/// Returning `Ok(None)` means "no such record" — the orchestrator turns
/// that into the terminal missing-reference error; `Err` is reserved for
/// the store itself failing.
pub trait RecordStore {
    fn company(&self, id: u32) -> Result<Option<CompanyRecord>, ContractError>;
    fn representative(&self, id: u32) -> Result<Option<RepresentativeRecord>, ContractError>;
}

/// The text-recognition collaborator: image bytes in, recognized text out.
pub trait TextRecognizer {
    fn recognize(&self, image: &[u8], language: &str) -> Result<String, ContractError>;
}

/// The remote object-storage collaborator.
pub trait DocumentStorage {
    /// Store `bytes` at `remote_path`; returns an opaque reference/URL.
    fn upload(&self, remote_path: &str, bytes: &[u8]) -> Result<String, ContractError>;
    /// Fetch the bytes a previous upload returned a reference for.
    fn download(&self, reference: &str) -> Result<Vec<u8>, ContractError>;
}

// ── JSON fixture store ───────────────────────────────────────────────────

/// A [`RecordStore`] backed by a JSON fixture file.
///
/// Shape:
/// ```json
/// {
///   "empresas":        { "1": { "razon_social": "ACME S.A.", ... } },
///   "representantes":  { "1": { "nombre_completo": "...", "cui": "...",
///                               "fecha_nacimiento": "1980-05-14", ... } }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonRecordStore {
    #[serde(default)]
    empresas: BTreeMap<u32, CompanyRecord>,
    #[serde(default)]
    representantes: BTreeMap<u32, RepresentativeRecord>,
}

impl JsonRecordStore {
    /// Parse a fixture from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ContractError> {
        serde_json::from_str(json).map_err(|e| ContractError::Store {
            detail: format!("invalid record fixture: {e}"),
        })
    }

    /// Load a fixture file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ContractError::Store {
            detail: format!("cannot read record fixture '{}': {e}", path.display()),
        })?;
        Self::from_json(&raw)
    }

    /// Build a store from in-memory records (tests, embedding callers).
    pub fn from_records(
        empresas: impl IntoIterator<Item = (u32, CompanyRecord)>,
        representantes: impl IntoIterator<Item = (u32, RepresentativeRecord)>,
    ) -> Self {
        Self {
            empresas: empresas.into_iter().collect(),
            representantes: representantes.into_iter().collect(),
        }
    }
}

impl RecordStore for JsonRecordStore {
    fn company(&self, id: u32) -> Result<Option<CompanyRecord>, ContractError> {
        Ok(self.empresas.get(&id).cloned())
    }

    fn representative(&self, id: u32) -> Result<Option<RepresentativeRecord>, ContractError> {
        Ok(self.representantes.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "empresas": {
            "1": {
                "razon_social": "Innovate Solutions, S.A.",
                "numero_registro": "12345",
                "fecha_autorizacion": "2024-02-08"
            }
        },
        "representantes": {
            "1": {
                "nombre_completo": "ANA MARIA RODRIGUEZ",
                "cui": "3003541690101",
                "fecha_nacimiento": "1980-05-14",
                "estado_civil": "Casada"
            }
        }
    }"#;

    #[test]
    fn fixture_round_trip() {
        let store = JsonRecordStore::from_json(FIXTURE).unwrap();
        let company = store.company(1).unwrap().unwrap();
        assert_eq!(company.razon_social, "Innovate Solutions, S.A.");
        assert_eq!(
            company.fecha_autorizacion,
            NaiveDate::from_ymd_opt(2024, 2, 8)
        );
        // Unspecified columns default to empty, not missing.
        assert_eq!(company.tipo_libro, "");

        let rep = store.representative(1).unwrap().unwrap();
        assert_eq!(rep.cui, "3003541690101");
    }

    #[test]
    fn unknown_ids_are_none_not_err() {
        let store = JsonRecordStore::from_json(FIXTURE).unwrap();
        assert!(store.company(99).unwrap().is_none());
        assert!(store.representative(99).unwrap().is_none());
    }

    #[test]
    fn malformed_fixture_is_store_error() {
        let err = JsonRecordStore::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ContractError::Store { .. }));
    }
}
