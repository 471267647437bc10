//! # ficha2contrato
//!
//! Turn a scanned hiring form into a signed-ready legal contract.
//!
//! ## Why this crate?
//!
//! Recognized text from a photographed form is noisy in systematic ways:
//! labels garble, values wander onto the next line, digits come back as
//! lookalike letters. And the contract that must be produced from it is a
//! DOCX whose placeholders are arbitrarily fragmented across formatting
//! runs. This crate owns both halves — tolerant field extraction and
//! format-preserving placeholder substitution — and leaves OCR, SQL and
//! object storage behind traits for the host application to implement.
//!
//! ## Pipeline Overview
//!
//! ```text
//! scan text
//!  │
//!  ├─ 1. Normalize  repair keyword-scoped recognition confusions
//!  ├─ 2. Extract    ordered pattern cascades, first valid candidate wins
//!  ├─ 3. Format     Spanish words, CUI grouping, dates, currency
//!  ├─ 4. Context    join with company/representative records
//!  ├─ 5. Substitute rebuild fragmented runs, literal token replacement
//!  └─ 6. Output     DOCX bytes, atomically written per request
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ficha2contrato::{extract, generate, GenerationConfig, GenerationRequest, JsonRecordStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fields = extract("EMPRESA ACME S.A.\nCOLABORADOR MARIO PEREZ\nDPI 1234567890123");
//!     let store = JsonRecordStore::from_path("registros.json")?;
//!     let config = GenerationConfig::default();
//!     let request = GenerationRequest {
//!         request_id: "req-001".into(),
//!         template_name: "contrato_servicios.docx".into(),
//!         fecha_contrato: "2025-01-29".into(),
//!         empresa_id: 1,
//!         representante_id: 1,
//!         colaborador_data: fields,
//!     };
//!     let output = generate(&store, &request, &config)?;
//!     println!("{}", output.path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Degradation, not failure
//!
//! Extraction and formatting never abort a request: an unmatched field
//! becomes an empty value, a malformed date becomes a documented sentinel.
//! Only missing reference records, missing templates, broken archives and
//! output I/O are errors — and those never leave a partial document on
//! disk.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ficha2contrato` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod catalog;
pub mod config;
pub mod error;
pub mod fields;
pub mod generate;
pub mod locale;
pub mod pipeline;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{GenerationConfig, GenerationConfigBuilder};
pub use error::ContractError;
pub use fields::{ContractFields, EndDate, ExtractionOutput, Field, PersonFields, RawExtractionResult};
pub use generate::{
    generate, generate_bytes, process_scan, GenerationOutput, GenerationRequest, ScanOutcome,
    ScanRequest,
};
pub use pipeline::context::{build_context, RenderContext};
pub use pipeline::extract::extract;
pub use store::{
    CompanyRecord, DocumentStorage, JsonRecordStore, RecordStore, RepresentativeRecord,
    TextRecognizer,
};
