//! Field extraction: ordered cascade matching over normalized text.
//!
//! ## Why a cascade?
//!
//! One pattern per field is not enough for scanned forms. The engine drops
//! characters, merges lines and splits labels from their values, so each
//! field carries an *ordered* list of patterns: the first is the strict
//! "label followed by value" shape, the later ones exist specifically to
//! catch the failure modes the earlier ones miss (a label alone on its
//! line with the value below it; an age that lost its label entirely and
//! survives only as a bare two-digit line between its neighbours on the
//! form). The first match whose captured value passes the field's
//! validator wins; a candidate the validator rejects does not end the
//! cascade — later patterns still get their chance.
//!
//! The cascade table is data, not control flow: [`cascades`] exposes it so
//! tests can enumerate exactly what is tried, in which order, and why.
//!
//! Extraction never fails. A field no pattern validates is recorded as
//! absent, and downstream stages render it as empty text or a documented
//! default.

use crate::fields::{ContractFields, EndDate, ExtractionOutput, Field, PersonFields, RawExtractionResult};
use crate::locale;
use crate::pipeline::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// How a captured candidate is validated (and lightly rewritten) before
/// being accepted for its field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Trimmed, salutation-truncated free text; must be non-empty.
    FreeText,
    /// A digit string, taken verbatim.
    Digits,
    /// An integer age in `[18, 99]`; out-of-range is rejected, never clamped.
    Age,
    /// A decimal amount; thousands separators stripped, must parse.
    Amount,
    /// Raw captured text, only trimmed (dates — parsing happens later).
    Verbatim,
}

/// One field's ordered matcher list.
pub struct Cascade {
    pub field: Field,
    pub patterns: Vec<Regex>,
    pub validator: Validator,
}

fn cascade(field: Field, validator: Validator, patterns: &[&str]) -> Cascade {
    Cascade {
        field,
        validator,
        patterns: patterns
            .iter()
            .map(|p| Regex::new(p).expect("invalid cascade pattern"))
            .collect(),
    }
}

/// The extraction cascade table, in form order. One entry per logical field.
static CASCADES: Lazy<Vec<Cascade>> = Lazy::new(|| {
    vec![
        cascade(Field::Company, Validator::FreeText, &[
            r"(?i)EMPRESA\s+([^\n]+)",
            r"(?i)EMPRESA[^\S\n]*\n\s*([^\n]+)",
        ]),
        cascade(Field::FullName, Validator::FreeText, &[
            r"(?i)COLABORADOR\s+([^\n]+)",
            r"(?i)COLABORADOR[^\S\n]*\n\s*([^\n]+)",
        ]),
        cascade(Field::Cui, Validator::Digits, &[
            // Tolerates "DPI / PASAPORTE" and "DPI/PASAPORTE".
            r"(?i)DPI\s*/?\s*PASAPORTE\s+(\d+)",
            r"(?i)DPI\s*/?\s*PASAPORTE[^\S\n]*\n\s*(\d+)",
            r"(?i)\bDPI\s+(\d{13})\b",
        ]),
        cascade(Field::Age, Validator::Age, &[
            r"(?i)\bEDAD\s*:?\s*(\d{1,3})",
            r"(?i)\bEDAD[^\d\n]*\n\s*(\d{1,3})\b",
            // Label lost entirely: a bare two-digit line sitting between
            // its neighbours on the form (the DPI line above, the
            // DIRECCIÓN line below).
            r"(?i)PASAPORTE[^\n]*\n\s*(\d{2})\s*\n\s*DIRECCI",
        ]),
        cascade(Field::Address, Validator::FreeText, &[
            r"(?i)DIRECCI[ÓO]N\s+([^\n]+)",
            r"(?i)DIRECCI[ÓO]N[^\S\n]*\n\s*([^\n]+)",
        ]),
        cascade(Field::MaritalStatus, Validator::FreeText, &[
            r"(?i)ESTADO\s+CIVIL\s+([^\n]+)",
        ]),
        cascade(Field::Profession, Validator::FreeText, &[
            r"(?i)PROFESI[ÓO]N\s+([^\n]+)",
        ]),
        cascade(Field::Position, Validator::FreeText, &[
            r"(?i)POSICI[ÓO]N\s+([^\n]+)",
            r"(?i)\bPUESTO\s+([^\n]+)",
        ]),
        cascade(Field::StartDate, Validator::Verbatim, &[
            r"(?i)FECHA\s+DE\s+INICIO\s+([^\n]+)",
        ]),
        cascade(Field::EndDate, Validator::Verbatim, &[
            r"(?i)FECHA\s+DE\s+FINALIZACI[ÓO]N\s+([^\n]+)",
            r"(?i)FECHA\s+DE\s+FINALIZACI[ÓO]N[^\S\n]*\n\s*([^\n]+)",
        ]),
        cascade(Field::Amount, Validator::Amount, &[
            // Strict: two decimals present.
            r"(?i)HONORARIOS\s+POR\s+PAGAR\s+([\d,]+\.\d{2})",
            // Relaxed: decimals garbled or missing.
            r"(?i)HONORARIOS\s+POR\s+PAGAR\s+([\d,]+(?:\.\d{1,2})?)",
            r"(?i)\bMONTO\s+Q?\.?\s*([\d,]+\.\d{2})",
        ]),
    ]
});

/// The cascade table, for the extractor itself and for tests that want to
/// enumerate every (pattern, validator) pair.
pub fn cascades() -> &'static [Cascade] {
    &CASCADES
}

// ── Validators ───────────────────────────────────────────────────────────

/// Closing-salutation keywords that mark the start of trailing form
/// boilerplate inside a greedy free-text capture.
static RE_CLOSING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:atentamente|saludos(?:\s+cordiales)?|firma)\b").unwrap());

fn truncate_salutation(value: &str) -> &str {
    match RE_CLOSING.find(value) {
        Some(m) => value[..m.start()].trim_end(),
        None => value,
    }
}

/// Age bounds: below 18 cannot sign this contract, above 99 is a
/// recognition artefact on this form.
const AGE_RANGE: std::ops::RangeInclusive<u32> = 18..=99;

fn validate(validator: Validator, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    match validator {
        Validator::FreeText => {
            let t = truncate_salutation(candidate).trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Validator::Digits => (!candidate.is_empty()).then(|| candidate.to_string()),
        Validator::Age => {
            let age: u32 = candidate.parse().ok()?;
            AGE_RANGE.contains(&age).then(|| candidate.to_string())
        }
        Validator::Amount => {
            let stripped = candidate.replace(',', "");
            stripped.parse::<f64>().ok()?;
            Some(stripped)
        }
        Validator::Verbatim => (!candidate.is_empty()).then(|| candidate.to_string()),
    }
}

// ── Extraction ───────────────────────────────────────────────────────────

/// Run every cascade against already-normalized text.
pub fn extract_raw(normalized: &str) -> RawExtractionResult {
    let mut raw = RawExtractionResult::empty();
    for cascade in cascades() {
        for (rank, pattern) in cascade.patterns.iter().enumerate() {
            let Some(caps) = pattern.captures(normalized) else {
                continue;
            };
            let Some(candidate) = caps.get(1) else {
                continue;
            };
            match validate(cascade.validator, candidate.as_str()) {
                Some(value) => {
                    debug!(field = %cascade.field, rank, %value, "field matched");
                    raw.set(cascade.field, value);
                    break;
                }
                // Rejected candidate: keep walking the cascade — a later,
                // looser pattern may find the real value.
                None => {
                    debug!(field = %cascade.field, rank, "candidate rejected");
                }
            }
        }
    }
    raw
}

/// Full extraction entry point: normalize, match, assemble typed output.
///
/// Never fails; unmatched fields surface as empty strings in the output.
pub fn extract(text: &str) -> ExtractionOutput {
    let normalized = normalize::normalize(text);
    let raw = extract_raw(&normalized);
    debug!(matched = raw.matched(), "extraction finished");
    assemble(&raw)
}

/// Build the two-group output from raw field values.
fn assemble(raw: &RawExtractionResult) -> ExtractionOutput {
    let position = raw.cloned(Field::Position);

    // Amount: display form + uppercase words, with the documented defaults
    // when the field is absent (a non-numeric candidate was already
    // rejected by the validator).
    let (monto, monto_en_letras) = match raw.get(Field::Amount).and_then(|s| s.parse::<f64>().ok())
    {
        Some(value) => (locale::format_quetzales(value), locale::amount_words(value)),
        None => (
            "Q.0.00".to_string(),
            "CERO QUETZALES EXACTOS".to_string(),
        ),
    };

    ExtractionOutput {
        empresa_contratante: raw.cloned(Field::Company),
        datos_persona: PersonFields {
            cui: raw.get(Field::Cui).map(locale::format_cui),
            nombre_completo: raw.cloned(Field::FullName),
            direccion: raw.cloned(Field::Address),
            edad: raw.cloned(Field::Age),
            estado_civil: raw.cloned(Field::MaritalStatus),
            // The form has no nationality box; absence is preserved here
            // and the context builder applies the domain default.
            nacionalidad: None,
            profesion: raw.cloned(Field::Profession),
            posicion: position.clone(),
        },
        datos_contrato: ContractFields {
            tipo_contrato: position.clone(),
            fecha_inicio: raw.cloned(Field::StartDate),
            fecha_fin: EndDate::from_raw(raw.get(Field::EndDate)),
            monto,
            monto_en_letras,
            descripcion_adicional: format!(
                "Posición: {}",
                position.as_deref().unwrap_or("N/A")
            ),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORM: &str = "\
FORMULARIO DE CONTRATACIÓN
EMPRESA ACME S.A.
COLABORADOR MARIO PEREZ
DPI /PASAPORTE 1234567890123
EDAD 30
DIRECCIÓN 1ra Calle 1-23, Zona 1
ESTADO CIVIL Soltero
PROFESIÓN Perito Contador
POSICIÓN Asesor de Ventas
FECHA DE INICIO 01/03/2025
FECHA DE FINALIZACIÓN 31/12/2025
HONORARIOS POR PAGAR 5,000.00
Atentamente, La Gerencia";

    #[test]
    fn every_field_has_exactly_one_cascade() {
        assert_eq!(cascades().len(), Field::ALL.len());
        for (cascade, &field) in cascades().iter().zip(Field::ALL) {
            assert_eq!(cascade.field, field, "cascade table out of form order");
            assert!(!cascade.patterns.is_empty());
        }
    }

    #[test]
    fn age_cascade_has_fallbacks() {
        let age = cascades().iter().find(|c| c.field == Field::Age).unwrap();
        assert!(age.patterns.len() >= 3, "age needs its recognition fallbacks");
    }

    #[test]
    fn full_form_extracts_all_fields() {
        let out = extract(FORM);
        assert_eq!(out.empresa_contratante.as_deref(), Some("ACME S.A."));
        assert_eq!(out.datos_persona.nombre_completo.as_deref(), Some("MARIO PEREZ"));
        assert_eq!(out.datos_persona.cui.as_deref(), Some("1234 56789 0123"));
        assert_eq!(out.datos_persona.edad.as_deref(), Some("30"));
        assert_eq!(out.datos_persona.estado_civil.as_deref(), Some("Soltero"));
        assert_eq!(out.datos_contrato.fecha_inicio.as_deref(), Some("01/03/2025"));
        assert_eq!(
            out.datos_contrato.fecha_fin,
            EndDate::Text("31/12/2025".into())
        );
        assert_eq!(out.datos_contrato.monto, "Q.5,000.00");
        assert_eq!(out.datos_contrato.monto_en_letras, "CINCO MIL QUETZALES EXACTOS");
        assert_eq!(
            out.datos_contrato.descripcion_adicional,
            "Posición: Asesor de Ventas"
        );
    }

    #[test]
    fn bare_dpi_label_still_yields_cui() {
        let out = extract("COLABORADOR MARIO PEREZ\nDPI 1234567890123\nEDAD 30");
        assert_eq!(out.datos_persona.cui.as_deref(), Some("1234 56789 0123"));
        assert_eq!(out.datos_persona.edad.as_deref(), Some("30"));
    }

    #[test]
    fn out_of_range_age_is_absent_not_clamped() {
        let out = extract("COLABORADOR ANA LOPEZ\nEDAD 120");
        assert_eq!(out.datos_persona.edad, None);
    }

    #[test]
    fn rejected_age_candidate_keeps_cascade_alive() {
        // Label line garbled to an impossible value, but the real age
        // survives as a bare line between DPI and DIRECCIÓN.
        let text = "\
DPI /PASAPORTE 1234567890123
25
DIRECCIÓN Zona 1
EDAD 120";
        let out = extract(text);
        assert_eq!(out.datos_persona.edad.as_deref(), Some("25"));
    }

    #[test]
    fn open_ended_end_date_never_becomes_unparseable() {
        let out = extract("FECHA DE FINALIZACIÓN Indefinido");
        assert!(out.datos_contrato.fecha_fin.is_open_ended());

        let absent = extract("COLABORADOR MARIO PEREZ");
        assert!(absent.datos_contrato.fecha_fin.is_open_ended());
    }

    #[test]
    fn salutation_boilerplate_truncated_from_free_text() {
        let out = extract("POSICIÓN Asesor de Ventas Atentamente La Gerencia");
        assert_eq!(out.datos_persona.posicion.as_deref(), Some("Asesor de Ventas"));
    }

    #[test]
    fn non_numeric_amount_degrades_to_default() {
        let out = extract("HONORARIOS POR PAGAR pendiente");
        assert_eq!(out.datos_contrato.monto, "Q.0.00");
        assert_eq!(out.datos_contrato.monto_en_letras, "CERO QUETZALES EXACTOS");
    }

    #[test]
    fn normalizer_feeds_the_cascades() {
        // 'J' separator and PACAR label repaired before matching.
        let out = extract("DPI JPASAPORTE 12345678901l3\nHONORARIOS POR PACAR 5,000.00");
        assert_eq!(out.datos_persona.cui.as_deref(), Some("1234 56789 0113"));
        assert_eq!(out.datos_contrato.monto, "Q.5,000.00");
    }

    #[test]
    fn value_on_next_line_fallback() {
        let out = extract("EMPRESA\nACME S.A.\nCOLABORADOR\nMARIO PEREZ");
        assert_eq!(out.empresa_contratante.as_deref(), Some("ACME S.A."));
        assert_eq!(out.datos_persona.nombre_completo.as_deref(), Some("MARIO PEREZ"));
    }
}
