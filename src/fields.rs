//! Data model for the field-extraction pipeline.
//!
//! Three layers, matching the stages of the pipeline:
//!
//! * [`RawExtractionResult`] — what the cascade matchers produced, one
//!   optional string per logical field. Every field is represented; absence
//!   is an explicit `None`, never a missing key.
//! * [`PersonFields`] / [`ContractFields`] — the typed, validated view.
//!   All person fields stay optional here: domain defaults ("Soltero",
//!   "Guatemalteco", …) are applied at formatting time by the context
//!   builder, so absence survives until the last responsible moment.
//! * [`ExtractionOutput`] — the JSON shape handed to callers: two flat
//!   groups, `person` and `contract`, with empty strings (never null) for
//!   absent scalars.
//!
//! The end date is special: "no fixed end date" is a real domain state,
//! tagged on the form with the word "indefinido". [`EndDate`] keeps it
//! distinct from both a concrete date string and an unparseable one, and
//! its serde impls preserve the distinction across a JSON round-trip.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Logical fields the extractor knows about.
///
/// The order here is the order fields appear on the printed form; it is
/// also the iteration order of [`RawExtractionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Company,
    FullName,
    Cui,
    Age,
    Address,
    MaritalStatus,
    Profession,
    Position,
    StartDate,
    EndDate,
    Amount,
}

impl Field {
    /// All logical fields, in form order.
    pub const ALL: &'static [Field] = &[
        Field::Company,
        Field::FullName,
        Field::Cui,
        Field::Age,
        Field::Address,
        Field::MaritalStatus,
        Field::Profession,
        Field::Position,
        Field::StartDate,
        Field::EndDate,
        Field::Amount,
    ];

    /// Stable snake_case name, used in logs and test output.
    pub fn name(self) -> &'static str {
        match self {
            Field::Company => "empresa_contratante",
            Field::FullName => "nombre_completo",
            Field::Cui => "cui",
            Field::Age => "edad",
            Field::Address => "direccion",
            Field::MaritalStatus => "estado_civil",
            Field::Profession => "profesion",
            Field::Position => "posicion",
            Field::StartDate => "fecha_inicio",
            Field::EndDate => "fecha_fin",
            Field::Amount => "monto",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw per-field extraction outcome: one optional string per logical field.
///
/// Created once per recognition pass and immutable after validation. Every
/// field in [`Field::ALL`] is present in the map — an unmatched field is
/// `None`, so downstream code never has to distinguish "missing key" from
/// "matched nothing".
#[derive(Debug, Clone, Default)]
pub struct RawExtractionResult {
    values: BTreeMap<Field, Option<String>>,
}

impl RawExtractionResult {
    /// Create a result with every field explicitly absent.
    pub fn empty() -> Self {
        let mut values = BTreeMap::new();
        for &f in Field::ALL {
            values.insert(f, None);
        }
        Self { values }
    }

    /// Record a validated candidate for `field`.
    pub fn set(&mut self, field: Field, value: String) {
        self.values.insert(field, Some(value));
    }

    /// The validated value for `field`, if any matcher produced one.
    pub fn get(&self, field: Field) -> Option<&str> {
        self.values.get(&field).and_then(|v| v.as_deref())
    }

    /// Owned copy of the value for `field`.
    pub fn cloned(&self, field: Field) -> Option<String> {
        self.get(field).map(str::to_string)
    }

    /// Number of fields that matched.
    pub fn matched(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }
}

// ── End date ─────────────────────────────────────────────────────────────

/// Contract end date: open-ended is a real state, not a parse failure.
///
/// `OpenEnded` means the form said "indefinido" (or left the field blank);
/// `Text` carries whatever the form said otherwise, which may or may not
/// parse as a calendar date — that judgement belongs to the locale
/// formatter, which degrades unparseable text to its own sentinel. The two
/// must never collapse into each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndDate {
    /// No fixed end date ("Por tiempo indefinido").
    OpenEnded,
    /// A captured date string, not yet parsed.
    Text(String),
}

/// The literal the original service emitted for an open-ended contract;
/// kept for wire compatibility.
pub const OPEN_ENDED_LITERAL: &str = "Contrato Indefinido";

impl EndDate {
    /// Classify a raw captured value: absent or "indefinido" (any case)
    /// means open-ended; anything else is kept verbatim.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            None => EndDate::OpenEnded,
            Some(s) if s.trim().is_empty() => EndDate::OpenEnded,
            Some(s) if s.to_lowercase().contains("indefinido") => EndDate::OpenEnded,
            Some(s) => EndDate::Text(s.to_string()),
        }
    }

    pub fn is_open_ended(&self) -> bool {
        matches!(self, EndDate::OpenEnded)
    }

    /// The wire string: the open-ended literal, or the captured text.
    pub fn as_output_str(&self) -> &str {
        match self {
            EndDate::OpenEnded => OPEN_ENDED_LITERAL,
            EndDate::Text(s) => s,
        }
    }
}

impl Serialize for EndDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_output_str())
    }
}

impl<'de> Deserialize<'de> for EndDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.trim().is_empty() {
            Ok(EndDate::OpenEnded)
        } else {
            Ok(EndDate::from_raw(Some(&s)))
        }
    }
}

// ── Serde helpers: absent = empty string on the wire ─────────────────────

/// Serde adapter mapping `Option<String>` to `""` on the wire.
///
/// The output contract (§6) promises empty strings, never nulls, for
/// absent scalars; this keeps the in-memory model optional while honouring
/// that.
mod empty_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<String>, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(v.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
        let s = String::deserialize(de)?;
        if s.is_empty() {
            Ok(None)
        } else {
            Ok(Some(s))
        }
    }
}

// ── Typed field groups ───────────────────────────────────────────────────

/// Person fields recovered from the form.
///
/// Everything is optional: defaults are domain literals applied by the
/// context builder, not here. On the wire each absent field is `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonFields {
    #[serde(with = "empty_string", default)]
    pub cui: Option<String>,
    #[serde(with = "empty_string", default)]
    pub nombre_completo: Option<String>,
    #[serde(with = "empty_string", default)]
    pub direccion: Option<String>,
    #[serde(with = "empty_string", default)]
    pub edad: Option<String>,
    #[serde(with = "empty_string", default)]
    pub estado_civil: Option<String>,
    #[serde(with = "empty_string", default)]
    pub nacionalidad: Option<String>,
    #[serde(with = "empty_string", default)]
    pub profesion: Option<String>,
    #[serde(with = "empty_string", default)]
    pub posicion: Option<String>,
}

/// Contract fields recovered from the form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFields {
    #[serde(with = "empty_string", default)]
    pub tipo_contrato: Option<String>,
    #[serde(with = "empty_string", default)]
    pub fecha_inicio: Option<String>,
    pub fecha_fin: EndDate,
    /// Formatted amount, e.g. `Q.5,000.00`; `Q.0.00` when absent.
    pub monto: String,
    /// Amount in uppercase Spanish words, e.g. `CINCO MIL QUETZALES EXACTOS`.
    pub monto_en_letras: String,
    /// Free-text addition, e.g. `Posición: Asesor de Ventas`.
    pub descripcion_adicional: String,
}

impl Default for ContractFields {
    fn default() -> Self {
        Self {
            tipo_contrato: None,
            fecha_inicio: None,
            fecha_fin: EndDate::OpenEnded,
            monto: "Q.0.00".to_string(),
            monto_en_letras: "CERO QUETZALES EXACTOS".to_string(),
            descripcion_adicional: String::new(),
        }
    }
}

/// Full extraction output: the two-group JSON shape handed to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionOutput {
    /// Contracting company name as printed on the form, `""` if unmatched.
    #[serde(with = "empty_string", default)]
    pub empresa_contratante: Option<String>,
    #[serde(rename = "person")]
    pub datos_persona: PersonFields,
    #[serde(rename = "contract")]
    pub datos_contrato: ContractFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_result_represents_every_field() {
        let raw = RawExtractionResult::empty();
        for &f in Field::ALL {
            assert_eq!(raw.get(f), None, "field {f} must be present and absent");
        }
        assert_eq!(raw.matched(), 0);
    }

    #[test]
    fn end_date_classification() {
        assert!(EndDate::from_raw(None).is_open_ended());
        assert!(EndDate::from_raw(Some("  ")).is_open_ended());
        assert!(EndDate::from_raw(Some("Indefinido")).is_open_ended());
        assert!(EndDate::from_raw(Some("contrato INDEFINIDO")).is_open_ended());
        assert_eq!(
            EndDate::from_raw(Some("31/12/2025")),
            EndDate::Text("31/12/2025".into())
        );
    }

    #[test]
    fn end_date_round_trips_through_json() {
        let open = serde_json::to_string(&EndDate::OpenEnded).unwrap();
        assert_eq!(open, format!("\"{OPEN_ENDED_LITERAL}\""));
        let back: EndDate = serde_json::from_str(&open).unwrap();
        assert!(back.is_open_ended());

        let date = EndDate::Text("2025-12-31".into());
        let json = serde_json::to_string(&date).unwrap();
        let back: EndDate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, date);
    }

    #[test]
    fn absent_person_fields_serialize_as_empty_strings() {
        let json = serde_json::to_value(ExtractionOutput::default()).unwrap();
        assert_eq!(json["person"]["cui"], "");
        assert_eq!(json["person"]["nombre_completo"], "");
        assert_eq!(json["contract"]["monto"], "Q.0.00");
        assert_eq!(json["contract"]["fecha_fin"], OPEN_ENDED_LITERAL);
    }

    #[test]
    fn empty_strings_deserialize_as_absent() {
        let out: ExtractionOutput = serde_json::from_str(
            r#"{
                "empresa_contratante": "",
                "person": {"cui": "", "nombre_completo": "MARIO PEREZ", "direccion": "",
                           "edad": "", "estado_civil": "", "nacionalidad": "",
                           "profesion": "", "posicion": ""},
                "contract": {"tipo_contrato": "", "fecha_inicio": "",
                             "fecha_fin": "Contrato Indefinido",
                             "monto": "Q.0.00",
                             "monto_en_letras": "CERO QUETZALES EXACTOS",
                             "descripcion_adicional": ""}
            }"#,
        )
        .unwrap();
        assert_eq!(out.datos_persona.cui, None);
        assert_eq!(out.datos_persona.nombre_completo.as_deref(), Some("MARIO PEREZ"));
        assert!(out.datos_contrato.fecha_fin.is_open_ended());
    }
}
