//! Render-context assembly: one nested map with everything formatted.
//!
//! This is the join point of the pipeline: extracted person/contract
//! fields meet the company and legal-representative records from the
//! store, every value gets its display form from the locale module, and
//! the result is the nested section map templates are written against.
//!
//! Two guarantees matter here:
//!
//! * **Catalog totality.** Every token the placeholder catalog promises
//!   resolves to *some* string — missing upstream data degrades to an
//!   empty value, never to a missing key that would leave a literal
//!   `{{token}}` in a rendered contract. [`RenderContext::flatten`]
//!   derives the replacement map from the catalog itself, so this holds
//!   structurally.
//! * **Defaults at the last moment.** Absence is preserved through
//!   extraction; the domain defaults ("Soltero", "Guatemalteco", "N/A",
//!   "Servicios Profesionales") are applied only here, where the document
//!   is about to be worded.

use crate::catalog::{self, Section};
use crate::fields::{EndDate, ExtractionOutput};
use crate::locale::{self, dates::DateParts};
use crate::store::{CompanyRecord, RepresentativeRecord};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The nested naming context handed to the substitution engine.
///
/// Built fresh per render request; never shared across requests.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    sections: BTreeMap<&'static str, BTreeMap<&'static str, String>>,
}

impl RenderContext {
    fn insert(&mut self, section: Section, key: &'static str, value: impl Into<String>) {
        self.sections
            .entry(section.name())
            .or_default()
            .insert(key, value.into());
    }

    /// Value at a (section, key) address, if the builder set one.
    pub fn get(&self, section: Section, key: &str) -> Option<&str> {
        self.sections
            .get(section.name())
            .and_then(|m| m.get(key))
            .map(String::as_str)
    }

    /// The flattened literal replacement map, derived from the catalog.
    ///
    /// Every catalog token is present; an address the builder never filled
    /// maps to the empty string.
    pub fn flatten(&self) -> BTreeMap<String, String> {
        catalog::PLACEHOLDERS
            .iter()
            .map(|p| {
                let value = self.get(p.section, p.key).unwrap_or("").to_string();
                (p.token.to_string(), value)
            })
            .collect()
    }
}

/// Representative age the way the source contracts compute it: whole days
/// since birth divided by 365. Not calendar-accurate around birthdays and
/// leap years; kept because the rendered prose was authored against it.
fn approximate_age(birth: NaiveDate, today: NaiveDate) -> i64 {
    (today - birth).num_days() / 365
}

fn date_parts(section_value: Option<&str>) -> DateParts {
    match section_value {
        Some(s) => {
            let parts = DateParts::from_str(s);
            if parts == DateParts::sentinel() {
                warn!(value = s, "date did not parse; rendering the sentinel");
            }
            parts
        }
        None => DateParts::sentinel(),
    }
}

fn insert_date_parts(ctx: &mut RenderContext, section: Section, parts: &DateParts) {
    ctx.insert(section, "dia", &parts.dia);
    ctx.insert(section, "dia_letras", &parts.dia_letras);
    ctx.insert(section, "mes", &parts.mes);
    ctx.insert(section, "anio", &parts.anio);
    ctx.insert(section, "anio_letras", &parts.anio_letras);
    ctx.insert(section, "completa", &parts.completa);
}

/// Assemble the full render context.
///
/// `contract_date` is the caller-supplied authored date (free text, usually
/// ISO); `today` drives the representative-age derivation and is injected
/// so the builder is deterministic.
pub fn build_context(
    company: &CompanyRecord,
    representative: &RepresentativeRecord,
    extraction: &ExtractionOutput,
    contract_date: &str,
    today: NaiveDate,
) -> RenderContext {
    let person = &extraction.datos_persona;
    let contract = &extraction.datos_contrato;
    let mut ctx = RenderContext::default();

    // ── Employee ─────────────────────────────────────────────────────────
    let nombre = person.nombre_completo.as_deref().unwrap_or("");
    let direccion = person.direccion.as_deref().unwrap_or("");
    let posicion = person
        .posicion
        .as_deref()
        .or(contract.tipo_contrato.as_deref())
        .unwrap_or("");
    let cui = person.cui.as_deref().unwrap_or("");
    let edad_letras = person
        .edad
        .as_deref()
        .and_then(|e| e.parse::<u64>().ok())
        .map(locale::cardinal)
        .unwrap_or_default();

    ctx.insert(Section::Employee, "nombre_completo", nombre);
    ctx.insert(Section::Employee, "nombre_completo_titulo", locale::title_case(nombre));
    ctx.insert(Section::Employee, "cui", locale::format_cui(cui));
    ctx.insert(Section::Employee, "cui_letras", locale::cui_words(cui));
    ctx.insert(Section::Employee, "edad", person.edad.as_deref().unwrap_or(""));
    ctx.insert(Section::Employee, "edad_letras", edad_letras);
    ctx.insert(Section::Employee, "direccion", direccion);
    ctx.insert(
        Section::Employee,
        "estado_civil",
        person.estado_civil.as_deref().unwrap_or("Soltero"),
    );
    ctx.insert(
        Section::Employee,
        "nacionalidad",
        person.nacionalidad.as_deref().unwrap_or("Guatemalteco"),
    );
    ctx.insert(
        Section::Employee,
        "profesion",
        person.profesion.as_deref().unwrap_or("N/A"),
    );
    ctx.insert(Section::Employee, "posicion", posicion);
    ctx.insert(Section::Employee, "puesto", posicion);
    ctx.insert(Section::Employee, "lugar_notificaciones", direccion);

    // ── Company ──────────────────────────────────────────────────────────
    ctx.insert(Section::Company, "razon_social", &company.razon_social);
    ctx.insert(Section::Company, "autorizada_en", &company.autorizada_en);
    ctx.insert(
        Section::Company,
        "fecha_autorizacion",
        company
            .fecha_autorizacion
            .map(locale::long_date)
            .unwrap_or_default(),
    );
    ctx.insert(Section::Company, "autorizada_por", &company.autorizada_por);
    ctx.insert(Section::Company, "inscrita_en", &company.inscrita_en);
    ctx.insert(Section::Company, "numero_registro", &company.numero_registro);
    ctx.insert(
        Section::Company,
        "numero_registro_letras",
        locale::words_or_passthrough(&company.numero_registro),
    );
    ctx.insert(Section::Company, "numero_folio", &company.numero_folio);
    ctx.insert(
        Section::Company,
        "numero_folio_letras",
        locale::words_or_passthrough(&company.numero_folio),
    );
    ctx.insert(Section::Company, "numero_libro", &company.numero_libro);
    ctx.insert(
        Section::Company,
        "numero_libro_letras",
        locale::words_or_passthrough(&company.numero_libro),
    );
    ctx.insert(Section::Company, "tipo_libro", &company.tipo_libro);
    ctx.insert(
        Section::Company,
        "lugar_notificaciones",
        &company.lugar_notificaciones,
    );
    ctx.insert(
        Section::Company,
        "segundo_lugar_notificaciones",
        &company.segundo_lugar_notificaciones,
    );

    // ── Legal representative ─────────────────────────────────────────────
    let rep_age = approximate_age(representative.fecha_nacimiento, today);
    ctx.insert(
        Section::LegalRepresentative,
        "nombre_completo",
        &representative.nombre_completo,
    );
    ctx.insert(Section::LegalRepresentative, "edad", rep_age.to_string());
    ctx.insert(
        Section::LegalRepresentative,
        "edad_letras",
        locale::cardinal(rep_age.max(0) as u64),
    );
    ctx.insert(
        Section::LegalRepresentative,
        "estado_civil",
        &representative.estado_civil,
    );
    ctx.insert(
        Section::LegalRepresentative,
        "profesion",
        &representative.profesion,
    );
    ctx.insert(
        Section::LegalRepresentative,
        "nacionalidad",
        &representative.nacionalidad,
    );
    ctx.insert(
        Section::LegalRepresentative,
        "cui",
        locale::format_cui(&representative.cui),
    );
    ctx.insert(
        Section::LegalRepresentative,
        "cui_letras",
        locale::cui_words(&representative.cui),
    );
    ctx.insert(
        Section::LegalRepresentative,
        "extendido_en",
        &representative.extendido_en,
    );

    // ── Contract ─────────────────────────────────────────────────────────
    ctx.insert(
        Section::Contract,
        "fecha",
        locale::contract_long_date(contract_date),
    );
    ctx.insert(Section::Contract, "monto", &contract.monto);
    ctx.insert(Section::Contract, "monto_letras", &contract.monto_en_letras);
    ctx.insert(
        Section::Contract,
        "tipo",
        contract
            .tipo_contrato
            .as_deref()
            .unwrap_or("Servicios Profesionales"),
    );
    ctx.insert(Section::Contract, "genero", "El Notario");

    // ── Start / end dates ────────────────────────────────────────────────
    insert_date_parts(
        &mut ctx,
        Section::StartDate,
        &date_parts(contract.fecha_inicio.as_deref()),
    );
    let end_parts = match &contract.fecha_fin {
        EndDate::OpenEnded => DateParts::open_ended(),
        EndDate::Text(s) => date_parts(Some(s)),
    };
    insert_date_parts(&mut ctx, Section::EndDate, &end_parts);

    debug!(sections = ctx.sections.len(), "render context assembled");
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{ContractFields, PersonFields};

    fn sample_company() -> CompanyRecord {
        CompanyRecord {
            razon_social: "Innovate Solutions, S.A.".into(),
            autorizada_en: "la ciudad de Guatemala".into(),
            fecha_autorizacion: NaiveDate::from_ymd_opt(2024, 2, 8),
            numero_registro: "12345".into(),
            numero_folio: "250".into(),
            numero_libro: "18".into(),
            ..CompanyRecord::default()
        }
    }

    fn sample_rep() -> RepresentativeRecord {
        RepresentativeRecord {
            nombre_completo: "ANA MARIA RODRIGUEZ".into(),
            cui: "3003541690101".into(),
            fecha_nacimiento: NaiveDate::from_ymd_opt(1980, 5, 14).unwrap(),
            estado_civil: "Casada".into(),
            profesion: "Administradora de Empresas".into(),
            nacionalidad: "Guatemalteca".into(),
            extendido_en: "el municipio de Guatemala".into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap()
    }

    #[test]
    fn every_catalog_token_resolves_even_on_empty_extraction() {
        let ctx = build_context(
            &sample_company(),
            &sample_rep(),
            &ExtractionOutput::default(),
            "2025-01-29",
            today(),
        );
        let map = ctx.flatten();
        for p in catalog::PLACEHOLDERS {
            assert!(
                map.contains_key(p.token),
                "catalog token {} missing from replacement map",
                p.token
            );
        }
    }

    #[test]
    fn defaults_applied_at_formatting_time() {
        let ctx = build_context(
            &sample_company(),
            &sample_rep(),
            &ExtractionOutput::default(),
            "",
            today(),
        );
        assert_eq!(ctx.get(Section::Employee, "estado_civil"), Some("Soltero"));
        assert_eq!(ctx.get(Section::Employee, "nacionalidad"), Some("Guatemalteco"));
        assert_eq!(ctx.get(Section::Employee, "profesion"), Some("N/A"));
        assert_eq!(
            ctx.get(Section::Contract, "tipo"),
            Some("Servicios Profesionales")
        );
        assert_eq!(ctx.get(Section::Contract, "monto"), Some("Q.0.00"));
    }

    #[test]
    fn representative_age_uses_days_over_365() {
        let ctx = build_context(
            &sample_company(),
            &sample_rep(),
            &ExtractionOutput::default(),
            "",
            today(),
        );
        // 1980-05-14 → 2025-05-14 is 45 years; the /365 approximation also
        // lands on 45 (leap days push it just past the boundary).
        assert_eq!(ctx.get(Section::LegalRepresentative, "edad"), Some("45"));
        assert_eq!(
            ctx.get(Section::LegalRepresentative, "edad_letras"),
            Some("cuarenta y cinco")
        );
    }

    #[test]
    fn contract_date_rendered_in_canonical_long_form() {
        let ctx = build_context(
            &sample_company(),
            &sample_rep(),
            &ExtractionOutput::default(),
            "2025-01-29",
            today(),
        );
        assert_eq!(
            ctx.get(Section::Contract, "fecha"),
            Some("el veintinueve (29) de enero del año dos mil veinticinco (2025)")
        );
    }

    #[test]
    fn open_ended_end_date_renders_the_legend() {
        let extraction = ExtractionOutput {
            datos_contrato: ContractFields {
                fecha_inicio: Some("01/03/2025".into()),
                ..ContractFields::default()
            },
            ..ExtractionOutput::default()
        };
        let ctx = build_context(&sample_company(), &sample_rep(), &extraction, "", today());
        assert_eq!(
            ctx.get(Section::EndDate, "completa"),
            Some("Por tiempo indefinido")
        );
        assert_eq!(ctx.get(Section::EndDate, "dia"), Some("N/A"));
        // Start date parsed normally.
        assert_eq!(ctx.get(Section::StartDate, "mes"), Some("marzo"));
    }

    #[test]
    fn employee_values_formatted_for_display() {
        let extraction = ExtractionOutput {
            datos_persona: PersonFields {
                nombre_completo: Some("MARIO PEREZ".into()),
                cui: Some("1234567890123".into()),
                edad: Some("30".into()),
                direccion: Some("Zona 1".into()),
                ..PersonFields::default()
            },
            ..ExtractionOutput::default()
        };
        let ctx = build_context(&sample_company(), &sample_rep(), &extraction, "", today());
        assert_eq!(ctx.get(Section::Employee, "cui"), Some("1234 56789 0123"));
        assert_eq!(
            ctx.get(Section::Employee, "nombre_completo_titulo"),
            Some("Mario Perez")
        );
        assert_eq!(ctx.get(Section::Employee, "edad_letras"), Some("treinta"));
        assert_eq!(ctx.get(Section::Employee, "lugar_notificaciones"), Some("Zona 1"));
        assert_eq!(
            ctx.get(Section::LegalRepresentative, "cui"),
            Some("3003 54169 0101")
        );
    }
}
