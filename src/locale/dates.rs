//! Spanish date rendering.
//!
//! Dates reach the pipeline in two textual shapes: `DD/MM/YYYY` from the
//! scanned form and `YYYY-MM-DD` from API callers. Both are accepted; the
//! slash decides which format is tried. Month names come from a fixed
//! Spanish table rather than the process locale — the original service set
//! the interpreter-wide locale to render `%B` in Spanish, which leaked into
//! every other consumer of the process; a table has no such blast radius.
//!
//! Every function here is pure and total. Parse failures never escape as
//! errors: they become the documented sentinel parts, which render in the
//! final contract as visibly unfilled text instead of aborting the request.

use crate::locale::numbers::cardinal;
use chrono::{Datelike, NaiveDate};

/// Spanish month names, indexed by `month0`.
pub const MONTHS: &[&str] = &[
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Name of a 1-based month number.
pub fn month_name(month: u32) -> &'static str {
    MONTHS[(month as usize).saturating_sub(1).min(11)]
}

/// Parse `DD/MM/YYYY` (form) or `YYYY-MM-DD` (API) into a date.
pub fn parse_flexible(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    let format = if trimmed.contains('/') {
        "%d/%m/%Y"
    } else {
        "%Y-%m-%d"
    };
    NaiveDate::parse_from_str(trimmed, format).ok()
}

/// One date decomposed into every rendering a template can ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateParts {
    pub dia: String,
    pub dia_letras: String,
    pub mes: String,
    pub anio: String,
    pub anio_letras: String,
    /// Composed short prose, e.g. `29 de enero de 2025`.
    pub completa: String,
}

impl DateParts {
    /// The unparseable-date sentinel: `N/A` parts, "Fecha no especificada".
    pub fn sentinel() -> Self {
        Self::na("Fecha no especificada")
    }

    /// The open-ended contract state: `N/A` parts, "Por tiempo indefinido".
    ///
    /// Distinct from [`DateParts::sentinel`]: an open-ended contract is
    /// valid, a garbled date is not, and the rendered prose must tell
    /// them apart.
    pub fn open_ended() -> Self {
        Self::na("Por tiempo indefinido")
    }

    fn na(completa: &str) -> Self {
        Self {
            dia: "N/A".to_string(),
            dia_letras: "N/A".to_string(),
            mes: "N/A".to_string(),
            anio: "N/A".to_string(),
            anio_letras: "N/A".to_string(),
            completa: completa.to_string(),
        }
    }

    /// Decompose a parsed date.
    pub fn from_date(date: NaiveDate) -> Self {
        let mes = month_name(date.month());
        Self {
            dia: date.day().to_string(),
            dia_letras: cardinal(u64::from(date.day())),
            mes: mes.to_string(),
            anio: date.year().to_string(),
            anio_letras: cardinal(date.year().max(0) as u64),
            completa: format!("{} de {} de {}", date.day(), mes, date.year()),
        }
    }

    /// Parse-or-sentinel entry point used for start/end dates.
    pub fn from_str(value: &str) -> Self {
        match parse_flexible(value) {
            Some(date) => Self::from_date(date),
            None => Self::sentinel(),
        }
    }
}

/// The canonical long form used for the contract's authored date:
/// `el veintinueve (29) de enero del año dos mil veinticinco (2025)`.
///
/// Word order, parenthesised digits and the "del año" connector are fixed —
/// the surrounding legal prose was authored against exactly this shape.
/// Unparseable input passes through unchanged so a hand-written date the
/// caller typed ("veintinueve de enero…") survives verbatim.
pub fn contract_long_date(value: &str) -> String {
    match parse_flexible(value) {
        Some(date) => format!(
            "el {} ({}) de {} del año {} ({})",
            cardinal(u64::from(date.day())),
            date.day(),
            month_name(date.month()),
            cardinal(date.year().max(0) as u64),
            date.year()
        ),
        None => value.to_string(),
    }
}

/// Long form for dates already held as dates (company authorization date):
/// `el ocho (8) de febrero de 2024`.
pub fn long_date(date: NaiveDate) -> String {
    format!(
        "el {} ({}) de {} de {}",
        cardinal(u64::from(date.day())),
        date.day(),
        month_name(date.month()),
        date.year()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_shapes() {
        let iso = parse_flexible("2025-01-29").unwrap();
        let local = parse_flexible("29/01/2025").unwrap();
        assert_eq!(iso, local);
        assert_eq!(iso, NaiveDate::from_ymd_opt(2025, 1, 29).unwrap());
    }

    #[test]
    fn contract_long_date_canonical_form() {
        assert_eq!(
            contract_long_date("2025-01-29"),
            "el veintinueve (29) de enero del año dos mil veinticinco (2025)"
        );
    }

    #[test]
    fn contract_long_date_passes_through_garbage() {
        assert_eq!(contract_long_date("mañana"), "mañana");
    }

    #[test]
    fn parts_from_form_date() {
        let parts = DateParts::from_str("01/03/2025");
        assert_eq!(parts.dia, "1");
        assert_eq!(parts.dia_letras, "uno");
        assert_eq!(parts.mes, "marzo");
        assert_eq!(parts.anio_letras, "dos mil veinticinco");
        assert_eq!(parts.completa, "1 de marzo de 2025");
    }

    #[test]
    fn sentinel_and_open_ended_stay_distinct() {
        let bad = DateParts::from_str("99/99/9999");
        assert_eq!(bad.completa, "Fecha no especificada");
        let open = DateParts::open_ended();
        assert_eq!(open.completa, "Por tiempo indefinido");
        assert_ne!(bad, open);
        assert_eq!(open.dia, "N/A");
    }

    #[test]
    fn company_long_date() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 8).unwrap();
        assert_eq!(long_date(d), "el ocho (8) de febrero de 2024");
    }
}
