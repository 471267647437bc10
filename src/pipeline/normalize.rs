//! Text normalisation: deterministic repair of recognition confusions.
//!
//! ## Why normalise before matching?
//!
//! The recognition engine confuses glyphs in systematic, predictable ways:
//! a `/` between "DPI" and "PASAPORTE" comes back as `J`, a `G` in "PAGAR"
//! as `C`, and digits inside identity numbers as the letters that share
//! their shape (`O`→`0`, `l`→`1`, `S`→`5`, `B`→`8`). Left alone, these
//! make the extractor's label patterns miss entirely or its validators
//! reject good values.
//!
//! Every rule is *scoped by keyword*: a lookalike letter is only rewritten
//! inside a digit-bearing value that follows a known numeric field label.
//! The same letter in a name or an address is never touched — correcting
//! "OLIVIA" to "0LIVIA" would be worse than the noise we started with.
//!
//! ## Rule order
//!
//! Label repairs run before the lookalike pass so the lookalike pass can
//! anchor on the *corrected* labels ("HONORARIOS POR PAGAR" exists only
//! after `PACAR` has been fixed).
//!
//! Normalisation is best-effort and total: unmatched confusions are left
//! as-is for the extractor's validators to reject.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all normalisation rules to raw recognized text.
pub fn normalize(input: &str) -> String {
    let s = repair_dpi_separator(input);
    let s = repair_pagar_label(&s);
    repair_digit_lookalikes(&s)
}

// ── Rule 1: DPI J PASAPORTE → DPI / PASAPORTE ────────────────────────────

static RE_DPI_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(DPI\s*)J(\s*PASAPORTE)").unwrap());

fn repair_dpi_separator(input: &str) -> String {
    RE_DPI_SEPARATOR.replace_all(input, "${1}/${2}").to_string()
}

// ── Rule 2: HONORARIOS POR PACAR → PAGAR ─────────────────────────────────

static RE_PAGAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(HONORARIOS\s+POR\s+PA)C(AR)\b").unwrap());

fn repair_pagar_label(input: &str) -> String {
    RE_PAGAR.replace_all(input, "${1}G${2}").to_string()
}

// ── Rule 3: digit lookalikes after numeric field labels ──────────────────

/// Letters the engine swaps for digits, and the digit they stand for.
const LOOKALIKES: &[(char, char)] = &[
    ('O', '0'),
    ('o', '0'),
    ('I', '1'),
    ('l', '1'),
    ('S', '5'),
    ('s', '5'),
    ('B', '8'),
];

/// Labels whose values are numeric and therefore safe to repair.
static RE_NUMERIC_FIELD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(\b(?:DPI\s*/?\s*PASAPORTE|EDAD|HONORARIOS\s+POR\s+PAGAR)[^\S\n]+)([^\n]+)",
    )
    .unwrap()
});

fn swap_lookalikes(token: &str) -> String {
    token
        .chars()
        .map(|c| {
            LOOKALIKES
                .iter()
                .find(|(from, _)| *from == c)
                .map(|(_, to)| *to)
                .unwrap_or(c)
        })
        .collect()
}

fn repair_digit_lookalikes(input: &str) -> String {
    RE_NUMERIC_FIELD
        .replace_all(input, |caps: &regex::Captures<'_>| {
            let label = &caps[1];
            let value = &caps[2];
            // Repair token by token; only tokens that already contain a
            // digit are candidates, so trailing words survive untouched.
            let repaired = value
                .split(' ')
                .map(|token| {
                    if token.chars().any(|c| c.is_ascii_digit()) {
                        swap_lookalikes(token)
                    } else {
                        token.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!("{label}{repaired}")
        })
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dpi_separator_repaired() {
        assert_eq!(
            normalize("DPI JPASAPORTE 1234567890123"),
            "DPI /PASAPORTE 1234567890123"
        );
    }

    #[test]
    fn pagar_label_repaired() {
        let out = normalize("HONORARIOS POR PACAR 5,000.00");
        assert!(out.contains("HONORARIOS POR PAGAR"), "got: {out}");
    }

    #[test]
    fn lookalikes_fixed_inside_numeric_values() {
        assert_eq!(
            normalize("DPI /PASAPORTE 12345678901l3"),
            "DPI /PASAPORTE 1234567890113"
        );
        assert_eq!(normalize("EDAD 3O"), "EDAD 30");
        // The PACAR repair feeds this rule.
        assert_eq!(
            normalize("HONORARIOS POR PACAR 5,OOO.00"),
            "HONORARIOS POR PAGAR 5,000.00"
        );
    }

    #[test]
    fn lookalikes_elsewhere_left_alone() {
        // 'O' and 'l' in a name line are real letters.
        let text = "COLABORADOR OLIVIA SOLIS\nEDAD 3O";
        let out = normalize(text);
        assert!(out.contains("OLIVIA SOLIS"));
        assert!(out.contains("EDAD 30"));
    }

    #[test]
    fn all_letter_tokens_in_numeric_values_survive() {
        // "AÑOS" carries no digit, so it is not a repair candidate.
        assert_eq!(normalize("EDAD 3O AÑOS"), "EDAD 30 AÑOS");
    }

    #[test]
    fn text_without_labels_is_identity() {
        let text = "Sin etiquetas conocidas, nada que corregir: OIlSB";
        assert_eq!(normalize(text), text);
    }
}
