//! Spanish locale rendering: numbers, dates, identity numbers, currency.
//!
//! Everything a template placeholder ultimately displays is produced here.
//! All functions are pure (no I/O, no process-locale dependence) and total
//! (every input yields a string; malformed input degrades to passthrough or
//! a documented sentinel, never an error). The pipeline injects this module
//! as its single formatting strategy instead of touching any global locale
//! state.

pub mod dates;
pub mod numbers;

pub use dates::{contract_long_date, long_date, DateParts};
pub use numbers::{cardinal, cardinal_upper, words_or_passthrough};

/// Length of a well-formed CUI (the Guatemalan identity number).
const CUI_LEN: usize = 13;

/// Strip the separators scanners and typists introduce into a CUI.
fn clean_cui(value: &str) -> String {
    value.chars().filter(|c| *c != ' ' && *c != '-').collect()
}

/// Display form of a CUI: `1234567890123` → `1234 56789 0123`.
///
/// Formatting happens if and only if the cleaned value is exactly 13
/// digits; anything else is returned unmodified — a malformed identity
/// number is the extractor's validators' problem, not a formatting error.
pub fn format_cui(value: &str) -> String {
    let clean = clean_cui(value);
    if clean.len() == CUI_LEN && clean.chars().all(|c| c.is_ascii_digit()) {
        format!("{} {} {}", &clean[0..4], &clean[4..9], &clean[9..13])
    } else {
        value.to_string()
    }
}

/// Spoken form of a CUI, read group by group with the word "espacio"
/// marking each gap, the way a notary dictates it:
/// `1234 56789 0123` → `mil doscientos treinta y cuatro espacio … espacio …`.
///
/// A value that is not 13 digits falls back to digit-by-digit words; a
/// value with no digits at all yields the empty string.
pub fn cui_words(value: &str) -> String {
    let clean = clean_cui(value);
    if clean.is_empty() || !clean.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }
    if clean.len() == CUI_LEN {
        let groups = [&clean[0..4], &clean[4..9], &clean[9..13]];
        groups
            .iter()
            .map(|g| cardinal(g.parse::<u64>().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join(" espacio ")
    } else {
        clean
            .chars()
            .map(|d| cardinal(u64::from(d.to_digit(10).unwrap_or(0))))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Group an integer with thousands separators: `1234567` → `1,234,567`.
fn group_thousands(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut groups: Vec<String> = Vec::new();
    while n > 0 {
        groups.push((n % 1000).to_string());
        n /= 1000;
    }
    groups
        .iter()
        .enumerate()
        .rev()
        .map(|(i, g)| {
            if i == groups.len() - 1 {
                g.clone()
            } else {
                format!("{g:0>3}")
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Quetzal currency display form: `5000.0` → `Q.5,000.00`.
pub fn format_quetzales(amount: f64) -> String {
    let cents_total = (amount.abs() * 100.0).round() as u64;
    format!(
        "Q.{}.{:02}",
        group_thousands(cents_total / 100),
        cents_total % 100
    )
}

/// Monetary amount in words, uppercase with the legal "EXACTOS" tail:
/// `5000.0` → `CINCO MIL QUETZALES EXACTOS`.
///
/// Only the integer part is spelled; that is what the source contracts do.
pub fn amount_words(amount: f64) -> String {
    format!("{} QUETZALES EXACTOS", cardinal_upper(amount.abs() as u64))
}

/// Capitalize each word without disturbing accented characters:
/// `MARÍA JOSÉ LÓPEZ` → `María José López`.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>()
                        + &chars.flat_map(char::to_lowercase).collect::<String>()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
