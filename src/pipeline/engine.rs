//! Placeholder substitution over WordprocessingML.
//!
//! ## The run-fragmentation problem
//!
//! Word splits a paragraph's text into *runs* — spans sharing one
//! formatting style — and it splits them wherever editing history happened
//! to leave boundaries. A placeholder typed as `{{nombre_completo}}` can
//! arrive as three runs: `{{nom`, `bre_com`, `pleto}}`. Matching run by
//! run therefore misses tokens; the only reliable unit is the paragraph.
//!
//! Per paragraph the engine runs a three-state pass:
//!
//! 1. **concatenate** every run's text, in order, into the true text;
//! 2. if no placeholder key occurs in it, the paragraph is left
//!    byte-for-byte untouched — which is what preserves formatting on
//!    untouched prose and makes the whole pass idempotent;
//! 3. otherwise **rewrite**: capture the first run's properties, apply
//!    every replacement literally, drop all runs and emit exactly one run
//!    carrying the substituted text under the captured properties.
//!
//! A paragraph that mixed several styles collapses to its first run's
//! style after substitution. That is an accepted, documented limitation —
//! the fix (re-distributing text across the old run boundaries) would move
//! the boundaries anyway once lengths change.
//!
//! One routine covers every container: WordprocessingML paragraphs never
//! nest, so scanning a part for `<w:p>` elements reaches body text and
//! table cells at any table-nesting depth; header and footer parts get the
//! same scan part by part.

use crate::error::ContractError;
use crate::pipeline::docx::DocxArchive;
use once_cell::sync::Lazy;
use quick_xml::escape::{escape, unescape};
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// One run: its visible text and its raw `<w:rPr>` properties XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub props: Option<String>,
}

/// Totals reported back to the orchestrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubstitutionStats {
    /// Document parts visited (body + headers + footers).
    pub parts: usize,
    /// Paragraphs that contained at least one key and were rewritten.
    pub paragraphs_rewritten: usize,
}

// `<w:p …>` must not match `<w:pPr>`, nor `<w:r …>` match `<w:rPr>`: the
// element name is complete only when followed by `>` or an attribute.
static RE_PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<w:p(?:>|\s[^>]*>).*?</w:p>").unwrap());
static RE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<w:r(?:>|\s[^>]*>).*?</w:r>").unwrap());
static RE_RUN_PROPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<w:rPr>.*?</w:rPr>").unwrap());
static RE_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<w:t(?:\s[^>]*)?>(.*?)</w:t>").unwrap());

/// Parse a paragraph's runs: visible text (XML-unescaped) plus raw
/// properties.
fn parse_runs(paragraph_xml: &str) -> Result<Vec<Run>, String> {
    let mut runs = Vec::new();
    for run_match in RE_RUN.find_iter(paragraph_xml) {
        let run_xml = run_match.as_str();
        let props = RE_RUN_PROPS
            .find(run_xml)
            .map(|m| m.as_str().to_string());
        let mut text = String::new();
        for caps in RE_TEXT.captures_iter(run_xml) {
            let raw = &caps[1];
            let unescaped = unescape(raw).map_err(|e| format!("bad entity in run text: {e}"))?;
            text.push_str(&unescaped);
        }
        runs.push(Run { text, props });
    }
    Ok(runs)
}

/// The pure repair step: concatenate a run sequence, decide whether any
/// replacement key occurs, and if so produce the substituted text together
/// with the style to re-emit it under (the first run's).
///
/// Returns `None` when the paragraph contains no key — the caller must
/// then leave it untouched.
pub fn repair(
    runs: &[Run],
    replacements: &BTreeMap<String, String>,
) -> Option<(String, Option<String>)> {
    let mut text: String = runs.iter().map(|r| r.text.as_str()).collect();
    if !replacements.keys().any(|key| text.contains(key.as_str())) {
        return None;
    }
    for (key, value) in replacements {
        if text.contains(key.as_str()) {
            text = text.replace(key.as_str(), value);
        }
    }
    let style = runs.first().and_then(|r| r.props.clone());
    Some((text, style))
}

/// Build the single replacement run.
fn render_run(text: &str, props: Option<&str>) -> String {
    format!(
        r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#,
        props.unwrap_or(""),
        escape(text)
    )
}

/// Rewrite one paragraph: the first run's span is replaced by the new run,
/// every other run span is deleted, and everything that is not a run
/// (paragraph properties, bookmarks) stays where it was.
fn rewrite_paragraph(paragraph_xml: &str, new_run: &str) -> String {
    let spans: Vec<(usize, usize)> = RE_RUN
        .find_iter(paragraph_xml)
        .map(|m| (m.start(), m.end()))
        .collect();
    let mut result = String::with_capacity(paragraph_xml.len() + new_run.len());
    let mut cursor = 0;
    for (i, &(start, end)) in spans.iter().enumerate() {
        result.push_str(&paragraph_xml[cursor..start]);
        if i == 0 {
            result.push_str(new_run);
        }
        cursor = end;
    }
    result.push_str(&paragraph_xml[cursor..]);
    result
}

/// Substitute every placeholder across one document part.
///
/// Returns the rewritten XML and the number of paragraphs touched.
/// Paragraphs without keys are copied through byte-identically.
pub fn substitute_part(
    part_name: &str,
    xml: &str,
    replacements: &BTreeMap<String, String>,
) -> Result<(String, usize), ContractError> {
    let mut result = String::with_capacity(xml.len());
    let mut cursor = 0;
    let mut rewritten = 0;

    for para in RE_PARAGRAPH.find_iter(xml) {
        result.push_str(&xml[cursor..para.start()]);
        cursor = para.end();

        let para_xml = para.as_str();
        let runs = parse_runs(para_xml).map_err(|detail| ContractError::Substitution {
            part: part_name.to_string(),
            detail,
        })?;
        match repair(&runs, replacements) {
            Some((text, style)) => {
                trace!(part = part_name, "paragraph rewritten");
                let rebuilt = rewrite_paragraph(para_xml, &render_run(&text, style.as_deref()));
                result.push_str(&rebuilt);
                rewritten += 1;
            }
            None => result.push_str(para_xml),
        }
    }
    result.push_str(&xml[cursor..]);
    Ok((result, rewritten))
}

/// The logical (run-concatenated, unescaped) text of every paragraph in a
/// part, in document order.
///
/// This is the same view of the text the substitution pass matches
/// against; `inspect` and the integration tests use it to look for tokens
/// the way the engine would see them.
pub fn paragraph_texts(part_name: &str, xml: &str) -> Result<Vec<String>, ContractError> {
    RE_PARAGRAPH
        .find_iter(xml)
        .map(|para| {
            parse_runs(para.as_str())
                .map(|runs| runs.iter().map(|r| r.text.as_str()).collect::<String>())
                .map_err(|detail| ContractError::Substitution {
                    part: part_name.to_string(),
                    detail,
                })
        })
        .collect()
}

/// Substitute every placeholder across the whole archive: the body part,
/// then each header and footer part.
pub fn substitute_document(
    archive: &mut DocxArchive,
    replacements: &BTreeMap<String, String>,
) -> Result<SubstitutionStats, ContractError> {
    let mut stats = SubstitutionStats::default();
    for part_name in archive.text_parts() {
        let bytes = archive
            .part(&part_name)
            .expect("text_parts returned a missing part");
        let xml = std::str::from_utf8(bytes).map_err(|_| ContractError::Substitution {
            part: part_name.clone(),
            detail: "part is not valid UTF-8".to_string(),
        })?;
        let (new_xml, rewritten) = substitute_part(&part_name, xml, replacements)?;
        stats.parts += 1;
        if rewritten > 0 {
            debug!(part = %part_name, rewritten, "part substituted");
            archive.set_part(&part_name, new_xml.into_bytes());
            stats.paragraphs_rewritten += rewritten;
        }
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn para(runs_xml: &str) -> String {
        format!("<w:p><w:pPr><w:jc w:val=\"both\"/></w:pPr>{runs_xml}</w:p>")
    }

    #[test]
    fn paragraph_without_keys_is_byte_identical() {
        let xml = para(r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Sin cambios.</w:t></w:r>"#);
        let (out, rewritten) =
            substitute_part("word/document.xml", &xml, &map(&[("{{cui}}", "123")])).unwrap();
        assert_eq!(out, xml);
        assert_eq!(rewritten, 0);
    }

    #[test]
    fn token_split_across_three_runs_is_substituted() {
        let xml = para(concat!(
            r#"<w:r><w:rPr><w:b/><w:sz w:val="24"/></w:rPr><w:t>{{nom</w:t></w:r>"#,
            r#"<w:r><w:t>bre_com</w:t></w:r>"#,
            r#"<w:r><w:rPr><w:i/></w:rPr><w:t>pleto}}</w:t></w:r>"#,
        ));
        let (out, rewritten) = substitute_part(
            "word/document.xml",
            &xml,
            &map(&[("{{nombre_completo}}", "MARIO PEREZ")]),
        )
        .unwrap();
        assert_eq!(rewritten, 1);
        assert!(out.contains(">MARIO PEREZ</w:t>"), "got: {out}");
        // Exactly one run survives, wearing the first run's properties.
        assert_eq!(out.matches("<w:r>").count(), 1);
        assert!(out.contains("<w:rPr><w:b/><w:sz w:val=\"24\"/></w:rPr>"));
        assert!(!out.contains("<w:i/>"), "later run styles must not survive");
        // Paragraph properties stay put.
        assert!(out.contains("<w:jc w:val=\"both\"/>"));
    }

    #[test]
    fn substitution_is_idempotent() {
        let xml = para(r#"<w:r><w:t>Contrato de {{puesto}}</w:t></w:r>"#);
        let replacements = map(&[("{{puesto}}", "Asesor de Ventas")]);
        let (once, n1) = substitute_part("word/document.xml", &xml, &replacements).unwrap();
        assert_eq!(n1, 1);
        let (twice, n2) = substitute_part("word/document.xml", &once, &replacements).unwrap();
        assert_eq!(n2, 0, "already-substituted document must be a no-op");
        assert_eq!(twice, once);
    }

    #[test]
    fn paragraphs_inside_nested_tables_are_reached() {
        let cell_para = para(r#"<w:r><w:t>{{monto}}</w:t></w:r>"#);
        let xml = format!(
            "<w:tbl><w:tr><w:tc><w:tbl><w:tr><w:tc>{cell_para}</w:tc></w:tr></w:tbl></w:tc></w:tr></w:tbl>"
        );
        let (out, rewritten) =
            substitute_part("word/document.xml", &xml, &map(&[("{{monto}}", "Q.5,000.00")]))
                .unwrap();
        assert_eq!(rewritten, 1);
        assert!(out.contains(">Q.5,000.00</w:t>"));
        // Table skeleton untouched.
        assert_eq!(out.matches("<w:tbl>").count(), 2);
    }

    #[test]
    fn values_with_xml_specials_are_escaped() {
        let xml = para(r#"<w:r><w:t>{{empresa_entidad}}</w:t></w:r>"#);
        let (out, _) = substitute_part(
            "word/document.xml",
            &xml,
            &map(&[("{{empresa_entidad}}", "ACME & Cía. <S.A.>")]),
        )
        .unwrap();
        assert!(out.contains("ACME &amp; Cía. &lt;S.A.&gt;"), "got: {out}");
    }

    #[test]
    fn run_text_is_unescaped_before_matching() {
        // The token arrives split around an escaped ampersand elsewhere in
        // the paragraph; matching must happen on the logical text.
        let xml = para(concat!(
            r#"<w:r><w:t>A &amp; B: {{pue</w:t></w:r>"#,
            r#"<w:r><w:t>sto}}</w:t></w:r>"#,
        ));
        let (out, rewritten) =
            substitute_part("word/document.xml", &xml, &map(&[("{{puesto}}", "Asesor")]))
                .unwrap();
        assert_eq!(rewritten, 1);
        assert!(out.contains("A &amp; B: Asesor"), "got: {out}");
    }

    #[test]
    fn repair_reports_untouched_for_keyless_runs() {
        let runs = vec![Run {
            text: "sin tokens".into(),
            props: None,
        }];
        assert!(repair(&runs, &map(&[("{{cui}}", "1")])).is_none());
    }

    #[test]
    fn repair_takes_first_run_style() {
        let runs = vec![
            Run {
                text: "{{cui}}".into(),
                props: Some("<w:rPr><w:u w:val=\"single\"/></w:rPr>".into()),
            },
            Run {
                text: " fin".into(),
                props: Some("<w:rPr><w:i/></w:rPr>".into()),
            },
        ];
        let (text, style) = repair(&runs, &map(&[("{{cui}}", "1234 56789 0123")])).unwrap();
        assert_eq!(text, "1234 56789 0123 fin");
        assert_eq!(style.as_deref(), Some("<w:rPr><w:u w:val=\"single\"/></w:rPr>"));
    }

    #[test]
    fn paragraph_texts_sees_through_fragmentation() {
        let xml = format!(
            "{}{}",
            para(r#"<w:r><w:t>{{nom</w:t></w:r><w:r><w:t>bre_completo}}</w:t></w:r>"#),
            para(r#"<w:r><w:t>texto plano</w:t></w:r>"#)
        );
        let texts = paragraph_texts("word/document.xml", &xml).unwrap();
        assert_eq!(texts, vec!["{{nombre_completo}}", "texto plano"]);
    }

    #[test]
    fn multiple_header_parts_visited() {
        use crate::pipeline::docx::DocxArchive;
        // Build a small archive through the docx test helper shape.
        let body = format!(
            "<w:document><w:body>{}</w:body></w:document>",
            para(r#"<w:r><w:t>{{nombre_completo}}</w:t></w:r>"#)
        );
        let header = format!(
            "<w:hdr>{}</w:hdr>",
            para(r#"<w:r><w:t>{{empresa_entidad}}</w:t></w:r>"#)
        );
        let bytes = crate::pipeline::docx::minimal_docx(&body, Some(&header));
        let mut archive = DocxArchive::from_bytes(&bytes).unwrap();
        let stats = substitute_document(
            &mut archive,
            &map(&[
                ("{{nombre_completo}}", "MARIO PEREZ"),
                ("{{empresa_entidad}}", "ACME S.A."),
            ]),
        )
        .unwrap();
        assert_eq!(stats.parts, 2);
        assert_eq!(stats.paragraphs_rewritten, 2);
        let header_out =
            String::from_utf8(archive.part("word/header1.xml").unwrap().to_vec()).unwrap();
        assert!(header_out.contains(">ACME S.A.</w:t>"));
    }
}
