//! Keyword-anchored lookups over invoice lines and table rows.
//!
//! Labels match case- and accent-insensitively, and any whitespace inside a
//! label matches a run of whitespace in the text, so `TOTAL A PAGAR` also
//! finds `Total   a  Pagar` in layout-preserved output.

use std::ops::Range;

use super::money::normalize_amount;
use super::patterns::{COLUMN_GAP, IDENTIFIER, NUMBER_PREFIX};
use crate::pdf::PageTable;

/// Fold one character to its uppercase, accent-free form.
pub fn fold_char(c: char) -> char {
    let upper = c.to_uppercase().next().unwrap_or(c);
    match upper {
        'Á' | 'À' | 'Ä' | 'Â' => 'A',
        'É' | 'È' | 'Ë' | 'Ê' => 'E',
        'Í' | 'Ì' | 'Ï' | 'Î' => 'I',
        'Ó' | 'Ò' | 'Ö' | 'Ô' => 'O',
        'Ú' | 'Ù' | 'Ü' | 'Û' => 'U',
        'Ñ' => 'N',
        other => other,
    }
}

/// Fold a whole string; see [`fold_char`].
pub fn fold(s: &str) -> String {
    s.chars().map(fold_char).collect()
}

/// Byte range of the first occurrence of `label` in `haystack`.
pub fn find_label(haystack: &str, label: &str) -> Option<Range<usize>> {
    let needle: Vec<char> = label.trim().chars().map(fold_char).collect();
    if needle.is_empty() {
        return None;
    }

    let hay: Vec<(usize, char)> = haystack
        .char_indices()
        .map(|(i, c)| (i, fold_char(c)))
        .collect();

    (0..hay.len()).find_map(|start| {
        let end = match_at(&hay, start, &needle)?;
        let end_byte = hay.get(end).map(|(i, _)| *i).unwrap_or(haystack.len());
        Some(hay[start].0..end_byte)
    })
}

fn match_at(hay: &[(usize, char)], start: usize, needle: &[char]) -> Option<usize> {
    let mut h = start;
    let mut n = 0;

    while n < needle.len() {
        if needle[n].is_whitespace() {
            while n < needle.len() && needle[n].is_whitespace() {
                n += 1;
            }
            let gap_start = h;
            while h < hay.len() && hay[h].1.is_whitespace() {
                h += 1;
            }
            if h == gap_start {
                return None;
            }
        } else {
            if h >= hay.len() || hay[h].1 != needle[n] {
                return None;
            }
            h += 1;
            n += 1;
        }
    }

    Some(h)
}

/// Whether `haystack` contains `label`.
pub fn contains_label(haystack: &str, label: &str) -> bool {
    find_label(haystack, label).is_some()
}

/// Cut a value at the first column gap (two or more spaces).
pub fn first_column(s: &str) -> &str {
    let s = s.trim();
    match COLUMN_GAP.find(s) {
        Some(gap) => &s[..gap.start()],
        None => s,
    }
}

/// Strip separators and padding that sit between a label and its value.
fn strip_lead(s: &str) -> &str {
    s.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '.' | '…' | '-' | '='))
}

fn text_after(line: &str, range: &Range<usize>) -> String {
    first_column(strip_lead(&line[range.end..])).to_string()
}

/// Text following the label on the same line.
pub fn same_line(lines: &[&str], labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        lines.iter().find_map(|line| {
            let range = find_label(line, label)?;
            Some(text_after(line, &range)).filter(|v| !v.is_empty())
        })
    })
}

/// Amount following the label on the same line, after a `$` when one is present.
pub fn same_line_amount(lines: &[&str], labels: &[&str]) -> Option<f64> {
    labels.iter().find_map(|label| {
        lines.iter().find_map(|line| {
            let range = find_label(line, label)?;
            let rest = &line[range.end..];
            let rest = match rest.find('$') {
                Some(i) => &rest[i + 1..],
                None => rest,
            };
            Some(normalize_amount(first_column(strip_lead(rest)))).filter(|v| *v > 0.0)
        })
    })
}

fn next_non_empty<'a>(lines: &[&'a str], after: usize) -> Option<&'a str> {
    lines[after + 1..].iter().copied().find(|l| !l.trim().is_empty())
}

/// First non-empty line after the label line.
pub fn next_line(lines: &[&str], labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        lines.iter().enumerate().find_map(|(i, line)| {
            find_label(line, label)?;
            next_non_empty(lines, i)
                .map(|next| first_column(next).to_string())
                .filter(|v| !v.is_empty())
        })
    })
}

/// Column-aligned text on the next non-empty line, starting under the label.
///
/// Falls back to [`next_line`] when nothing sits under the label.
pub fn below_label(lines: &[&str], labels: &[&str]) -> Option<String> {
    let aligned = labels.iter().find_map(|label| {
        lines.iter().enumerate().find_map(|(i, line)| {
            let range = find_label(line, label)?;
            let column = line[..range.start].chars().count();
            let next = next_non_empty(lines, i)?;
            let value = slice_from_column(next, column);
            Some(first_column(value).to_string()).filter(|v| !v.is_empty())
        })
    });

    aligned.or_else(|| next_line(lines, labels))
}

/// Slice of `line` from `column` (in chars), backed up to the start of a word.
fn slice_from_column(line: &str, column: usize) -> &str {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    if column >= chars.len() {
        return "";
    }

    let mut idx = column;
    while idx > 0 && !chars[idx - 1].1.is_whitespace() {
        idx -= 1;
    }
    &line[chars[idx].0..]
}

/// Last non-empty cell of the first table row mentioning the label.
pub fn table_cell(tables: &[&PageTable], labels: &[&str]) -> Option<String> {
    labels.iter().find_map(|label| {
        tables.iter().flat_map(|t| t.rows()).find_map(|row| {
            let joined = row
                .iter()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            find_label(&joined, label)?;

            row.iter()
                .rev()
                .flatten()
                .map(|cell| cell.trim())
                .find(|cell| !cell.is_empty() && !contains_label(cell, label))
                .map(str::to_string)
        })
    })
}

/// Scan the label line right-to-left for the first amount above `min`.
pub fn horizontal_amount(lines: &[&str], labels: &[&str], min: f64) -> Option<f64> {
    labels.iter().find_map(|label| {
        lines.iter().find_map(|line| {
            find_label(line, label)?;
            line.split_whitespace()
                .rev()
                .map(normalize_amount)
                .find(|amount| *amount > min)
        })
    })
}

/// Reduce a raw invoice-number candidate to its identifier token.
pub fn clean_identifier(raw: &str) -> Option<String> {
    let stripped = NUMBER_PREFIX.replace(raw.trim(), "");
    IDENTIFIER
        .captures(&stripped)
        .map(|caps| caps[1].split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Reduce a policy-number candidate to its digits.
pub fn digits_only(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    (!digits.is_empty()).then_some(digits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_label_accents_and_case() {
        assert!(contains_label("Número de PÓLIZA: 123", "poliza"));
        assert!(contains_label("SEÑOR(A)", "SENOR(A)"));
        assert!(contains_label("Total   a  Pagar", "TOTAL A PAGAR"));
        assert!(!contains_label("TOTALAPAGAR", "TOTAL A PAGAR"));
    }

    #[test]
    fn test_find_label_byte_range_with_multibyte_text() {
        let line = "Fecha de expedición: 24-Abr-23";
        let range = find_label(line, "FECHA DE EXPEDICION").unwrap();
        assert_eq!(&line[range.end..], ": 24-Abr-23");
    }

    #[test]
    fn test_same_line() {
        let lines = ["NOMBRE DEL CLIENTE: JUAN PEREZ      DIRECCION CL 10"];
        assert_eq!(
            same_line(&lines, &["NOMBRE DEL CLIENTE:"]),
            Some("JUAN PEREZ".to_string())
        );
    }

    #[test]
    fn test_same_line_skips_empty_remainders() {
        let lines = ["PAGUE HASTA", "PAGUE HASTA: 24/04/2023"];
        assert_eq!(
            same_line(&lines, &["PAGUE HASTA"]),
            Some("24/04/2023".to_string())
        );
    }

    #[test]
    fn test_same_line_amount_splits_on_currency() {
        let lines = ["TOTAL FACTURA A PAGAR $ 125.000     PAGUE HASTA 24-Abr-23"];
        assert_eq!(
            same_line_amount(&lines, &["TOTAL FACTURA A PAGAR"]),
            Some(125000.0)
        );
    }

    #[test]
    fn test_next_line() {
        let lines = ["SEÑOR(A)", "", "   MARIA GOMEZ          CR 5 # 10-20"];
        assert_eq!(
            next_line(&lines, &["SEÑOR(A)"]),
            Some("MARIA GOMEZ".to_string())
        );
    }

    #[test]
    fn test_below_label_uses_column() {
        let lines = [
            "FACTURA DE SERVICIOS No.        PERIODO FACTURADO      PAGUE HASTA",
            "4455102                         MARZO 2019             15/04/2019",
        ];
        assert_eq!(
            below_label(&lines, &["PERIODO FACTURADO"]),
            Some("MARZO 2019".to_string())
        );
        assert_eq!(
            below_label(&lines, &["PAGUE HASTA"]),
            Some("15/04/2019".to_string())
        );
    }

    #[test]
    fn test_table_cell_takes_last_cell() {
        let table = PageTable::new(vec![
            vec![Some("CONCEPTO".to_string()), Some("VALOR".to_string())],
            vec![
                Some("TOTAL FACTURA A PAGAR".to_string()),
                None,
                Some("$ 98.700".to_string()),
            ],
        ]);
        assert_eq!(
            table_cell(&[&table], &["TOTAL FACTURA A PAGAR"]),
            Some("$ 98.700".to_string())
        );
    }

    #[test]
    fn test_horizontal_amount_skips_small_tokens() {
        let lines = ["Total a Pagar .......... $ 450.000   1"];
        assert_eq!(
            horizontal_amount(&lines, &["TOTAL A PAGAR"], 100.0),
            Some(450000.0)
        );
    }

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("No. FE 123456"), Some("FE 123456".to_string()));
        assert_eq!(clean_identifier(": 884512  "), Some("884512".to_string()));
        assert_eq!(clean_identifier("sin numero"), None);
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("12-345-67"), Some("1234567".to_string()));
        assert_eq!(digits_only("--"), None);
    }
}
