//! Removal of the header block (authors, abstract, journal info) that precedes
//! the body of papers and reports.

use lazy_static::lazy_static;

lazy_static! {
    static ref MARKERS: Vec<&'static str> = vec![
        "abstract", "özet", "summary",
        "introduction", "giriş",
        "author", "yazar", "authors", "yazarlar",
        "published", "yayınlanmış", "publication", "yayın",
        "journal", "dergi", "conference", "konferans",
        "university", "üniversite", "department", "bölüm",
        "doi", "issn", "isbn",
        "received", "alınan", "accepted", "kabul edilen",
        "keywords", "anahtar kelimeler",
    ];
}

pub fn is_metadata_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    MARKERS.iter().any(|m| lower.contains(m))
}

/// Drop leading metadata lines. Once a regular line has been kept, every
/// following non-blank line is kept too, markers or not. Lines are trimmed
/// and rejoined with `\n`; blank lines are dropped.
pub fn strip(raw: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut in_header = true;
    for line in raw.split(['\n', '\r']) {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if in_header && is_metadata_line(line) {
            continue;
        }
        in_header = false;
        kept.push(line);
    }
    kept.join("\n")
}
