//! Splits a semicolon-delimited export into named sections.
//!
//! A section starts with a 3-cell header row `Arrangement:;<title>;`,
//! optionally followed by blank rows, then content rows until the next
//! blank-row run or end of input. A header row may also follow content
//! directly, as the webshop emits empty sections back to back.

use crate::utils::error::{AdmError, Result};

pub const SECTION_MARKER: &str = "Arrangement:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub rows: Vec<Vec<String>>,
}

fn is_blank(cells: &[String]) -> bool {
    cells.iter().all(|c| c.trim().is_empty())
}

pub fn extract_sections(input: &str) -> Result<Vec<Section>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());

    let mut sections: Vec<Section> = Vec::new();
    // The next non-blank row must open a section: true at start of input and
    // after a blank run that terminated a content block.
    let mut expect_boundary = true;
    let mut seen_content = false;
    // Line on which the next record starts when nothing separates it from the
    // previous one. The reader silently skips fully empty lines, so a jump in
    // the record's line number is the trace of a blank run.
    let mut next_line = 1u64;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(next_line, |p| p.line());
        if line > next_line && seen_content {
            expect_boundary = true;
        }
        // A quoted cell may span lines; account for them all.
        let embedded: u64 = record.iter().map(|f| f.matches('\n').count() as u64).sum();
        next_line = line + 1 + embedded;

        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        if is_blank(&cells) {
            if seen_content {
                expect_boundary = true;
            }
            continue;
        }

        if cells.first().map(String::as_str) == Some(SECTION_MARKER) {
            if cells.len() != 3 || !cells[2].is_empty() {
                return Err(AdmError::format(
                    format!("{SECTION_MARKER};<title>;"),
                    cells.join(";"),
                ));
            }
            sections.push(Section {
                title: cells[1].clone(),
                rows: Vec::new(),
            });
            expect_boundary = false;
            seen_content = false;
            continue;
        }

        if expect_boundary {
            return Err(AdmError::format(
                format!("section header row starting with {SECTION_MARKER:?}"),
                cells.join(";"),
            ));
        }

        seen_content = true;
        match sections.last_mut() {
            Some(section) => section.rows.push(cells),
            None => unreachable!("expect_boundary is false only after a header"),
        }
    }

    Ok(sections)
}
