//! Expected header rows for each import section type.
//!
//! Every section declares its exact header up front; validation fails fast
//! with the observed and expected columns before any row is interpreted, so a
//! malformed file never partially imports.

use crate::domain::model::Show;
use crate::utils::error::{AdmError, Result};

/// Webshop registration header. Column 11 is genuinely unnamed in the export.
pub const WEBSHOP_HEADER: [&str; 16] = [
    "ID",
    "Fornavn",
    "Efternavn",
    "Adresse",
    "Postnr/by",
    "Email",
    "Ansættelsessted",
    "Stilling",
    "Tilmeldingsdato",
    "Antal",
    "Stykpris",
    "",
    "Rabat",
    "Betalt",
    "Markedsføring",
    "Note",
];

pub const SURVEY_HEADER: [&str; 5] = [
    "Timestamp",
    "Navn",
    "Titel og årgang",
    "Email",
    "Vil du modtage vores nyhedsbrev?",
];

pub const ADDRESS_HEADER: [&str; 10] = [
    "Navn",
    "Titel (nyeste)",
    "Grad",
    "Email",
    "Gade",
    "By",
    "Land",
    "Afdød",
    "Modtager",
    "Bounce?",
];

/// Attendance sections keyed by the exact prompt the webshop uses as the
/// arrangement title.
pub fn attendance_show(section_title: &str) -> Option<Show> {
    match section_title {
        "Jeg kan desværre ikke komme til revyen" => Some(Show::None),
        "Revyforestillingen kl. 13.30" => Some(Show::First),
        "Revyforestillingen kl. 16.00" => Some(Show::Second),
        _ => None,
    }
}

/// Row layout of an attendance section: either the plain 16-column webshop
/// header, or a legacy variant with three free-text survey columns (dietary,
/// transport, newsletter prompts) inserted before `Note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceLayout {
    Plain,
    Extended,
}

pub fn validate_exact(expected: &[&str], actual: &[String]) -> Result<()> {
    if actual.len() != expected.len() || !expected.iter().zip(actual).all(|(e, a)| *e == a.as_str()) {
        return Err(AdmError::format(expected.join(";"), actual.join(";")));
    }
    Ok(())
}

/// Validates that `expected` is a prefix of the observed header. The survey
/// tool appends extra columns over time; those are tolerated and ignored.
pub fn validate_prefix(expected: &[&str], actual: &[String]) -> Result<()> {
    if actual.len() < expected.len() || !expected.iter().zip(actual).all(|(e, a)| *e == a.as_str()) {
        return Err(AdmError::format(
            format!("header starting with {}", expected.join("\t")),
            actual.join("\t"),
        ));
    }
    Ok(())
}

pub fn validate_attendance_header(actual: &[String]) -> Result<AttendanceLayout> {
    let fixed = &WEBSHOP_HEADER[..15];
    let fixed_ok = actual.len() >= 15 && fixed.iter().zip(actual).all(|(e, a)| *e == a.as_str());
    if fixed_ok && actual.len() == 16 && actual[15] == "Note" {
        return Ok(AttendanceLayout::Plain);
    }
    if fixed_ok && actual.len() == 19 && actual[18] == "Note" {
        return Ok(AttendanceLayout::Extended);
    }
    Err(AdmError::format(
        format!(
            "{};[three survey columns;]Note",
            WEBSHOP_HEADER[..15].join(";")
        ),
        actual.join(";"),
    ))
}
