//! Converts validated rows into domain records.

use crate::core::schema::AttendanceLayout;
use crate::domain::model::{Person, Registration, Show, SurveyResponse};
use crate::utils::error::{AdmError, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

/// Paid-column token marking a refunded webshop order.
const REFUNDED: &str = "Refunderet";

/// Danish yes-token. Survey prompts answer with phrases like
/// "Ja tak, det vil jeg gerne", so a prefix match is required.
pub fn is_yes(cell: &str) -> bool {
    let t = cell.trim();
    t.starts_with("Ja") || t.starts_with("ja")
}

/// Webshop timestamps are `-`-separated, `D-M-YYYY H:MM` with optional
/// seconds, in the association's local time zone.
pub fn parse_webshop_time(cell: &str, tz: FixedOffset) -> Result<DateTime<FixedOffset>> {
    let t = cell.trim();
    let naive = NaiveDateTime::parse_from_str(t, "%d-%m-%Y %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(t, "%d-%m-%Y %H:%M"))
        .map_err(|_| AdmError::validation(format!("unparseable registration timestamp {cell:?}")))?;
    tz.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| AdmError::validation(format!("ambiguous local timestamp {cell:?}")))
}

/// Survey-tool timestamps are `M/D/YYYY H:MM:SS`.
pub fn parse_survey_time(cell: &str, tz: FixedOffset) -> Result<DateTime<FixedOffset>> {
    static STAMP: OnceLock<Regex> = OnceLock::new();
    let re = STAMP
        .get_or_init(|| Regex::new(r"^(\d+)/(\d+)/(\d+) (\d+):(\d+):(\d+)$").unwrap());
    let caps = re
        .captures(cell.trim())
        .ok_or_else(|| AdmError::validation(format!("unparseable survey timestamp {cell:?}")))?;
    let out_of_range = || AdmError::validation(format!("survey timestamp out of range {cell:?}"));
    let year: i32 = caps[3].parse().map_err(|_| out_of_range())?;
    let month: u32 = caps[1].parse().map_err(|_| out_of_range())?;
    let day: u32 = caps[2].parse().map_err(|_| out_of_range())?;
    let hour: u32 = caps[4].parse().map_err(|_| out_of_range())?;
    let minute: u32 = caps[5].parse().map_err(|_| out_of_range())?;
    let second: u32 = caps[6].parse().map_err(|_| out_of_range())?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(out_of_range)?;
    tz.from_local_datetime(&naive)
        .single()
        .ok_or_else(|| AdmError::validation(format!("ambiguous local timestamp {cell:?}")))
}

fn cell(row: &[String], index: usize) -> String {
    row.get(index).map(|s| s.trim().to_string()).unwrap_or_default()
}

/// Builds a registration from a 16-column main-section row. The attendance
/// sections later assign shows and the extended survey fields.
pub fn build_registration(row: &[String], tz: FixedOffset) -> Result<Registration> {
    if row.len() < 16 {
        return Err(AdmError::validation(format!(
            "registration row has {} columns, expected 16",
            row.len()
        )));
    }
    let survey_id = cell(row, 0);
    if survey_id.is_empty() {
        return Err(AdmError::validation("registration row with empty ID"));
    }
    let show = if cell(row, 13) == REFUNDED {
        Show::Refund
    } else {
        Show::None
    };
    Ok(Registration {
        person_id: None,
        time: parse_webshop_time(&row[8], tz)?,
        survey_id,
        first_name: cell(row, 1),
        last_name: cell(row, 2),
        email: cell(row, 5),
        dietary: String::new(),
        newsletter: is_yes(&row[14]),
        transportation: false,
        show,
        webshop_show: Show::None,
        note: cell(row, 15),
    })
}

/// Applies an attendance-section row to the registration with the same
/// survey_id. The section determines the show; the extended layout also
/// carries dietary, transport and newsletter answers.
pub fn apply_attendance(
    registration: &mut Registration,
    show: Show,
    row: &[String],
    layout: AttendanceLayout,
) -> Result<()> {
    let required = match layout {
        AttendanceLayout::Plain => 16,
        AttendanceLayout::Extended => 19,
    };
    if row.len() < required {
        return Err(AdmError::validation(format!(
            "attendance row has {} columns, expected {}",
            row.len(),
            required
        )));
    }

    registration.webshop_show = show;
    // A refund recorded in the main section survives the attendance pass.
    if registration.show != Show::Refund {
        registration.show = show;
    }

    if layout == AttendanceLayout::Extended {
        registration.dietary = cell(row, 15);
        registration.transportation = is_yes(&row[16]);
        registration.newsletter = registration.newsletter || is_yes(&row[17]);
    }

    let note_index = match layout {
        AttendanceLayout::Plain => 15,
        AttendanceLayout::Extended => 18,
    };
    let note = cell(row, note_index);
    if registration.note.is_empty() && !note.is_empty() {
        registration.note = note;
    }
    Ok(())
}

/// Builds a survey response from a tab-separated row. The trailing note
/// column is optional in older exports.
pub fn build_survey_response(row: &[String], tz: FixedOffset) -> Result<SurveyResponse> {
    if row.len() < 5 {
        return Err(AdmError::validation(format!(
            "survey response row has {} columns, expected 5",
            row.len()
        )));
    }
    Ok(SurveyResponse {
        person_id: None,
        time: parse_survey_time(&row[0], tz)?,
        name: cell(row, 1),
        title: cell(row, 2),
        email: cell(row, 3),
        newsletter: is_yes(&row[4]),
        note: cell(row, 5),
    })
}

/// One address-book row expanded into a person and its satellites. The title
/// and email records are created by the importer once the person id exists.
#[derive(Debug, Clone)]
pub struct PersonBundle {
    pub person: Person,
    /// (role, period) when the person holds a title.
    pub title: Option<(String, i32)>,
    pub email: Option<String>,
    pub bounce: bool,
}

/// Builds a person bundle from a 10-column address-book row. The `Grad`
/// column is an age offset; the absolute period is recovered by subtracting
/// it from the association's current period.
pub fn build_address_row(row: &[String], current_period: i32) -> Result<PersonBundle> {
    if row.len() < 10 {
        return Err(AdmError::validation(format!(
            "address row has {} columns, expected 10",
            row.len()
        )));
    }
    let name = cell(row, 0);
    if name.is_empty() {
        return Err(AdmError::validation("address row with empty name"));
    }

    let title = cell(row, 1);
    let title = if title.is_empty() {
        None
    } else {
        let age: i32 = cell(row, 2).parse().map_err(|_| {
            AdmError::validation(format!("unparseable title age {:?} for {name}", row[2]))
        })?;
        Some((title, current_period - age))
    };

    let email = cell(row, 3);
    let person = Person {
        id: 0,
        name,
        street: cell(row, 4),
        city: cell(row, 5),
        country: cell(row, 6),
        dead: is_yes(&row[7]),
        note: String::new(),
        letter_bounce: false,
        created_time: Utc::now().fixed_offset(),
    };
    Ok(PersonBundle {
        person,
        title,
        email: if email.is_empty() { None } else { Some(email) },
        bounce: !cell(row, 9).is_empty(),
    })
}
