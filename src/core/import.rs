//! The three import pipelines: webshop registrations, survey responses and
//! the address-book export. Each run either fully succeeds or writes nothing.

use crate::config::AssociationConfig;
use crate::core::builders::{
    apply_attendance, build_address_row, build_registration, build_survey_response,
};
use crate::core::reconcile;
use crate::core::schema::{
    attendance_show, validate_attendance_header, validate_exact, validate_prefix, ADDRESS_HEADER,
    SURVEY_HEADER, WEBSHOP_HEADER,
};
use crate::core::sections::{extract_sections, SECTION_MARKER};
use crate::domain::model::{EmailAddress, EmailMessage, Registration, Title};
use crate::domain::notation;
use crate::domain::ports::{Import, ImportSummary, RecordStore};
use crate::utils::error::{AdmError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;

fn read_rows(input: &str, delimiter: u8) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(input.as_bytes());
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub struct RegistrationImport<'a, S: RecordStore> {
    store: &'a S,
    config: AssociationConfig,
}

impl<'a, S: RecordStore> RegistrationImport<'a, S> {
    pub fn new(store: &'a S, config: AssociationConfig) -> Self {
        Self { store, config }
    }

    /// Parses the sectioned webshop export into one registration per main
    /// row, with show assignments merged in from the attendance sections.
    fn parse(&self, input: &str) -> Result<Vec<Registration>> {
        let tz = self.config.timezone();
        let sections = extract_sections(input)?;

        let main = match sections.first() {
            Some(section) if section.title == self.config.event_name => section,
            Some(section) => {
                return Err(AdmError::format(
                    format!("{SECTION_MARKER};{};", self.config.event_name),
                    format!("{SECTION_MARKER};{};", section.title),
                ))
            }
            None => {
                return Err(AdmError::format(
                    format!("{SECTION_MARKER};{};", self.config.event_name),
                    "empty input".to_string(),
                ))
            }
        };
        let (header, content) = match main.rows.split_first() {
            Some(split) => split,
            None => {
                return Err(AdmError::format(
                    WEBSHOP_HEADER.join(";"),
                    "empty registration section".to_string(),
                ))
            }
        };
        validate_exact(&WEBSHOP_HEADER, header)?;

        let mut registrations = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for row in content {
            let registration = build_registration(row, tz)?;
            if index
                .insert(registration.survey_id.clone(), registrations.len())
                .is_some()
            {
                return Err(AdmError::validation(format!(
                    "duplicate survey id {:?} in import batch",
                    registration.survey_id
                )));
            }
            registrations.push(registration);
        }

        for section in &sections[1..] {
            let show = attendance_show(&section.title).ok_or_else(|| {
                AdmError::format(
                    "one of the known attendance section titles".to_string(),
                    section.title.clone(),
                )
            })?;
            let (header, content) = match section.rows.split_first() {
                Some(split) => split,
                None => continue,
            };
            let layout = validate_attendance_header(header)?;
            for row in content {
                let survey_id = row.first().map(|s| s.trim()).unwrap_or_default();
                let position = index.get(survey_id).ok_or_else(|| {
                    AdmError::validation(format!(
                        "attendance row for unknown survey id {survey_id:?}"
                    ))
                })?;
                apply_attendance(&mut registrations[*position], show, row, layout)?;
            }
        }

        Ok(registrations)
    }
}

#[async_trait]
impl<'a, S: RecordStore> Import for RegistrationImport<'a, S> {
    async fn run(&self, input: &str) -> Result<ImportSummary> {
        let incoming = self.parse(input)?;
        let ids: Vec<String> = incoming.iter().map(|r| r.survey_id.clone()).collect();
        let existing = self.store.registrations_by_survey_ids(&ids).await?;

        let plan = reconcile::plan(incoming, &existing).map_err(|conflicts| {
            AdmError::Reconciliation {
                conflicts: conflicts.iter().map(ToString::to_string).collect(),
            }
        })?;

        let summary = ImportSummary {
            created: plan.creations.len(),
            updated: plan.updates.len(),
        };
        self.store.insert_registrations(plan.creations).await?;
        for update in plan.updates {
            self.store.update_registration(update).await?;
        }
        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            "registration import committed"
        );
        Ok(summary)
    }
}

pub struct SurveyResponseImport<'a, S: RecordStore> {
    store: &'a S,
    config: AssociationConfig,
}

impl<'a, S: RecordStore> SurveyResponseImport<'a, S> {
    pub fn new(store: &'a S, config: AssociationConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl<'a, S: RecordStore> Import for SurveyResponseImport<'a, S> {
    async fn run(&self, input: &str) -> Result<ImportSummary> {
        let tz = self.config.timezone();
        let rows = read_rows(input, b'\t')?;
        let (header, content) = match rows.split_first() {
            Some(split) => split,
            None => {
                return Err(AdmError::format(
                    SURVEY_HEADER.join("\t"),
                    "empty input".to_string(),
                ))
            }
        };
        validate_prefix(&SURVEY_HEADER, header)?;

        let mut responses = Vec::new();
        for row in content {
            let response = build_survey_response(row, tz)?;
            if !response.title.is_empty() {
                if let Err(err) = notation::parse(&response.title, self.config.current_period) {
                    tracing::debug!(name = %response.name, "title notation not recognized: {}", err);
                }
            }
            responses.push(response);
        }

        let summary = ImportSummary {
            created: responses.len(),
            updated: 0,
        };
        self.store.insert_survey_responses(responses).await?;
        tracing::info!(created = summary.created, "survey response import committed");
        Ok(summary)
    }
}

pub struct AddressBookImport<'a, S: RecordStore> {
    store: &'a S,
    config: AssociationConfig,
}

impl<'a, S: RecordStore> AddressBookImport<'a, S> {
    pub fn new(store: &'a S, config: AssociationConfig) -> Self {
        Self { store, config }
    }
}

#[async_trait]
impl<'a, S: RecordStore> Import for AddressBookImport<'a, S> {
    async fn run(&self, input: &str) -> Result<ImportSummary> {
        let rows = read_rows(input, b'\t')?;
        let (header, content) = match rows.split_first() {
            Some(split) => split,
            None => {
                return Err(AdmError::format(
                    ADDRESS_HEADER.join("\t"),
                    "empty input".to_string(),
                ))
            }
        };
        validate_prefix(&ADDRESS_HEADER, header)?;

        // Parse the whole file before touching the store so a bad row cannot
        // leave a half-imported address book behind.
        let mut bundles = Vec::new();
        for row in content {
            bundles.push(build_address_row(row, self.config.current_period)?);
        }

        let mut summary = ImportSummary::default();
        for bundle in bundles {
            let person_id = self.store.insert_person(bundle.person).await?;
            summary.created += 1;
            if let Some((title, period)) = bundle.title {
                self.store
                    .insert_title(Title {
                        person_id,
                        title,
                        period,
                    })
                    .await?;
            }
            if let Some(email) = bundle.email {
                let address_id = self
                    .store
                    .insert_email_address(EmailAddress {
                        id: 0,
                        person_id,
                        address: email.clone(),
                        source: "j60adr".to_string(),
                    })
                    .await?;
                // The address book reflects an earlier mailing, so every
                // address arrives with one message carrying its bounce flag.
                self.store
                    .insert_email_message(EmailMessage {
                        address_id,
                        recipient: email,
                        bounce: bundle.bounce,
                        created_time: Utc::now().fixed_offset(),
                    })
                    .await?;
            }
        }
        tracing::info!(created = summary.created, "address book import committed");
        Ok(summary)
    }
}
