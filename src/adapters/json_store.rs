//! Record store adapters: an in-memory store for tests and a single-file
//! JSON store for the CLI.

use crate::domain::model::{
    AddressId, EmailAddress, EmailMessage, Person, PersonId, Registration, SurveyResponse, Title,
};
use crate::domain::ports::RecordStore;
use crate::utils::error::{AdmError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    next_person_id: u64,
    next_address_id: u64,
    persons: Vec<Person>,
    titles: Vec<Title>,
    email_addresses: Vec<EmailAddress>,
    email_messages: Vec<EmailMessage>,
    survey_responses: Vec<SurveyResponse>,
    registrations: Vec<Registration>,
}

impl StoreData {
    fn insert_registrations(&mut self, registrations: Vec<Registration>) -> Result<()> {
        for incoming in &registrations {
            if self
                .registrations
                .iter()
                .any(|r| r.survey_id == incoming.survey_id)
            {
                return Err(AdmError::validation(format!(
                    "registration with survey id {:?} already exists",
                    incoming.survey_id
                )));
            }
        }
        self.registrations.extend(registrations);
        Ok(())
    }

    fn update_registration(&mut self, registration: Registration) -> Result<()> {
        match self
            .registrations
            .iter_mut()
            .find(|r| r.survey_id == registration.survey_id)
        {
            Some(slot) => {
                *slot = registration;
                Ok(())
            }
            None => Err(AdmError::validation(format!(
                "no registration with survey id {:?} to update",
                registration.survey_id
            ))),
        }
    }

    fn insert_person(&mut self, mut person: Person) -> PersonId {
        self.next_person_id += 1;
        person.id = self.next_person_id;
        self.persons.push(person);
        self.next_person_id
    }

    fn insert_email_address(&mut self, mut address: EmailAddress) -> AddressId {
        self.next_address_id += 1;
        address.id = self.next_address_id;
        self.email_addresses.push(address);
        self.next_address_id
    }
}

/// In-memory store, used by the test suite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn registrations(&self) -> Result<Vec<Registration>> {
        Ok(self.data.lock().await.registrations.clone())
    }

    async fn registrations_by_survey_ids(&self, ids: &[String]) -> Result<Vec<Registration>> {
        let data = self.data.lock().await;
        Ok(data
            .registrations
            .iter()
            .filter(|r| ids.contains(&r.survey_id))
            .cloned()
            .collect())
    }

    async fn insert_registrations(&self, registrations: Vec<Registration>) -> Result<()> {
        self.data.lock().await.insert_registrations(registrations)
    }

    async fn update_registration(&self, registration: Registration) -> Result<()> {
        self.data.lock().await.update_registration(registration)
    }

    async fn survey_responses(&self) -> Result<Vec<SurveyResponse>> {
        Ok(self.data.lock().await.survey_responses.clone())
    }

    async fn insert_survey_responses(&self, responses: Vec<SurveyResponse>) -> Result<()> {
        self.data.lock().await.survey_responses.extend(responses);
        Ok(())
    }

    async fn persons(&self) -> Result<Vec<Person>> {
        Ok(self.data.lock().await.persons.clone())
    }

    async fn insert_person(&self, person: Person) -> Result<PersonId> {
        Ok(self.data.lock().await.insert_person(person))
    }

    async fn titles(&self) -> Result<Vec<Title>> {
        Ok(self.data.lock().await.titles.clone())
    }

    async fn insert_title(&self, title: Title) -> Result<()> {
        self.data.lock().await.titles.push(title);
        Ok(())
    }

    async fn email_addresses(&self) -> Result<Vec<EmailAddress>> {
        Ok(self.data.lock().await.email_addresses.clone())
    }

    async fn insert_email_address(&self, address: EmailAddress) -> Result<AddressId> {
        Ok(self.data.lock().await.insert_email_address(address))
    }

    async fn insert_email_addresses(&self, addresses: Vec<EmailAddress>) -> Result<()> {
        let mut data = self.data.lock().await;
        for address in addresses {
            data.insert_email_address(address);
        }
        Ok(())
    }

    async fn email_messages(&self) -> Result<Vec<EmailMessage>> {
        Ok(self.data.lock().await.email_messages.clone())
    }

    async fn insert_email_message(&self, message: EmailMessage) -> Result<()> {
        self.data.lock().await.email_messages.push(message);
        Ok(())
    }
}

/// Whole-document JSON store. Every mutation rewrites the file; fine for a
/// single-operator tool with a few thousand records.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonStore {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    async fn save(&self, data: &StoreData) -> Result<()> {
        let json = serde_json::to_vec_pretty(data)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for JsonStore {
    async fn registrations(&self) -> Result<Vec<Registration>> {
        Ok(self.data.lock().await.registrations.clone())
    }

    async fn registrations_by_survey_ids(&self, ids: &[String]) -> Result<Vec<Registration>> {
        let data = self.data.lock().await;
        Ok(data
            .registrations
            .iter()
            .filter(|r| ids.contains(&r.survey_id))
            .cloned()
            .collect())
    }

    async fn insert_registrations(&self, registrations: Vec<Registration>) -> Result<()> {
        let mut data = self.data.lock().await;
        data.insert_registrations(registrations)?;
        self.save(&data).await
    }

    async fn update_registration(&self, registration: Registration) -> Result<()> {
        let mut data = self.data.lock().await;
        data.update_registration(registration)?;
        self.save(&data).await
    }

    async fn survey_responses(&self) -> Result<Vec<SurveyResponse>> {
        Ok(self.data.lock().await.survey_responses.clone())
    }

    async fn insert_survey_responses(&self, responses: Vec<SurveyResponse>) -> Result<()> {
        let mut data = self.data.lock().await;
        data.survey_responses.extend(responses);
        self.save(&data).await
    }

    async fn persons(&self) -> Result<Vec<Person>> {
        Ok(self.data.lock().await.persons.clone())
    }

    async fn insert_person(&self, person: Person) -> Result<PersonId> {
        let mut data = self.data.lock().await;
        let id = data.insert_person(person);
        self.save(&data).await?;
        Ok(id)
    }

    async fn titles(&self) -> Result<Vec<Title>> {
        Ok(self.data.lock().await.titles.clone())
    }

    async fn insert_title(&self, title: Title) -> Result<()> {
        let mut data = self.data.lock().await;
        data.titles.push(title);
        self.save(&data).await
    }

    async fn email_addresses(&self) -> Result<Vec<EmailAddress>> {
        Ok(self.data.lock().await.email_addresses.clone())
    }

    async fn insert_email_address(&self, address: EmailAddress) -> Result<AddressId> {
        let mut data = self.data.lock().await;
        let id = data.insert_email_address(address);
        self.save(&data).await?;
        Ok(id)
    }

    async fn insert_email_addresses(&self, addresses: Vec<EmailAddress>) -> Result<()> {
        let mut data = self.data.lock().await;
        for address in addresses {
            data.insert_email_address(address);
        }
        self.save(&data).await
    }

    async fn email_messages(&self) -> Result<Vec<EmailMessage>> {
        Ok(self.data.lock().await.email_messages.clone())
    }

    async fn insert_email_message(&self, message: EmailMessage) -> Result<()> {
        let mut data = self.data.lock().await;
        data.email_messages.push(message);
        self.save(&data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Show;
    use chrono::Utc;

    fn reg(survey_id: &str) -> Registration {
        Registration {
            person_id: None,
            time: Utc::now().fixed_offset(),
            survey_id: survey_id.to_string(),
            first_name: "Anders".to_string(),
            last_name: "And".to_string(),
            email: "anders@example.com".to_string(),
            dietary: String::new(),
            newsletter: false,
            transportation: false,
            show: Show::First,
            webshop_show: Show::First,
            note: String::new(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_rejects_duplicate_survey_id() {
        let store = MemoryStore::new();
        store.insert_registrations(vec![reg("1")]).await.unwrap();
        let err = store.insert_registrations(vec![reg("1")]).await.unwrap_err();
        assert!(matches!(err, AdmError::Validation { .. }));
        assert_eq!(store.registrations().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_memory_store_update_by_survey_id() {
        let store = MemoryStore::new();
        store.insert_registrations(vec![reg("1")]).await.unwrap();
        let mut updated = reg("1");
        updated.show = Show::Refund;
        store.update_registration(updated).await.unwrap();
        assert_eq!(
            store.registrations().await.unwrap()[0].show,
            Show::Refund
        );

        assert!(store.update_registration(reg("404")).await.is_err());
    }

    #[tokio::test]
    async fn test_memory_store_assigns_ids() {
        let store = MemoryStore::new();
        let person = Person {
            id: 0,
            name: "Anders".to_string(),
            street: String::new(),
            city: String::new(),
            country: String::new(),
            dead: false,
            note: String::new(),
            letter_bounce: false,
            created_time: Utc::now().fixed_offset(),
        };
        let first = store.insert_person(person.clone()).await.unwrap();
        let second = store.insert_person(person).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_json_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonStore::open(&path).await.unwrap();
        store.insert_registrations(vec![reg("1")]).await.unwrap();
        drop(store);

        let reopened = JsonStore::open(&path).await.unwrap();
        let registrations = reopened.registrations().await.unwrap();
        assert_eq!(registrations.len(), 1);
        assert_eq!(registrations[0].survey_id, "1");
    }

    #[tokio::test]
    async fn test_json_store_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join("fresh.json")).await.unwrap();
        assert!(store.registrations().await.unwrap().is_empty());
    }
}
