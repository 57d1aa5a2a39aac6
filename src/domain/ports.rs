use crate::domain::model::{
    AddressId, EmailAddress, EmailMessage, Person, PersonId, Registration, SurveyResponse, Title,
};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Persistence port. Implementations assign person/address ids on insert and
/// enforce survey_id uniqueness among registrations.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn registrations(&self) -> Result<Vec<Registration>>;
    async fn registrations_by_survey_ids(&self, ids: &[String]) -> Result<Vec<Registration>>;
    async fn insert_registrations(&self, registrations: Vec<Registration>) -> Result<()>;
    /// Replaces the persisted registration with the same survey_id.
    async fn update_registration(&self, registration: Registration) -> Result<()>;

    async fn survey_responses(&self) -> Result<Vec<SurveyResponse>>;
    async fn insert_survey_responses(&self, responses: Vec<SurveyResponse>) -> Result<()>;

    async fn persons(&self) -> Result<Vec<Person>>;
    async fn insert_person(&self, person: Person) -> Result<PersonId>;

    async fn titles(&self) -> Result<Vec<Title>>;
    async fn insert_title(&self, title: Title) -> Result<()>;

    async fn email_addresses(&self) -> Result<Vec<EmailAddress>>;
    async fn insert_email_address(&self, address: EmailAddress) -> Result<AddressId>;
    async fn insert_email_addresses(&self, addresses: Vec<EmailAddress>) -> Result<()>;

    async fn email_messages(&self) -> Result<Vec<EmailMessage>>;
    async fn insert_email_message(&self, message: EmailMessage) -> Result<()>;
}

/// One import pipeline: parse the raw export, reconcile against the store,
/// persist. A run either fully succeeds or writes nothing.
#[async_trait]
pub trait Import: Send + Sync {
    async fn run(&self, input: &str) -> Result<ImportSummary>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
}
