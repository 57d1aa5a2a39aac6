//! Email address synchronization and campaign-state rollup.

use crate::domain::model::{
    CampaignState, EmailAddress, EmailMessage, Person, PersonId, Registration, SurveyResponse,
};
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use std::collections::{HashMap, HashSet};

/// Address comparison key: trimmed, ASCII-lowercased.
pub fn normalize(address: &str) -> String {
    address.trim().to_ascii_lowercase()
}

/// Stages the email addresses missing from each person's address list, taking
/// them from linked registrations first, then survey responses. Idempotent:
/// an address already known under normalization is never staged again.
pub fn plan_addresses(
    persons: &[Person],
    addresses: &[EmailAddress],
    registrations: &[Registration],
    responses: &[SurveyResponse],
) -> Vec<EmailAddress> {
    let mut known: HashMap<PersonId, HashSet<String>> = HashMap::new();
    for a in addresses {
        known.entry(a.person_id).or_default().insert(normalize(&a.address));
    }

    let mut create = Vec::new();
    let mut stage = |person_id: PersonId, email: &str, source: &str| {
        let email = email.trim();
        if email.is_empty() {
            return;
        }
        let set = known.entry(person_id).or_default();
        if set.insert(normalize(email)) {
            create.push(EmailAddress {
                id: 0,
                person_id,
                address: email.to_string(),
                source: source.to_string(),
            });
        }
    };

    for person in persons {
        for r in registrations.iter().filter(|r| r.person_id == Some(person.id)) {
            stage(person.id, &r.email, "Registration");
        }
        for r in responses.iter().filter(|r| r.person_id == Some(person.id)) {
            stage(person.id, &r.email, "Survey");
        }
    }
    create
}

/// Computes and persists the missing addresses in one pass. Returns the
/// number of addresses created.
pub async fn synchronize_addresses<S: RecordStore>(store: &S) -> Result<usize> {
    let persons = store.persons().await?;
    let addresses = store.email_addresses().await?;
    let registrations = store.registrations().await?;
    let responses = store.survey_responses().await?;

    let create = plan_addresses(&persons, &addresses, &registrations, &responses);
    let count = create.len();
    tracing::info!(created = count, "address synchronization staged");
    store.insert_email_addresses(create).await?;
    Ok(count)
}

/// Campaign state of one address given its message history.
pub fn campaign_state(messages: &[&EmailMessage]) -> CampaignState {
    if messages.iter().any(|m| m.bounce) {
        CampaignState::Bounced
    } else if messages.is_empty() {
        CampaignState::New
    } else {
        CampaignState::Sent
    }
}

/// Denormalized per-address campaign row, computed once instead of walking
/// relations per address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressState {
    pub person_id: PersonId,
    pub person_name: String,
    pub address: String,
    pub state: CampaignState,
}

pub async fn campaign_overview<S: RecordStore>(store: &S) -> Result<Vec<AddressState>> {
    let persons = store.persons().await?;
    let addresses = store.email_addresses().await?;
    let messages = store.email_messages().await?;

    let names: HashMap<PersonId, &str> =
        persons.iter().map(|p| (p.id, p.name.as_str())).collect();
    let mut by_address: HashMap<u64, Vec<&EmailMessage>> = HashMap::new();
    for m in &messages {
        by_address.entry(m.address_id).or_default().push(m);
    }

    let mut rows: Vec<AddressState> = addresses
        .iter()
        .map(|a| AddressState {
            person_id: a.person_id,
            person_name: names.get(&a.person_id).unwrap_or(&"").to_string(),
            address: a.address.clone(),
            state: campaign_state(by_address.get(&a.id).map_or(&[][..], Vec::as_slice)),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.person_name
            .cmp(&b.person_name)
            .then_with(|| a.address.cmp(&b.address))
    });
    Ok(rows)
}
