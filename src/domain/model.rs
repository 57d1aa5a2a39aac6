use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type PersonId = u64;
pub type AddressId = u64;

/// A member of the association. Owns titles, email addresses, registrations
/// and survey responses; the latter two may stay unlinked until matched by
/// hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    /// Assigned by the record store on insert; 0 until then.
    pub id: PersonId,
    pub name: String,
    pub street: String,
    pub city: String,
    pub country: String,
    pub dead: bool,
    pub note: String,
    pub letter_bounce: bool,
    pub created_time: DateTime<FixedOffset>,
}

/// A (role, period) pair held by a person. `period` is the association year
/// the title was held; seniority is computed relative to the association's
/// current period. Canonical ordering is period descending, then role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Title {
    pub person_id: PersonId,
    pub title: String,
    pub period: i32,
}

pub fn sort_titles(titles: &mut [Title]) {
    titles.sort_by(|a, b| b.period.cmp(&a.period).then_with(|| a.title.cmp(&b.title)));
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Assigned by the record store on insert; 0 until then.
    pub id: AddressId,
    pub person_id: PersonId,
    pub address: String,
    /// Provenance tag: which import or synchronization pass produced the
    /// address ("j60adr", "Registration", "Survey").
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub address_id: AddressId,
    pub recipient: String,
    pub bounce: bool,
    pub created_time: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub person_id: Option<PersonId>,
    pub time: DateTime<FixedOffset>,
    pub name: String,
    /// Raw title notation string as entered by the respondent.
    pub title: String,
    pub email: String,
    pub newsletter: bool,
    pub note: String,
}

/// A webshop registration row. `survey_id` is the external key used for
/// reconciliation and is treated as an opaque string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub person_id: Option<PersonId>,
    pub time: DateTime<FixedOffset>,
    pub survey_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub dietary: String,
    pub newsletter: bool,
    pub transportation: bool,
    /// Actual attendance, including manual refunds.
    pub show: Show,
    /// The slot selected in the webshop at purchase time.
    pub webshop_show: Show,
    pub note: String,
}

/// Performance slot a registrant selected or was refunded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Show {
    First,
    Second,
    None,
    Refund,
}

impl Show {
    pub fn as_str(&self) -> &'static str {
        match self {
            Show::First => "Første",
            Show::Second => "Anden",
            Show::None => "Ingen",
            Show::Refund => "Refunderet",
        }
    }
}

impl fmt::Display for Show {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign lifecycle of one email address, derived from its message history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignState {
    New,
    Sent,
    Bounced,
}

impl fmt::Display for CampaignState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CampaignState::New => "new",
            CampaignState::Sent => "sent",
            CampaignState::Bounced => "bounced",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_titles_period_descending_then_role() {
        let mut titles = vec![
            Title { person_id: 1, title: "SEKR".into(), period: 2013 },
            Title { person_id: 1, title: "FORM".into(), period: 2014 },
            Title { person_id: 1, title: "CERM".into(), period: 2014 },
        ];
        sort_titles(&mut titles);
        let order: Vec<(&str, i32)> = titles.iter().map(|t| (t.title.as_str(), t.period)).collect();
        assert_eq!(order, vec![("CERM", 2014), ("FORM", 2014), ("SEKR", 2013)]);
    }

    #[test]
    fn test_show_display_values() {
        assert_eq!(Show::First.to_string(), "Første");
        assert_eq!(Show::Second.to_string(), "Anden");
        assert_eq!(Show::None.to_string(), "Ingen");
        assert_eq!(Show::Refund.to_string(), "Refunderet");
    }
}
