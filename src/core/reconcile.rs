//! Merges freshly parsed registrations against persisted ones.
//!
//! The webshop export is re-run repeatedly during the event, so re-import
//! must be safe: identity fields may never drift, the only permitted change
//! is a refund, and a batch with any conflict writes nothing at all.

use crate::domain::model::{Registration, Show};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub survey_id: String,
    pub field: &'static str,
    pub existing: String,
    pub incoming: String,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} changed from {:?} to {:?}",
            self.survey_id, self.field, self.existing, self.incoming
        )
    }
}

/// Staged writes for a conflict-free batch: creations first, then updates.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Plan {
    pub creations: Vec<Registration>,
    pub updates: Vec<Registration>,
}

fn append_note(existing: &str, incoming: &str) -> String {
    if incoming.is_empty() {
        existing.to_string()
    } else if existing.is_empty() {
        incoming.to_string()
    } else {
        format!("{existing}, {incoming}")
    }
}

/// Computes an all-or-nothing write plan. Every conflict in the batch is
/// collected before failing so the operator sees them all at once.
pub fn plan(
    incoming: Vec<Registration>,
    existing: &[Registration],
) -> Result<Plan, Vec<Conflict>> {
    let by_id: HashMap<&str, &Registration> = existing
        .iter()
        .map(|r| (r.survey_id.as_str(), r))
        .collect();

    let mut conflicts = Vec::new();
    let mut result = Plan::default();

    for inc in incoming {
        let old = match by_id.get(inc.survey_id.as_str()) {
            None => {
                result.creations.push(inc);
                continue;
            }
            Some(old) => *old,
        };

        let mut check = |field: &'static str, existing_value: String, incoming_value: String| {
            if existing_value != incoming_value {
                conflicts.push(Conflict {
                    survey_id: inc.survey_id.clone(),
                    field,
                    existing: existing_value,
                    incoming: incoming_value,
                });
            }
        };
        check("first_name", old.first_name.clone(), inc.first_name.clone());
        check("last_name", old.last_name.clone(), inc.last_name.clone());
        check("email", old.email.clone(), inc.email.clone());
        check("dietary", old.dietary.clone(), inc.dietary.clone());
        check(
            "newsletter",
            old.newsletter.to_string(),
            inc.newsletter.to_string(),
        );
        check(
            "transportation",
            old.transportation.to_string(),
            inc.transportation.to_string(),
        );
        check(
            "webshop_show",
            old.webshop_show.to_string(),
            inc.webshop_show.to_string(),
        );

        if inc.show != old.show {
            if inc.show == Show::Refund {
                // Keep the persisted record (it may have been linked to a
                // person by hand) and only record the refund.
                let mut updated = old.clone();
                updated.show = Show::Refund;
                updated.note = append_note(&old.note, &inc.note);
                result.updates.push(updated);
            } else {
                conflicts.push(Conflict {
                    survey_id: inc.survey_id.clone(),
                    field: "show",
                    existing: old.show.to_string(),
                    incoming: inc.show.to_string(),
                });
            }
        }
    }

    if conflicts.is_empty() {
        Ok(result)
    } else {
        Err(conflicts)
    }
}
