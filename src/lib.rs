pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::json_store::{JsonStore, MemoryStore};
pub use config::AssociationConfig;
pub use crate::core::import::{AddressBookImport, RegistrationImport, SurveyResponseImport};
pub use domain::ports::{Import, ImportSummary, RecordStore};
pub use utils::error::{AdmError, Result};
