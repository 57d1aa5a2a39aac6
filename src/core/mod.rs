pub mod addresses;
pub mod builders;
pub mod import;
pub mod reconcile;
pub mod schema;
pub mod sections;
