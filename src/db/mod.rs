//! Database-side provisioning: authentication probing, SQL execution,
//! schema and account creation, connectivity verification.

pub mod auth;
pub mod schema;
pub mod sql;
pub mod verify;
