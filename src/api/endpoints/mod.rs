//! API endpoint handlers.
//!
//! Each module covers one portal feature. Handlers resolve the caller,
//! then delegate to the domain modules.

pub mod chat;
pub mod connections;
pub mod diet;
pub mod health;
pub mod pregnancy;
pub mod records;
pub mod users;
pub mod vitals;
