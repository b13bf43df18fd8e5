//! Database module
//!
//! This module handles access to the hosted relational store

pub mod client;
pub mod memory;
pub mod query;
pub mod repositories;
pub mod rest;
pub mod service;
pub mod store;
pub mod tables;

// Re-export commonly used database components
pub use client::StoreClient;
pub use memory::{MemoryStore, StoreOp};
pub use query::{Filter, Query};
pub use repositories::{
    OrganizerRepository, InvitationRepository, EventRepository, ExhibitorRepository,
    ApplicationRepository, DraftRepository,
};
pub use rest::RestStore;
pub use service::DatabaseService;
pub use store::DataStore;
