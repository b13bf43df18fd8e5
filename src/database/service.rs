//! Database service layer
//!
//! This module bundles the repositories over one injected store

use std::sync::Arc;

use crate::database::{
    ApplicationRepository, DataStore, DraftRepository, EventRepository, ExhibitorRepository,
    InvitationRepository, OrganizerRepository, StoreClient,
};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub organizers: OrganizerRepository,
    pub invitations: InvitationRepository,
    pub events: EventRepository,
    pub exhibitors: ExhibitorRepository,
    pub applications: ApplicationRepository,
    pub drafts: DraftRepository,
}

impl DatabaseService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        let client = StoreClient::new(store);
        Self {
            organizers: OrganizerRepository::new(client.clone()),
            invitations: InvitationRepository::new(client.clone()),
            events: EventRepository::new(client.clone()),
            exhibitors: ExhibitorRepository::new(client.clone()),
            applications: ApplicationRepository::new(client.clone()),
            drafts: DraftRepository::new(client),
        }
    }
}
