//! Test context for unified test setup
//!
//! Builds a [`ServiceFactory`] over the in-memory store with a stub login
//! provider. Mock servers for storage and postal lookups are started only
//! when a test asks for them.

use std::sync::{Arc, Once};
use std::time::Duration;

use serde_json::Value;

use StallBoard::config::Settings;
use StallBoard::database::{MemoryStore, StoreOp};
use StallBoard::services::{LineProfile, ServiceFactory, Session};

use super::delayed_store::DelayedStore;
use super::line_mock::StaticLoginProvider;
use super::postal_mock::PostalMockServer;
use super::supabase_mock::SupabaseMockServer;
use super::test_data::{line_profile, ADMIN_USER_ID};

static INIT: Once = Once::new();

/// Initialize logging for tests (called once)
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Which optional components a test needs
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub storage_mock: bool,
    pub postal_mock: bool,
    pub drafts_enabled: bool,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            storage_mock: false,
            postal_mock: false,
            drafts_enabled: true,
        }
    }
}

/// Unified test context that manages all test components
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub delayed: Arc<DelayedStore>,
    pub login: Arc<StaticLoginProvider>,
    pub services: ServiceFactory,
    pub settings: Settings,
    pub supabase_mock: Option<SupabaseMockServer>,
    pub postal_mock: Option<PostalMockServer>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::new_with_config(TestConfig::default()).await
    }

    pub async fn new_with_config(config: TestConfig) -> Self {
        init_test_logging();

        let supabase_mock = if config.storage_mock {
            Some(SupabaseMockServer::new().await)
        } else {
            None
        };
        let postal_mock = if config.postal_mock {
            Some(PostalMockServer::new().await)
        } else {
            None
        };

        let settings = Self::create_test_settings(&config, supabase_mock.as_ref(), postal_mock.as_ref());
        let store = Arc::new(MemoryStore::with_schema());
        let delayed = Arc::new(DelayedStore::new(store.clone()));
        let login = Arc::new(StaticLoginProvider::new());

        let services = ServiceFactory::new(settings.clone(), delayed.clone(), login.clone())
            .expect("Failed to build services");

        Self {
            store,
            delayed,
            login,
            services,
            settings,
            supabase_mock,
            postal_mock,
        }
    }

    fn create_test_settings(
        config: &TestConfig,
        supabase: Option<&SupabaseMockServer>,
        postal: Option<&PostalMockServer>,
    ) -> Settings {
        let mut settings = Settings::default();
        settings.line.channel_id = super::line_mock::TEST_CHANNEL_ID.to_string();
        settings.admin.line_user_ids = vec![ADMIN_USER_ID.to_string()];
        settings.drafts.enabled = config.drafts_enabled;
        if let Some(mock) = supabase {
            settings.supabase = mock.config();
        }
        if let Some(mock) = postal {
            settings.postal = mock.config();
        }
        settings
    }

    /// Register a user with the stub login provider and sign them in
    pub async fn sign_in(&self, user_id: &str) -> (Session, LineProfile) {
        let profile = line_profile(user_id);
        let token = format!("token-{}", user_id);
        self.login.register(&token, profile.clone());
        let session = self
            .services
            .auth_service
            .authenticate(&token)
            .await
            .expect("Failed to sign in");
        (session, profile)
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.store.seed(table, rows);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.store.rows(table)
    }

    pub fn count(&self, op: StoreOp, table: &str) -> usize {
        self.store.count(op, table)
    }

    /// Hold every `op` on `table` for `ms` before it reaches the store
    pub fn slow_down(&self, op: StoreOp, table: &str, ms: u64) {
        self.delayed.slow_down(op, table, Duration::from_millis(ms));
    }

    pub fn supabase(&self) -> &SupabaseMockServer {
        self.supabase_mock
            .as_ref()
            .expect("TestConfig.storage_mock was not enabled")
    }

    pub fn postal(&self) -> &PostalMockServer {
        self.postal_mock
            .as_ref()
            .expect("TestConfig.postal_mock was not enabled")
    }
}
