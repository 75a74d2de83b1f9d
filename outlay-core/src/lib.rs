//! Outlay Core - Client-side business logic for the Outlay expense tracker
//!
//! This crate implements the client core following hexagonal architecture:
//!
//! - **domain**: Wire entities (Session, Budget, Expense, etc.) and the
//!   error taxonomy
//! - **ports**: Trait definitions for external dependencies (HTTP
//!   transport, durable store, notifier)
//! - **services**: Business logic orchestration (auth, allocation engine,
//!   resource CRUD, reports)
//! - **adapters**: Concrete implementations (reqwest, JSON file store,
//!   mock backend server)
//!
//! The gateway in `gateway.rs` is the single choke point for backend
//! traffic: bearer attachment, endpoint failover, and the
//! refresh-once-then-logout session recovery live there.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod gateway;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use adapters::{JsonFileStore, ReqwestTransport};
use config::Config;
use gateway::ApiGateway;
use ports::{KeyValueStore, Notifier};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{ApiEnvelope, Error};
pub use domain::{
    Budget, Category, Document, Expense, NewBudget, NewExpense, NewTeamMember, Period, Report,
    Role, Session, TeamMember, UserProfile,
};
pub use gateway::{ApiRequest, ApiResponse};

/// Main context for Outlay operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the durable store, the gateway, and all services.
pub struct OutlayContext {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub gateway: Arc<ApiGateway>,
    pub auth_service: AuthService,
    pub expense_service: ExpenseService,
    pub budget_service: BudgetService,
    pub allocation_service: AllocationService,
    pub document_service: DocumentService,
    pub team_service: TeamService,
    pub report_service: ReportService,
}

impl OutlayContext {
    /// Create a new Outlay context rooted at `data_dir`
    pub fn new(data_dir: &Path, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let config = Config::load(data_dir)?;
        let timeout = Duration::from_secs(config.timeout_secs);

        let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(data_dir)?);
        let transport = Arc::new(ReqwestTransport::new(timeout)?);

        let gateway = Arc::new(ApiGateway::new(
            config.endpoints.clone(),
            timeout,
            transport,
            Arc::clone(&store),
            Arc::clone(&notifier),
        )?);

        // Create services
        let auth_service = AuthService::new(Arc::clone(&gateway), Arc::clone(&store));
        let expense_service = ExpenseService::new(Arc::clone(&gateway));
        let budget_service = BudgetService::new(Arc::clone(&gateway));
        let allocation_service = AllocationService::new(
            BudgetService::new(Arc::clone(&gateway)),
            Arc::clone(&store),
            Arc::clone(&notifier),
        );
        let document_service = DocumentService::new(Arc::clone(&gateway));
        let team_service = TeamService::new(Arc::clone(&gateway));
        let report_service = ReportService::new(Arc::clone(&gateway), Arc::clone(&notifier));

        Ok(Self {
            config,
            store,
            gateway,
            auth_service,
            expense_service,
            budget_service,
            allocation_service,
            document_service,
            team_service,
            report_service,
        })
    }
}
