//! Service layer - business logic orchestration
//!
//! Services coordinate the gateway, the durable store, and the
//! notification sink. Each service focuses on one resource or feature
//! area.

mod allocation;
mod auth;
mod budget;
mod document;
mod expense;
mod report;
mod team;

pub use allocation::{
    compute_allocations, default_weights, group_by_month, infer_plan_month, AllocationService,
    CategoryWeight, CategoryWeights, GeneratedPlan, MonthBucket, PlanView, PlannedAllocation,
};
pub use auth::AuthService;
pub use budget::BudgetService;
pub use document::DocumentService;
pub use expense::ExpenseService;
pub use report::ReportService;
pub use team::TeamService;
