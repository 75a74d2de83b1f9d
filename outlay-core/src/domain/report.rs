//! Report domain model
//!
//! Aggregate figures computed by the backend for a date range. Every
//! collection defaults to empty so a sparse backend response still
//! deserializes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::budget::Category;

/// Aggregate report for a `[start_date, end_date]` range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub total_expenses: Decimal,
    #[serde(default)]
    pub expenses_by_category: Vec<CategoryTotal>,
    #[serde(default)]
    pub expenses_by_month: Vec<MonthTotal>,
    #[serde(default)]
    pub budget_comparison: Vec<BudgetComparison>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthTotal {
    /// YYYY-MM key
    pub month: String,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetComparison {
    pub category: Category,
    pub budgeted: Decimal,
    pub spent: Decimal,
}
