//! Budget allocation engine
//!
//! Turns a single total into per-category budget records according to the
//! configured weight table, and groups previously generated plans by the
//! month/year inferred from their names for browsing.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Utc};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{Budget, Category, NewBudget, Period};
use crate::ports::{keys, KeyValueStore, Notifier};
use crate::services::BudgetService;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weight of one category in the allocation table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub enabled: bool,
    /// Stored as entered (percent points); normalized at generation time,
    /// so the table does not have to sum to 100.
    pub percentage: Decimal,
}

/// The full allocation table, keyed by category
pub type CategoryWeights = BTreeMap<Category, CategoryWeight>;

/// Default allocation based on common spending patterns (percent)
pub fn default_weights() -> CategoryWeights {
    let weight = |pct: i64| CategoryWeight {
        enabled: true,
        percentage: Decimal::new(pct, 0),
    };

    BTreeMap::from([
        (Category::Food, weight(25)),
        (Category::Utilities, weight(35)),
        (Category::Transportation, weight(15)),
        (Category::Entertainment, weight(10)),
        (Category::Personal, weight(5)),
        (Category::Health, weight(5)),
        (Category::Education, weight(3)),
        (Category::Other, weight(2)),
    ])
}

/// One record the engine decided to create
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAllocation {
    pub category: Category,
    pub amount: Decimal,
}

/// Result of a successful plan generation. The caller is expected to
/// re-fetch budgets rather than trust this echo.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
    pub plan_id: String,
    pub plan_name: String,
    pub allocations: Vec<PlannedAllocation>,
}

/// A plan reconstructed from fetched budget records sharing a planId
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView {
    pub id: String,
    pub name: String,
    pub total: Decimal,
    pub budgets: Vec<Budget>,
}

/// Plans bucketed under one month/year heading
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthBucket {
    /// "May 2025", or "Other" for plans with no recognizable month
    pub label: String,
    pub year: Option<i32>,
    /// 1-based calendar month
    pub month: Option<u32>,
    pub plans: Vec<PlanView>,
}

/// Budget allocation engine
pub struct AllocationService {
    budgets: BudgetService,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl AllocationService {
    pub fn new(
        budgets: BudgetService,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            budgets,
            store,
            notifier,
        }
    }

    /// The configured weight table, falling back to the defaults when
    /// nothing (or something unreadable) is stored.
    pub fn weights(&self) -> Result<CategoryWeights> {
        let Some(raw) = self.store.get(keys::DEFAULT_CATEGORIES)? else {
            return Ok(default_weights());
        };
        match serde_json::from_str(&raw) {
            Ok(weights) => Ok(weights),
            Err(e) => {
                log::warn!("Stored category weights are unreadable, using defaults: {}", e);
                Ok(default_weights())
            }
        }
    }

    /// Persist the weight table
    pub fn save_weights(&self, weights: &CategoryWeights) -> Result<()> {
        self.store
            .set(keys::DEFAULT_CATEGORIES, &serde_json::to_string(weights)?)
    }

    /// Generate a budget plan: one record per enabled category, amounts
    /// proportional to the normalized weights, persisted one create at a
    /// time.
    ///
    /// Creates are independent and there is no rollback: a failure
    /// mid-sequence leaves the already-created records in place and the
    /// returned error reports how far generation got.
    pub fn generate_plan(
        &self,
        total: Decimal,
        plan_name: &str,
        weights: &CategoryWeights,
    ) -> Result<GeneratedPlan> {
        let plan_name = plan_name.trim();
        if plan_name.is_empty() {
            return Err(Error::config("Budget plan name must not be empty"));
        }

        let allocations = compute_allocations(total, weights)?;

        let plan_id = new_plan_id();
        let mut created = 0usize;

        for allocation in &allocations {
            let record = NewBudget {
                name: allocation.category.display_name().to_string(),
                amount: allocation.amount,
                category: allocation.category,
                period: Period::Monthly,
                plan_id: Some(plan_id.clone()),
                plan_name: Some(plan_name.to_string()),
            };

            if let Err(e) = self.budgets.create(&record) {
                let progress = format!(
                    "budget plan '{}' is incomplete: {} of {} records created",
                    plan_name,
                    created,
                    allocations.len()
                );
                self.notifier.error(&format!("Error generating budget plan: {}", progress));
                return Err(augment(e, &progress));
            }
            created += 1;
        }

        self.notifier.success(&format!(
            "Budget plan '{}' generated successfully!",
            plan_name
        ));

        Ok(GeneratedPlan {
            plan_id,
            plan_name: plan_name.to_string(),
            allocations,
        })
    }

    /// Group fetched budgets into plans and bucket the plans by the
    /// month/year inferred from their names, for the current year.
    pub fn plans_by_month(&self, budgets: &[Budget]) -> Vec<MonthBucket> {
        group_by_month(budgets, Utc::now().year())
    }
}

/// Normalize the enabled weights and compute the per-category amounts.
///
/// Rejected before any computation: non-positive totals, zero enabled
/// categories, and enabled percentages summing to zero. Each amount is
/// `total * weight / sum`, rounded half-up to 2 decimal places; the sum
/// of the results may differ from the total by a few cents, which is
/// accepted rather than corrected.
pub fn compute_allocations(
    total: Decimal,
    weights: &CategoryWeights,
) -> Result<Vec<PlannedAllocation>> {
    if total <= Decimal::ZERO {
        return Err(Error::config("Budget total must be greater than zero"));
    }

    let enabled: Vec<(Category, Decimal)> = weights
        .iter()
        .filter(|(_, w)| w.enabled)
        .map(|(c, w)| (*c, w.percentage))
        .collect();

    if enabled.is_empty() {
        return Err(Error::config("No budget categories are enabled"));
    }

    let sum: Decimal = enabled.iter().map(|(_, pct)| *pct).sum();
    if sum <= Decimal::ZERO {
        return Err(Error::config(
            "Enabled category percentages must sum to a positive value",
        ));
    }

    Ok(enabled
        .into_iter()
        .map(|(category, pct)| PlannedAllocation {
            category,
            amount: (total * pct / sum)
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        })
        .collect())
}

/// Group budgets sharing a planId into plan views and bucket them by
/// month/year. `default_year` applies to plan names carrying a month but
/// no year token.
pub fn group_by_month(budgets: &[Budget], default_year: i32) -> Vec<MonthBucket> {
    // Reconstruct plans, keeping first-seen order for determinism
    let mut order: Vec<String> = Vec::new();
    let mut plans: BTreeMap<String, PlanView> = BTreeMap::new();

    for budget in budgets {
        let (Some(plan_id), Some(plan_name)) = (&budget.plan_id, &budget.plan_name) else {
            continue;
        };
        let view = plans.entry(plan_id.clone()).or_insert_with(|| {
            order.push(plan_id.clone());
            PlanView {
                id: plan_id.clone(),
                name: plan_name.clone(),
                total: Decimal::ZERO,
                budgets: Vec::new(),
            }
        });
        view.total += budget.amount;
        view.budgets.push(budget.clone());
    }

    // Members sorted by category display name
    for view in plans.values_mut() {
        view.budgets
            .sort_by_key(|b| b.category.display_name());
    }

    // Bucket by inferred month/year
    let mut buckets: Vec<MonthBucket> = Vec::new();
    for plan_id in order {
        let Some(view) = plans.remove(&plan_id) else {
            continue;
        };
        let inferred = infer_plan_month(&view.name, default_year);
        let (label, year, month) = match inferred {
            Some((year, month)) => (
                format!("{} {}", MONTH_NAMES[(month - 1) as usize], year),
                Some(year),
                Some(month),
            ),
            None => ("Other".to_string(), None, None),
        };

        match buckets.iter_mut().find(|b| b.year == year && b.month == month) {
            Some(bucket) => bucket.plans.push(view),
            None => buckets.push(MonthBucket {
                label,
                year,
                month,
                plans: vec![view],
            }),
        }
    }

    // Year descending, month ascending within a year, "Other" last
    buckets.sort_by(|a, b| match (a.year, b.year) {
        (Some(ay), Some(by)) => by.cmp(&ay).then(a.month.cmp(&b.month)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    buckets
}

/// Infer (year, month) from a free-text plan name.
///
/// Heuristic on purpose: plans have no month/year fields, only a display
/// name. The twelve month names are scanned in calendar order and the
/// first one present wins, so a name containing two month tokens
/// resolves to the earlier calendar month. The year is the first
/// four-digit 20xx token anywhere in the name, else `default_year`.
pub fn infer_plan_month(name: &str, default_year: i32) -> Option<(i32, u32)> {
    let lower = name.to_lowercase();

    let month = MONTH_NAMES
        .iter()
        .position(|m| lower.contains(&m.to_lowercase()))?;

    let year_re = Regex::new(r"\b20\d{2}\b").unwrap();
    let year = year_re
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(default_year);

    Some((year, (month + 1) as u32))
}

fn new_plan_id() -> String {
    let uuid = Uuid::new_v4().simple().to_string();
    format!("Plan-{}", &uuid[..6])
}

/// Keep the error kind while appending generation progress, so callers
/// can still tell a dead backend from a rejected record.
fn augment(error: Error, progress: &str) -> Error {
    match error {
        Error::Network(m) => Error::Network(format!("{} ({})", m, progress)),
        Error::Server { status, message } => Error::Server {
            status,
            message: format!("{} ({})", message, progress),
        },
        Error::Rejected { status, message } => Error::Rejected {
            status,
            message: format!("{} ({})", message, progress),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights_from(entries: &[(Category, bool, i64)]) -> CategoryWeights {
        entries
            .iter()
            .map(|(c, enabled, pct)| {
                (
                    *c,
                    CategoryWeight {
                        enabled: *enabled,
                        percentage: Decimal::new(*pct, 0),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_allocations_for_reference_split() {
        let allocations =
            compute_allocations(Decimal::new(1000, 0), &default_weights()).unwrap();

        assert_eq!(allocations.len(), 8);
        let amount_for = |category: Category| {
            allocations
                .iter()
                .find(|a| a.category == category)
                .unwrap()
                .amount
        };
        assert_eq!(amount_for(Category::Food), Decimal::new(25000, 2));
        assert_eq!(amount_for(Category::Utilities), Decimal::new(35000, 2));
        assert_eq!(amount_for(Category::Transportation), Decimal::new(15000, 2));
        assert_eq!(amount_for(Category::Entertainment), Decimal::new(10000, 2));
        assert_eq!(amount_for(Category::Personal), Decimal::new(5000, 2));
        assert_eq!(amount_for(Category::Health), Decimal::new(5000, 2));
        assert_eq!(amount_for(Category::Education), Decimal::new(3000, 2));
        assert_eq!(amount_for(Category::Other), Decimal::new(2000, 2));
    }

    #[test]
    fn test_weights_need_not_sum_to_100() {
        // 30 + 10 normalizes to 0.75 / 0.25
        let weights = weights_from(&[
            (Category::Food, true, 30),
            (Category::Travel, true, 10),
        ]);
        let allocations = compute_allocations(Decimal::new(200, 0), &weights).unwrap();

        let total: Decimal = allocations.iter().map(|a| a.amount).sum();
        assert_eq!(total, Decimal::new(20000, 2));
        assert_eq!(allocations[0].amount, Decimal::new(15000, 2));
        assert_eq!(allocations[1].amount, Decimal::new(5000, 2));
    }

    #[test]
    fn test_normalized_weights_sum_to_one_within_tolerance() {
        let weights = weights_from(&[
            (Category::Food, true, 7),
            (Category::Utilities, true, 11),
            (Category::Travel, true, 3),
        ]);
        let total = Decimal::new(12345, 2); // 123.45
        let allocations = compute_allocations(total, &weights).unwrap();

        let recovered: Decimal = allocations.iter().map(|a| a.amount).sum();
        let tolerance = Decimal::new(1, 2) * Decimal::new(allocations.len() as i64, 0);
        assert!((recovered - total).abs() <= tolerance);
    }

    #[test]
    fn test_disabled_categories_are_excluded_not_zeroed() {
        let weights = weights_from(&[
            (Category::Food, true, 50),
            (Category::Travel, false, 50),
        ]);
        let allocations = compute_allocations(Decimal::new(100, 0), &weights).unwrap();

        assert_eq!(allocations.len(), 1);
        assert_eq!(allocations[0].category, Category::Food);
        assert_eq!(allocations[0].amount, Decimal::new(10000, 2));
    }

    #[test]
    fn test_degenerate_inputs_rejected() {
        let weights = default_weights();

        assert!(matches!(
            compute_allocations(Decimal::ZERO, &weights),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            compute_allocations(Decimal::new(-5, 0), &weights),
            Err(Error::Config(_))
        ));

        let all_disabled: CategoryWeights = weights
            .into_iter()
            .map(|(c, mut w)| {
                w.enabled = false;
                (c, w)
            })
            .collect();
        assert!(matches!(
            compute_allocations(Decimal::new(100, 0), &all_disabled),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_half_up_rounding() {
        // 100 * 1/3 = 33.333... -> 33.33; 100 * 2/3 = 66.666... -> 66.67
        let weights = weights_from(&[
            (Category::Food, true, 1),
            (Category::Utilities, true, 2),
        ]);
        let allocations = compute_allocations(Decimal::new(100, 0), &weights).unwrap();

        assert_eq!(allocations[0].amount, Decimal::new(3333, 2));
        assert_eq!(allocations[1].amount, Decimal::new(6667, 2));
    }

    #[test]
    fn test_infer_plan_month() {
        assert_eq!(infer_plan_month("May 2025 Budget", 2030), Some((2025, 5)));
        assert_eq!(
            infer_plan_month("2024 December Savings", 2030),
            Some((2024, 12))
        );
        assert_eq!(infer_plan_month("Misc Plan", 2030), None);
        // No year token: default year applies
        assert_eq!(infer_plan_month("october groceries", 2026), Some((2026, 10)));
        // Two month tokens: calendar-order scan, first match wins
        assert_eq!(
            infer_plan_month("June carried over from March", 2026),
            Some((2026, 3))
        );
        // "2024" inside a longer number is not a year token
        assert_eq!(infer_plan_month("May run 120241", 2026), Some((2026, 5)));
    }

    fn plan_budget(plan_id: &str, plan_name: &str, category: Category, cents: i64) -> Budget {
        Budget {
            id: format!("b-{}-{}", plan_id, category),
            name: category.display_name().to_string(),
            amount: Decimal::new(cents, 2),
            category,
            period: Period::Monthly,
            plan_id: Some(plan_id.to_string()),
            plan_name: Some(plan_name.to_string()),
        }
    }

    #[test]
    fn test_group_by_month_ordering_and_totals() {
        let budgets = vec![
            plan_budget("p1", "May 2025 Budget", Category::Utilities, 35000),
            plan_budget("p1", "May 2025 Budget", Category::Food, 25000),
            plan_budget("p2", "2024 December Savings", Category::Travel, 12000),
            plan_budget("p3", "Misc Plan", Category::Other, 1000),
            // Standalone budget: never part of a plan view
            Budget {
                id: "standalone".into(),
                name: "Gym".into(),
                amount: Decimal::new(4000, 2),
                category: Category::Health,
                period: Period::Monthly,
                plan_id: None,
                plan_name: None,
            },
        ];

        let buckets = group_by_month(&budgets, 2025);

        assert_eq!(buckets.len(), 3);
        // 2025 before 2024, Other last
        assert_eq!(buckets[0].label, "May 2025");
        assert_eq!(buckets[1].label, "December 2024");
        assert_eq!(buckets[2].label, "Other");

        let may_plan = &buckets[0].plans[0];
        assert_eq!(may_plan.total, Decimal::new(60000, 2));
        // Members sorted by category display name: Food & Dining first
        assert_eq!(may_plan.budgets[0].category, Category::Food);
        assert_eq!(may_plan.budgets[1].category, Category::Utilities);
    }

    #[test]
    fn test_group_by_month_same_year_months_ascending() {
        let budgets = vec![
            plan_budget("p1", "November 2025", Category::Food, 100),
            plan_budget("p2", "March 2025", Category::Food, 100),
            plan_budget("p3", "July 2025", Category::Food, 100),
        ];

        let buckets = group_by_month(&budgets, 2025);
        let labels: Vec<&str> = buckets.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["March 2025", "July 2025", "November 2025"]);
    }

    #[test]
    fn test_plan_id_shape() {
        let id = new_plan_id();
        assert!(id.starts_with("Plan-"));
        assert_eq!(id.len(), "Plan-".len() + 6);
        assert_ne!(id, new_plan_id());
    }

    #[test]
    fn test_default_weights_cover_reference_split() {
        let weights = default_weights();
        assert_eq!(weights.len(), 8);
        let sum: Decimal = weights.values().map(|w| w.percentage).sum();
        assert_eq!(sum, Decimal::new(100, 0));
        assert!(weights.values().all(|w| w.enabled));
    }
}
