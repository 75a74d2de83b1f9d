//! Budget domain model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Spending categories recognized by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Transportation,
    Utilities,
    Entertainment,
    Shopping,
    Health,
    Education,
    Personal,
    Travel,
    Other,
}

impl Category {
    /// All categories, in display order
    pub fn all() -> [Category; 10] {
        [
            Category::Food,
            Category::Transportation,
            Category::Utilities,
            Category::Entertainment,
            Category::Shopping,
            Category::Health,
            Category::Education,
            Category::Personal,
            Category::Travel,
            Category::Other,
        ]
    }

    /// Human-readable name shown in tables and used as the generated
    /// budget record name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Food => "Food & Dining",
            Category::Transportation => "Transportation",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Health => "Healthcare",
            Category::Education => "Education",
            Category::Personal => "Personal Care",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }

    /// Wire identifier (the lowercase serde form)
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transportation => "transportation",
            Category::Utilities => "utilities",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Health => "health",
            Category::Education => "education",
            Category::Personal => "personal",
            Category::Travel => "travel",
            Category::Other => "other",
        }
    }

    /// Parse a wire identifier
    pub fn parse(s: &str) -> Option<Category> {
        Category::all()
            .into_iter()
            .find(|c| c.as_str() == s.to_lowercase())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Budget recurrence period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Weekly,
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Quarterly => "quarterly",
            Period::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Period> {
        match s.to_lowercase().as_str() {
            "weekly" => Some(Period::Weekly),
            "monthly" => Some(Period::Monthly),
            "quarterly" => Some(Period::Quarterly),
            "yearly" => Some(Period::Yearly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A budget record owned by the backend
///
/// `plan_id`/`plan_name` are set only on records created by plan
/// generation; standalone budgets leave them empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub category: Category,
    pub period: Period,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
}

/// Payload for creating or updating a budget (no server-assigned id)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBudget {
    pub name: String,
    pub amount: Decimal,
    pub category: Category,
    pub period: Period,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_round_trip() {
        for category in Category::all() {
            assert_eq!(Category::parse(category.as_str()), Some(category));
        }
        assert_eq!(Category::parse("FOOD"), Some(Category::Food));
        assert_eq!(Category::parse("groceries"), None);
    }

    #[test]
    fn test_period_default_is_monthly() {
        assert_eq!(Period::default(), Period::Monthly);
        assert_eq!(Period::parse("quarterly"), Some(Period::Quarterly));
    }

    #[test]
    fn test_budget_wire_shape() {
        let budget = Budget {
            id: "b1".into(),
            name: "Food & Dining".into(),
            amount: Decimal::new(25000, 2),
            category: Category::Food,
            period: Period::Monthly,
            plan_id: Some("Plan-a1b2c3".into()),
            plan_name: Some("May 2025 Budget".into()),
        };

        let json = serde_json::to_value(&budget).unwrap();
        assert_eq!(json["category"], "food");
        assert_eq!(json["period"], "monthly");
        assert_eq!(json["planId"], "Plan-a1b2c3");
    }
}
