//! Expense domain model

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::budget::Category;

/// A single expense entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    /// ISO date (YYYY-MM-DD)
    pub date: NaiveDate,
}

/// Payload for creating or updating an expense
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    pub date: NaiveDate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expense_deserializes_backend_shape() {
        let json = r#"{
            "id": "e1",
            "description": "Coffee",
            "amount": 4.50,
            "category": "food",
            "date": "2025-05-14"
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.category, Category::Food);
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        assert_eq!(expense.amount, Decimal::new(450, 2));
    }
}
