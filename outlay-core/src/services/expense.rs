//! Expense service - CRUD against /expenses

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Expense, NewExpense};
use crate::gateway::ApiGateway;

pub struct ExpenseService {
    gateway: Arc<ApiGateway>,
}

impl ExpenseService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<Expense>> {
        self.gateway.get("/expenses")?.envelope()
    }

    pub fn get(&self, id: &str) -> Result<Expense> {
        self.gateway.get(format!("/expenses/{}", id))?.envelope()
    }

    pub fn create(&self, expense: &NewExpense) -> Result<Expense> {
        self.gateway
            .post("/expenses", serde_json::to_value(expense)?)?
            .envelope()
    }

    pub fn update(&self, id: &str, expense: &NewExpense) -> Result<Expense> {
        self.gateway
            .put(format!("/expenses/{}", id), serde_json::to_value(expense)?)?
            .envelope()
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete(format!("/expenses/{}", id))?;
        Ok(())
    }
}
