//! Budget service - CRUD against /budgets

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{Budget, NewBudget};
use crate::gateway::ApiGateway;

pub struct BudgetService {
    gateway: Arc<ApiGateway>,
}

impl BudgetService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<Budget>> {
        self.gateway.get("/budgets")?.envelope()
    }

    pub fn get(&self, id: &str) -> Result<Budget> {
        self.gateway.get(format!("/budgets/{}", id))?.envelope()
    }

    pub fn create(&self, budget: &NewBudget) -> Result<Budget> {
        self.gateway
            .post("/budgets", serde_json::to_value(budget)?)?
            .envelope()
    }

    pub fn update(&self, id: &str, budget: &NewBudget) -> Result<Budget> {
        self.gateway
            .put(format!("/budgets/{}", id), serde_json::to_value(budget)?)?
            .envelope()
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete(format!("/budgets/{}", id))?;
        Ok(())
    }

    /// Delete every budget, one call per record (there is no bulk
    /// endpoint). Stops at the first failure, reporting how far it got.
    pub fn delete_all(&self) -> Result<usize> {
        let budgets = self.list()?;
        let mut deleted = 0;
        for budget in &budgets {
            self.delete(&budget.id)?;
            deleted += 1;
        }
        Ok(deleted)
    }
}
