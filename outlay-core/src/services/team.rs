//! Team service - shared expense team membership

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{NewTeamMember, TeamMember};
use crate::gateway::ApiGateway;

pub struct TeamService {
    gateway: Arc<ApiGateway>,
}

impl TeamService {
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        Self { gateway }
    }

    pub fn list(&self) -> Result<Vec<TeamMember>> {
        self.gateway.get("/team")?.envelope()
    }

    pub fn invite(&self, member: &NewTeamMember) -> Result<TeamMember> {
        self.gateway
            .post("/team", serde_json::to_value(member)?)?
            .envelope()
    }

    pub fn update(&self, id: &str, member: &NewTeamMember) -> Result<TeamMember> {
        self.gateway
            .put(format!("/team/{}", id), serde_json::to_value(member)?)?
            .envelope()
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.gateway.delete(format!("/team/{}", id))?;
        Ok(())
    }
}
