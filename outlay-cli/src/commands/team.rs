//! Team commands

use anyhow::{anyhow, Result};
use clap::Subcommand;
use dialoguer::Confirm;

use outlay_core::{NewTeamMember, Role};

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum TeamCommands {
    /// List team members
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Invite a member
    Invite {
        /// Member name
        name: String,
        /// Member email
        email: String,
        /// Role (member, admin)
        #[arg(long, default_value = "member")]
        role: String,
    },

    /// Update a member
    Update {
        /// Member ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },

    /// Remove a member
    Rm {
        /// Member ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: TeamCommands) -> Result<()> {
    match command {
        TeamCommands::List { json } => list(json),
        TeamCommands::Invite { name, email, role } => invite(name, email, &role),
        TeamCommands::Update {
            id,
            name,
            email,
            role,
        } => update(&id, name, email, role),
        TeamCommands::Rm { id, force } => remove(&id, force),
    }
}

fn parse_role(s: &str) -> Result<Role> {
    Role::parse(s).ok_or_else(|| anyhow!("Unknown role: {}", s))
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let members = ctx.team_service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&members)?);
        return Ok(());
    }

    if members.is_empty() {
        output::info("No team members yet. Use 'ol team invite'.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Email", "Role", "Status"]);
    for member in &members {
        table.add_row(vec![
            member.id.clone(),
            member.name.clone(),
            member.email.clone(),
            member.role.to_string(),
            member.status.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn invite(name: String, email: String, role: &str) -> Result<()> {
    let ctx = get_context()?;

    let member = NewTeamMember {
        name,
        email,
        role: parse_role(role)?,
    };

    let invited = ctx.team_service.invite(&member)?;
    output::success(&format!("Invitation sent to {}", invited.email));
    Ok(())
}

fn update(
    id: &str,
    name: Option<String>,
    email: Option<String>,
    role: Option<String>,
) -> Result<()> {
    let ctx = get_context()?;

    let members = ctx.team_service.list()?;
    let current = members
        .iter()
        .find(|m| m.id == id)
        .ok_or_else(|| anyhow!("Team member not found: {}", id))?;

    let update = NewTeamMember {
        name: name.unwrap_or_else(|| current.name.clone()),
        email: email.unwrap_or_else(|| current.email.clone()),
        role: match role {
            Some(s) => parse_role(&s)?,
            None => current.role,
        },
    };

    ctx.team_service.update(id, &update)?;
    output::success("Team member updated successfully");
    Ok(())
}

fn remove(id: &str, force: bool) -> Result<()> {
    if !force
        && !Confirm::new()
            .with_prompt("Are you sure you want to remove this team member?")
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    let ctx = get_context()?;
    ctx.team_service.delete(id)?;
    output::success("Team member removed successfully");
    Ok(())
}
