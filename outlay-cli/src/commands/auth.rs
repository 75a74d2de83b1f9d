//! Auth commands - login, register, logout, whoami

use anyhow::Result;
use chrono::{TimeZone, Utc};
use dialoguer::{Input, Password};

use super::get_context;
use crate::output;

pub fn login(email: Option<String>) -> Result<()> {
    let ctx = get_context()?;

    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new().with_prompt("Password").interact()?;

    let session = ctx.auth_service.login(&email, &password)?;

    output::success(&format!("Logged in as {}", session.profile.email));
    Ok(())
}

pub fn register(name: Option<String>, email: Option<String>) -> Result<()> {
    let ctx = get_context()?;

    let name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Name").interact_text()?,
    };
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let session = ctx.auth_service.register(&name, &email, &password)?;

    output::success(&format!(
        "Account created successfully! Logged in as {}",
        session.profile.email
    ));
    Ok(())
}

pub fn logout() -> Result<()> {
    let ctx = get_context()?;
    ctx.auth_service.logout()?;
    output::success("Logged out");
    Ok(())
}

pub fn whoami(json: bool) -> Result<()> {
    let ctx = get_context()?;

    let Some(session) = ctx.auth_service.current_session()? else {
        output::warning("Not logged in. Use 'ol login' first.");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&session.profile)?);
        return Ok(());
    }

    println!("Name:  {}", session.profile.name);
    println!("Email: {}", session.profile.email);
    if let Some(millis) = ctx.auth_service.last_login()? {
        if let Some(when) = Utc.timestamp_millis_opt(millis).single() {
            println!("Last login: {}", when.format("%Y-%m-%d %H:%M UTC"));
        }
    }
    println!("Backend: {}", ctx.gateway.active_endpoint());

    Ok(())
}
