//! Document commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use dialoguer::Confirm;

use super::get_context;
use crate::output;

#[derive(Subcommand)]
pub enum DocumentCommands {
    /// List stored documents
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload a file (max 5MB)
    Upload {
        /// Path to the file to upload
        file: PathBuf,
    },

    /// Download a document
    Download {
        /// Document ID
        id: String,
        /// Output path (defaults to the stored file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Remove a document
    Rm {
        /// Document ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

pub fn run(command: DocumentCommands) -> Result<()> {
    match command {
        DocumentCommands::List { json } => list(json),
        DocumentCommands::Upload { file } => upload(&file),
        DocumentCommands::Download { id, output } => download(&id, output),
        DocumentCommands::Rm { id, force } => remove(&id, force),
    }
}

fn list(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let documents = ctx.document_service.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
        return Ok(());
    }

    if documents.is_empty() {
        output::info("No documents uploaded yet.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "File", "Size", "Uploaded"]);
    for doc in &documents {
        table.add_row(vec![
            doc.id.clone(),
            doc.file_name.clone(),
            output::format_size(doc.size),
            doc.upload_date.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");

    Ok(())
}

/// Guess a mime type from the file extension; the backend only uses it
/// for download headers.
fn guess_mime(path: &PathBuf) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("csv") => "text/csv",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn upload(file: &PathBuf) -> Result<()> {
    let ctx = get_context()?;

    let bytes = std::fs::read(file).with_context(|| format!("Failed to read {:?}", file))?;
    let file_name = file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload.bin");

    let doc = ctx
        .document_service
        .upload(file_name, guess_mime(file), bytes)?;
    output::success(&format!("Document uploaded successfully ({})", doc.id));
    Ok(())
}

fn download(id: &str, output_path: Option<PathBuf>) -> Result<()> {
    let ctx = get_context()?;

    let target = match output_path {
        Some(path) => path,
        None => {
            // Look the name up so the file lands under its stored name
            let documents = ctx.document_service.list()?;
            let name = documents
                .iter()
                .find(|d| d.id == id)
                .map(|d| d.file_name.clone())
                .unwrap_or_else(|| format!("document-{}", id));
            PathBuf::from(name)
        }
    };

    let bytes = ctx.document_service.download(id)?;
    std::fs::write(&target, &bytes)
        .with_context(|| format!("Failed to write {:?}", target))?;

    output::success(&format!(
        "Document downloaded successfully to {:?} ({})",
        target,
        output::format_size(bytes.len() as u64)
    ));
    Ok(())
}

fn remove(id: &str, force: bool) -> Result<()> {
    if !force
        && !Confirm::new()
            .with_prompt("Are you sure you want to delete this document?")
            .default(false)
            .interact()?
    {
        return Ok(());
    }

    let ctx = get_context()?;
    ctx.document_service.delete(id)?;
    output::success("Document deleted successfully");
    Ok(())
}
