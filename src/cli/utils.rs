use std::io::{self, BufRead, Write};

use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::types::{AuthUser, ListenListEntry};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, collection_name: &str, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ collection_name: [] }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

/// Print any serializable value as pretty JSON
pub fn output_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn output_user(output_format: &OutputFormat, user: &AuthUser) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => output_json(user)?,
        OutputFormat::Text => {
            println!("{} (@{})", user.name, user.username);
            println!("Email: {}{}", user.email, if user.email_validated { "" } else { " (unverified)" });
            if let Some(bio) = user.bio.as_deref().filter(|b| !b.is_empty()) {
                println!("Bio: {}", bio);
            }
            println!("Followers: {}  Following: {}", user.followers_count, user.following_count);
            if user.spotify_linked {
                println!("Spotify: linked");
            }
        }
    }
    Ok(())
}

pub fn output_entries(output_format: &OutputFormat, entries: &[ListenListEntry]) -> anyhow::Result<()> {
    if entries.is_empty() {
        return output_empty_collection(output_format, "entries", "Listen list is empty");
    }

    match output_format {
        OutputFormat::Json => output_json(entries)?,
        OutputFormat::Text => {
            for entry in entries {
                println!(
                    "{:<38} {:<7} {:<24} {}",
                    entry.id.as_str(),
                    entry.kind().as_str(),
                    entry.item.content_id(),
                    entry.item.name()
                );
            }
        }
    }
    Ok(())
}

/// Read one line from stdin after printing a prompt. Input is echoed.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_string())
}

/// Use the given value or ask for it
pub fn value_or_prompt(value: Option<String>, label: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value),
        None => prompt(label),
    }
}
