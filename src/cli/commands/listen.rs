use clap::Subcommand;
use serde_json::json;

use crate::cli::config::CliSession;
use crate::cli::utils::{output_entries, output_success};
use crate::cli::OutputFormat;
use crate::types::ItemKind;

#[derive(Subcommand)]
pub enum ListenCommands {
    #[command(about = "Show your listen list")]
    List {
        #[arg(long, help = "Only show album, music or artist entries")]
        kind: Option<ItemKind>,
    },

    #[command(about = "Add an album, track or artist")]
    Add {
        #[arg(help = "album, music or artist")]
        kind: ItemKind,
        #[arg(help = "Catalog id of the item")]
        id: String,
    },

    #[command(about = "Remove an entry by its entry id")]
    Remove {
        #[arg(help = "Entry id as shown by `listen list`")]
        entry_id: String,
    },

    #[command(name = "remove-item", about = "Remove whichever entry references an item")]
    RemoveItem {
        #[arg(help = "album, music or artist")]
        kind: ItemKind,
        #[arg(help = "Catalog id of the item")]
        id: String,
    },
}

pub async fn handle(cmd: ListenCommands, session: &CliSession, output_format: OutputFormat) -> anyhow::Result<()> {
    let list = &session.app.listen_list;
    list.load().await?;

    match cmd {
        ListenCommands::List { kind } => {
            let entries = match kind {
                Some(kind) => list.entries_of(kind),
                None => list.entries(),
            };
            output_entries(&output_format, &entries)
        }
        ListenCommands::Add { kind, id } => {
            let already = list.contains(kind, &id);
            list.add(kind, &id).await?;
            let message = if already {
                format!("{} {} is already on your listen list", kind, id)
            } else {
                format!("Added {} {} to your listen list", kind, id)
            };
            output_success(&output_format, &message, Some(json!({ "entries": list.entries() })))
        }
        ListenCommands::Remove { entry_id } => {
            let entry = list
                .entries()
                .into_iter()
                .find(|e| e.id.as_str() == entry_id)
                .ok_or_else(|| anyhow::anyhow!("Entry '{}' not found", entry_id))?;
            list.remove(&entry).await?;
            output_success(&output_format, &format!("Removed {}", entry.item.name()), None)
        }
        ListenCommands::RemoveItem { kind, id } => {
            let present = list.contains(kind, &id);
            list.remove_content(kind, &id).await?;
            let message = if present {
                format!("Removed {} {} from your listen list", kind, id)
            } else {
                format!("{} {} was not on your listen list", kind, id)
            };
            output_success(&output_format, &message, None)
        }
    }
}
