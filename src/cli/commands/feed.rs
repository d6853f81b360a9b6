use clap::{Args, Subcommand};

use crate::cli::config::CliSession;
use crate::cli::utils::{output_empty_collection, output_json};
use crate::cli::OutputFormat;
use crate::services::FeedParams;
use crate::types::{ActivityItem, ActivityType};

#[derive(Args)]
pub struct FeedArgs {
    #[arg(long, help = "Items per page")]
    pub limit: Option<u32>,

    #[arg(long, help = "Cursor printed by the previous page")]
    pub cursor: Option<String>,

    #[command(subcommand)]
    pub cmd: Option<FeedCommands>,
}

#[derive(Subcommand)]
pub enum FeedCommands {
    #[command(about = "Reviews and shares by one user")]
    User {
        #[arg(help = "User id")]
        id: String,
    },
}

fn print_item(item: &ActivityItem) {
    let when = item.timestamp.format("%Y-%m-%d %H:%M");
    match (item.kind, &item.review, &item.music_share) {
        (ActivityType::Review | ActivityType::Rating, Some(full), _) => {
            let review = &full.review;
            let score = review.album_score.map(|s| format!(" [{:.1}]", s)).unwrap_or_default();
            println!("{}  @{} reviewed {}{}", when, review.user.username, review.album.name, score);
            if let Some(content) = review.content.as_deref().filter(|c| !c.is_empty()) {
                println!("    {}", content);
            }
        }
        (ActivityType::MusicShare, _, Some(share)) => {
            let target = share
                .album
                .as_ref()
                .map(|a| a.name.as_str())
                .or_else(|| share.music.as_ref().map(|m| m.name.as_str()))
                .or_else(|| share.artist.as_ref().map(|a| a.name.as_str()))
                .unwrap_or("something");
            println!("{}  @{} shared {}", when, share.user.username, target);
            if let Some(comment) = share.comment.as_deref().filter(|c| !c.is_empty()) {
                println!("    {}", comment);
            }
        }
        _ => println!("{}  {:?}", when, item.kind),
    }
}

pub async fn handle(args: FeedArgs, session: &CliSession, output_format: OutputFormat) -> anyhow::Result<()> {
    let activity = &session.app.activity;

    match args.cmd {
        Some(FeedCommands::User { id }) => {
            let items = activity.user_activity(&id).await?;
            if items.is_empty() {
                return output_empty_collection(&output_format, "items", "No activity yet");
            }
            match output_format {
                OutputFormat::Json => output_json(&items),
                OutputFormat::Text => {
                    items.iter().for_each(print_item);
                    Ok(())
                }
            }
        }
        None => {
            let page = activity
                .feed(&FeedParams {
                    limit: args.limit,
                    cursor: args.cursor,
                })
                .await?;

            match output_format {
                OutputFormat::Json => output_json(&page),
                OutputFormat::Text => {
                    if page.data.is_empty() {
                        println!("Nothing new in your feed");
                    }
                    page.data.iter().for_each(print_item);
                    if let Some(cursor) = page.next_cursor.as_deref().filter(|_| page.has_more) {
                        println!();
                        println!("More: salbum feed --cursor {}", cursor);
                    }
                    Ok(())
                }
            }
        }
    }
}
