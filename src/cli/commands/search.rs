use clap::Args;

use crate::cli::config::CliSession;
use crate::cli::utils::{output_empty_collection, output_json};
use crate::cli::OutputFormat;
use crate::types::catalog::{SearchParams, SearchResults};
use crate::types::{ArtistInfo, ItemKind};

#[derive(Args)]
pub struct SearchArgs {
    #[arg(help = "Search text")]
    pub query: String,

    #[arg(long, help = "album, music or artist")]
    pub kind: Option<ItemKind>,

    #[arg(long, help = "Narrow results to an artist name")]
    pub artist: Option<String>,

    #[arg(long, help = "Bypass the server cache")]
    pub force: bool,
}

fn artist_names(artists: &[ArtistInfo]) -> String {
    artists.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ")
}

pub async fn handle(args: SearchArgs, session: &CliSession, output_format: OutputFormat) -> anyhow::Result<()> {
    let params = SearchParams {
        query: args.query,
        kind: args.kind.map(Into::into),
        artist: args.artist,
        force: args.force,
    };
    let results = session.app.catalog.search(&params).await?;

    if results.is_empty() {
        return output_empty_collection(&output_format, "data", "No results");
    }

    match output_format {
        OutputFormat::Json => output_json(&results),
        OutputFormat::Text => {
            match &results {
                SearchResults::Album(albums) => {
                    for album in albums {
                        println!("{:<24} {} - {}", album.id, album.name, artist_names(&album.artists));
                    }
                }
                SearchResults::Music(tracks) => {
                    for track in tracks {
                        println!("{:<24} {} - {}", track.id, track.name, artist_names(&track.artists));
                    }
                }
                SearchResults::Artist(artists) => {
                    for artist in artists {
                        println!("{:<24} {}", artist.id, artist.name);
                    }
                }
            }
            Ok(())
        }
    }
}
