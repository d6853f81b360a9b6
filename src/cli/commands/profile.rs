use clap::Subcommand;

use crate::cli::config::CliSession;
use crate::cli::utils::output_user;
use crate::cli::OutputFormat;
use crate::types::UpdateProfileRequest;

#[derive(Subcommand)]
pub enum ProfileCommands {
    #[command(about = "Show your profile")]
    Show,

    #[command(about = "Update profile fields")]
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        #[arg(long = "image-url", conflicts_with = "clear_image")]
        image_url: Option<String>,
        #[arg(long = "clear-image", help = "Remove the profile image")]
        clear_image: bool,
    },
}

pub async fn handle(cmd: ProfileCommands, session: &CliSession, output_format: OutputFormat) -> anyhow::Result<()> {
    let auth = &session.app.auth;

    match cmd {
        ProfileCommands::Show => {
            let user = auth.reload_profile().await?;
            output_user(&output_format, &user)
        }
        ProfileCommands::Update {
            name,
            username,
            bio,
            image_url,
            clear_image,
        } => {
            let image_url = if clear_image { Some(None) } else { image_url.map(Some) };
            let fields = UpdateProfileRequest {
                name,
                username,
                bio,
                image_url,
            };
            if fields.is_empty() {
                anyhow::bail!("Nothing to update. Pass at least one of --name, --username, --bio, --image-url or --clear-image.");
            }
            let user = auth.update_profile(&fields).await?;
            output_user(&output_format, &user)
        }
    }
}
