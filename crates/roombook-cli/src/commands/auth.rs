use clap::Subcommand;

use super::{integration, print_json, CmdResult};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Print the Google consent URL
    Url {
        /// Also open it in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Exchange the authorization code from the redirect for tokens
    Callback {
        /// Value of the `code` query parameter
        code: String,
    },
}

pub async fn run(action: AuthAction) -> CmdResult {
    let integration = integration()?;
    match action {
        AuthAction::Url { open } => {
            let url = integration.get_auth_url();
            println!("{url}");
            if open {
                open::that(&url)?;
            }
        }
        AuthAction::Callback { code } => {
            let tokens = integration.handle_callback(&code).await?;
            eprintln!("Google authenticated; pass --access-token to later commands");
            print_json(&tokens)?;
        }
    }
    Ok(())
}
