//! Session and account commands.

use clap::Subcommand;
use tracing::info;

use tiffin_client::session::{Credentials, NewAccount};
use tiffin_client::state::App;
use tiffin_core::{Email, IdentityPatch};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Show the session state resolved by the bootstrap check
    Check,
    /// Log in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Register a new account (also logs in)
    Signup {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Log out
    Logout,
    /// Confirm the email verification code
    Verify {
        /// Verification code from the email
        code: String,
    },
    /// Update the profile display name
    Rename {
        /// New display name
        name: String,
    },
}

pub async fn run(app: &mut App, action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Check => report(app),
        AuthAction::Login { email, password } => {
            let credentials = Credentials::new(Email::parse(&email)?, password);
            app.session_mut().login(&credentials).await?;
            info!("logged in");
            report(app);
        }
        AuthAction::Signup {
            name,
            email,
            password,
        } => {
            let account = NewAccount {
                name,
                email: Email::parse(&email)?,
                password: password.into(),
            };
            app.session_mut().signup(&account).await?;
            info!("account created");
            report(app);
        }
        AuthAction::Logout => {
            app.session_mut().logout().await?;
            info!("logged out");
        }
        AuthAction::Verify { code } => {
            app.session_mut().verify_identity(&code).await?;
            info!("email verified");
        }
        AuthAction::Rename { name } => {
            let patch = IdentityPatch {
                name: Some(name),
                avatar_url: None,
            };
            app.session_mut().update_identity(&patch).await?;
            report(app);
        }
    }
    Ok(())
}

fn report(app: &App) {
    let session = app.session().session();
    match session.identity() {
        Some(identity) => info!(
            "authenticated as {} <{}> (verified: {}, admin: {})",
            identity.name, identity.email, identity.verified, identity.is_admin
        ),
        None => info!("not authenticated"),
    }
}
