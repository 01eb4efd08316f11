//! Restaurant menu management commands.

use clap::Subcommand;
use tracing::{info, warn};

use tiffin_client::guard::{CapabilityRequirement, Decision, evaluate};
use tiffin_client::menu::{MenuItemPatch, NewMenuItem};
use tiffin_client::state::App;
use tiffin_core::{MenuItemId, Price};

#[derive(Subcommand)]
pub enum MenuAction {
    /// Create a menu item
    Create {
        /// Display name
        #[arg(long)]
        name: String,

        /// Description shown on the menu page
        #[arg(long, default_value = "")]
        description: String,

        /// Unit price in cents
        #[arg(long)]
        price_cents: i64,

        /// Menu category
        #[arg(long)]
        category: Option<String>,
    },
    /// Update a menu item
    Update {
        /// Menu item ID
        id: String,

        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New unit price in cents
        #[arg(long)]
        price_cents: Option<i64>,

        /// New category
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a menu item
    Delete {
        /// Menu item ID
        id: String,
    },
}

pub async fn run(app: &mut App, action: MenuAction) -> Result<(), Box<dyn std::error::Error>> {
    // Menu management is an admin surface.
    match evaluate(app.session().session(), &CapabilityRequirement::admin()) {
        Decision::Allow => {}
        Decision::Redirect { target, reason } => {
            warn!("access denied ({reason:?}), go to {target}");
            return Ok(());
        }
        Decision::Checking => {
            warn!("session still resolving, try again");
            return Ok(());
        }
    }

    match action {
        MenuAction::Create {
            name,
            description,
            price_cents,
            category,
        } => {
            let item = NewMenuItem {
                name,
                description,
                price: Price::from_cents(price_cents),
                image_url: None,
                category,
            };
            let created = app.menus_mut().create(&item).await?;
            info!("created menu item {} ({})", created.name, created.id);
        }
        MenuAction::Update {
            id,
            name,
            price_cents,
            category,
        } => {
            let patch = MenuItemPatch {
                name,
                description: None,
                price: price_cents.map(Price::from_cents),
                image_url: None,
                category,
            };
            let updated = app
                .menus_mut()
                .update(&MenuItemId::new(id), &patch)
                .await?;
            info!("updated menu item {} ({})", updated.name, updated.id);
        }
        MenuAction::Delete { id } => {
            app.menus_mut().delete(&MenuItemId::new(id)).await?;
            info!("menu item deleted");
        }
    }
    Ok(())
}
