//! Cart commands.

use clap::Subcommand;
use tracing::{info, warn};

use tiffin_client::cart::CartItem;
use tiffin_client::guard::{CapabilityRequirement, Decision, evaluate};
use tiffin_client::state::App;
use tiffin_core::{MenuItemId, Price, RestaurantId};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart contents
    Show,
    /// Add an item (replaces the cart when the restaurant changes)
    Add {
        /// Menu item ID
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Unit price in cents
        #[arg(long)]
        price_cents: i64,

        /// Restaurant the item belongs to
        #[arg(long)]
        restaurant: String,
    },
    /// Increase an item's quantity by one
    Increment {
        /// Menu item ID
        id: String,
    },
    /// Decrease an item's quantity by one (floors at 1)
    Decrement {
        /// Menu item ID
        id: String,
    },
    /// Remove an item entirely
    Remove {
        /// Menu item ID
        id: String,
    },
    /// Empty the cart
    Clear,
    /// Create a payment checkout session for the cart
    Checkout,
    /// Record checkout completion and clear the cart
    Confirm,
}

pub async fn run(app: &mut App, action: CartAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CartAction::Show => show(app),
        CartAction::Add {
            id,
            name,
            price_cents,
            restaurant,
        } => {
            let item = CartItem {
                id: MenuItemId::new(id),
                name,
                unit_price: Price::from_cents(price_cents),
                image_url: None,
            };
            app.cart_mut()
                .add_item(item, Some(RestaurantId::new(restaurant)));
            show(app);
        }
        CartAction::Increment { id } => {
            app.cart_mut().increment_quantity(&MenuItemId::new(id));
            show(app);
        }
        CartAction::Decrement { id } => {
            app.cart_mut().decrement_quantity(&MenuItemId::new(id));
            show(app);
        }
        CartAction::Remove { id } => {
            app.cart_mut().remove_item(&MenuItemId::new(id));
            show(app);
        }
        CartAction::Clear => {
            app.cart_mut().clear();
            info!("cart cleared");
        }
        CartAction::Checkout => {
            // Checkout is a protected surface: an unauthenticated session is
            // sent to login instead of the payment provider.
            match evaluate(
                app.session().session(),
                &CapabilityRequirement::authenticated(),
            ) {
                Decision::Allow => {
                    if app.cart().is_empty() {
                        warn!("cart is empty, nothing to check out");
                        return Ok(());
                    }
                    let url = app.create_checkout().await?;
                    info!("checkout session created, complete payment at: {url}");
                    info!("run `tiffin cart confirm` after payment completes");
                }
                Decision::Redirect { target, reason } => {
                    warn!("access denied ({reason:?}), go to {target}");
                }
                Decision::Checking => {
                    warn!("session still resolving, try again");
                }
            }
        }
        CartAction::Confirm => {
            app.confirm_checkout();
            info!("order confirmed, cart cleared");
        }
    }
    Ok(())
}

fn show(app: &App) {
    let cart = app.cart();
    if cart.is_empty() {
        info!("cart is empty");
        return;
    }

    if let Some(restaurant) = cart.active_restaurant_id() {
        info!("ordering from restaurant {restaurant}");
    }
    for line in cart.lines() {
        info!(
            "{} x{} @ {} = {}",
            line.item.name,
            line.quantity,
            line.item.unit_price,
            line.line_total()
        );
    }
    info!(
        "subtotal: {} ({} items)",
        cart.subtotal(),
        cart.total_quantity()
    );
}
