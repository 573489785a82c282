//! Subcommands and their mapping onto Cart Store operations.

use clap::Subcommand;
use marketplace_cart::{CartStore, CartView};
use marketplace_core::{Money, ProductCandidate};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the cart
    Show,

    /// Add a product, or bump its quantity if already in the cart
    Add {
        /// Product identifier
        #[arg(long)]
        id: String,

        /// Display title
        #[arg(long)]
        title: String,

        /// Image URI
        #[arg(long)]
        image_url: String,

        /// Unit price in major units (e.g. 12.5)
        #[arg(long, value_parser = parse_price)]
        price: Money,
    },

    /// Quantity += 1
    Increment { id: String },

    /// Quantity -= 1 (never below zero)
    Decrement { id: String },

    /// Drop a line entirely
    Remove { id: String },

    /// Empty the cart
    Clear,
}

/// Runs one command and returns the resulting view.
pub fn run(store: &CartStore, command: Command) -> CartView {
    match command {
        Command::Show => store.view(),
        Command::Add {
            id,
            title,
            image_url,
            price,
        } => store.add_to_cart(ProductCandidate::new(id, title, image_url, price)),
        Command::Increment { id } => store.increment(&id),
        Command::Decrement { id } => store.decrement(&id),
        Command::Remove { id } => store.remove(&id),
        Command::Clear => store.clear(),
    }
}

fn parse_price(raw: &str) -> Result<Money, String> {
    let amount: f64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a number"))?;

    if amount < 0.0 {
        return Err("price must not be negative".to_string());
    }

    Money::from_major_f64(amount).ok_or_else(|| format!("'{raw}' is not a finite amount"))
}
