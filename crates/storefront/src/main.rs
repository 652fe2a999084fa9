//! `packbuilder` — interactive pack-building storefront.
//!
//! Loads the catalog once at startup, then applies one engine operation per
//! line of user input, re-rendering after each mutation.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use packbuilder_catalog::Catalog;
use packbuilder_core::ProductId;
use packbuilder_storefront::icons::IconSet;
use packbuilder_storefront::{render, StorefrontSession};

const USAGE: &str = "commands: + <product-id> | - <product-id> | show | quit";

fn main() -> Result<()> {
    packbuilder_observability::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "data/catalog.json".to_string());

    // One-shot load; an unreadable catalog degrades to an empty storefront
    // rather than aborting.
    let catalog = match Catalog::from_path(&path) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(%err, path = %path, "catalog unavailable; starting with no products");
            Catalog::empty()
        }
    };

    let icons = IconSet::standard().resolve(&catalog);
    let mut session = StorefrontSession::new(catalog);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", render::render(&session.view(), &icons))?;
    writeln!(out, "{USAGE}")?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("+") | Some("add"), Some(id)) => {
                if let Err(err) = session.increment(&ProductId::new(id)) {
                    writeln!(out, "{err}")?;
                }
                writeln!(out, "{}", render::render(&session.view(), &icons))?;
            }
            (Some("-") | Some("remove"), Some(id)) => {
                if let Err(err) = session.decrement(&ProductId::new(id)) {
                    writeln!(out, "{err}")?;
                }
                writeln!(out, "{}", render::render(&session.view(), &icons))?;
            }
            (Some("show"), _) => {
                writeln!(out, "{}", render::render(&session.view(), &icons))?;
            }
            (Some("quit") | Some("q") | Some("exit"), _) => break,
            (None, _) => {}
            _ => writeln!(out, "{USAGE}")?,
        }
    }

    Ok(())
}
