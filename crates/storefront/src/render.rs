//! Plain-text rendering of a storefront view.

use std::fmt::Write;

use crate::icons::ResolvedIcons;
use crate::view::{CardEmphasis, StorefrontView};

/// Render one frame of the storefront as plain text.
pub fn render(view: &StorefrontView<'_>, icons: &ResolvedIcons) -> String {
    let mut out = String::new();

    for section in &view.sections {
        let _ = writeln!(out, "{}", section.section.title());
        if section.cards.is_empty() {
            let _ = writeln!(out, "  (no products available)");
            continue;
        }
        for card in &section.cards {
            let marker = match card.emphasis {
                CardEmphasis::Selected => "*",
                CardEmphasis::Dimmed => "x",
                CardEmphasis::Normal => " ",
            };
            let _ = writeln!(
                out,
                "  {marker} [{}] {} {}  ${}",
                card.count,
                icons.for_product(&card.product.id),
                card.product.name,
                card.product.price,
            );
        }
    }

    let _ = writeln!(out, "Build Your Pack");
    let slots: String = view
        .cart
        .slots
        .iter()
        .map(|slot| match slot {
            Some(product) => format!("[{}]", icons.for_product(&product.id)),
            None => "[ ]".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "  {slots}   {} left", view.cart.remaining_quota);
    let _ = writeln!(
        out,
        "  list ${}  pack ${}",
        view.cart.list_total, view.cart.pack_price
    );
    let _ = writeln!(
        out,
        "  Add to Cart: {}",
        if view.cart.can_add_to_cart {
            "ready"
        } else {
            "fill the pack first"
        }
    );

    out
}
