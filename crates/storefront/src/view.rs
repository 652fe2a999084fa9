//! Pure view-model derivation.
//!
//! Nothing in here is stored: every render derives counts, affordances, and
//! totals from the selection and the catalog, so the display can never drift
//! from engine state.

use packbuilder_catalog::{PackSection, Price, Product};
use packbuilder_selection::QUOTA_MAX;

use crate::session::StorefrontSession;

/// Bundle price for a completed pack, shown against the combined list price.
pub const PACK_PRICE: Price = Price::from_milli(33_990);

/// Visual emphasis of a product card.
///
/// `Dimmed` reproduces the sold-out look: quota exhausted and no units of
/// this product in the pack. `Selected` marks products with at least one
/// unit. Everything else renders `Normal`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CardEmphasis {
    Normal,
    Selected,
    Dimmed,
}

/// One product card with its per-product state.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCard<'a> {
    pub product: &'a Product,
    pub count: usize,
    pub can_increment: bool,
    pub can_decrement: bool,
    pub emphasis: CardEmphasis,
}

/// One pack-section heading and its cards, in catalog order.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionView<'a> {
    pub section: PackSection,
    pub cards: Vec<ProductCard<'a>>,
}

/// The cart: positional slots in insertion order plus the derived totals.
#[derive(Debug, Clone, PartialEq)]
pub struct CartView<'a> {
    pub slots: [Option<&'a Product>; QUOTA_MAX],
    pub remaining_quota: usize,
    /// Combined list price of the units currently selected.
    pub list_total: Price,
    pub pack_price: Price,
    /// The checkout affordance unlocks exactly when the pack is full.
    pub can_add_to_cart: bool,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontView<'a> {
    pub sections: Vec<SectionView<'a>>,
    pub cart: CartView<'a>,
}

impl StorefrontSession {
    /// Derive the full view for the current state.
    pub fn view(&self) -> StorefrontView<'_> {
        let selection = self.selection();
        let catalog = self.catalog();
        let remaining = selection.remaining_quota();

        let sections = PackSection::ALL
            .into_iter()
            .map(|section| SectionView {
                section,
                cards: catalog
                    .section(section)
                    .map(|product| {
                        let count = selection.count_for(&product.id);
                        let emphasis = if count > 0 {
                            CardEmphasis::Selected
                        } else if remaining == 0 {
                            CardEmphasis::Dimmed
                        } else {
                            CardEmphasis::Normal
                        };
                        ProductCard {
                            product,
                            count,
                            can_increment: selection.can_increment(&product.id),
                            can_decrement: selection.can_decrement(&product.id),
                            emphasis,
                        }
                    })
                    .collect(),
            })
            .collect();

        let list_total = selection
            .units()
            .iter()
            .filter_map(|id| catalog.get(id))
            .fold(Price::ZERO, |total, product| total.add(product.price));

        let cart = CartView {
            slots: selection.slots().map(|slot| slot.and_then(|id| catalog.get(id))),
            remaining_quota: remaining,
            list_total,
            pack_price: PACK_PRICE,
            can_add_to_cart: selection.is_complete(),
        };

        StorefrontView { sections, cart }
    }
}
