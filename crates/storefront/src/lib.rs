//! Storefront: the presentation layer around the selection engine.
//!
//! Everything here is a collaborator of the engine, never its owner of
//! record for cart state: the session routes each user interaction through
//! the engine's two operations, and every piece of UI state (counts,
//! affordances, cart slots, totals) is derived fresh from the engine on each
//! render.

pub mod icons;
pub mod render;
pub mod session;
pub mod view;

pub use session::{SessionError, StorefrontSession};
pub use view::{CardEmphasis, CartView, ProductCard, SectionView, StorefrontView, PACK_PRICE};
