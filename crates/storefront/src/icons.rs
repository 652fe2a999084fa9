//! The fixed icon set and its load-time resolution.
//!
//! The catalog only carries icon *keys*; which glyph a key maps to is decided
//! here, once, when the catalog is loaded — never per render.

use std::collections::HashMap;

use packbuilder_catalog::{Catalog, IconKey};
use packbuilder_core::ProductId;

const FALLBACK_GLYPH: &str = "◦";

/// The fixed set of icons the storefront can render.
#[derive(Debug, Clone)]
pub struct IconSet {
    glyphs: HashMap<IconKey, &'static str>,
}

impl IconSet {
    /// The standard storefront icon set.
    pub fn standard() -> Self {
        let glyphs = [
            ("Leaf", "☘"),
            ("Flower", "✿"),
            ("Tree", "🌲"),
            ("Sun", "☀"),
            ("Moon", "☾"),
            ("Wave", "🌊"),
            ("Mountain", "⛰"),
            ("Snow", "❄"),
            ("Star", "★"),
        ]
        .into_iter()
        .map(|(key, glyph)| (IconKey::new(key), glyph))
        .collect();

        Self { glyphs }
    }

    /// The glyph for one key; unknown keys fall back to a neutral marker.
    pub fn glyph(&self, key: &IconKey) -> &'static str {
        self.glyphs.get(key).copied().unwrap_or(FALLBACK_GLYPH)
    }

    /// Resolve every catalog product's icon up front.
    pub fn resolve(&self, catalog: &Catalog) -> ResolvedIcons {
        let glyphs = catalog
            .products()
            .iter()
            .map(|product| (product.id.clone(), self.glyph(&product.icon)))
            .collect();

        ResolvedIcons { glyphs }
    }
}

/// Per-product glyphs, fixed for the session.
#[derive(Debug, Clone)]
pub struct ResolvedIcons {
    glyphs: HashMap<ProductId, &'static str>,
}

impl ResolvedIcons {
    pub fn for_product(&self, id: &ProductId) -> &'static str {
        self.glyphs.get(id).copied().unwrap_or(FALLBACK_GLYPH)
    }
}
