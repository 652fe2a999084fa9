use serde::{Deserialize, Serialize};

use packbuilder_core::{DomainError, ProductId, ValueObject};

/// The fixed set of pack sections a product belongs to.
///
/// Serialized exactly as the catalog payload tags them (`type1`..`type3`);
/// displayed with the storefront section headings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PackSection {
    #[serde(rename = "type1")]
    One,
    #[serde(rename = "type2")]
    Two,
    #[serde(rename = "type3")]
    Three,
}

impl PackSection {
    /// All sections, in display order.
    pub const ALL: [PackSection; 3] = [PackSection::One, PackSection::Two, PackSection::Three];

    pub fn title(&self) -> &'static str {
        match self {
            PackSection::One => "Pack Section 1",
            PackSection::Two => "Pack Section 2",
            PackSection::Three => "Pack Section 3",
        }
    }
}

impl core::fmt::Display for PackSection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.title())
    }
}

/// Text key into the fixed icon set.
///
/// The catalog only carries the key; resolving it to a rendering capability
/// happens once at load time in the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconKey(String);

impl IconKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for IconKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueObject for IconKey {}

/// Unit price in currency units with three decimal places.
///
/// Stored as an integer count of thousandths of the currency unit, so
/// arithmetic stays exact; the payload's decimal number is converted on the
/// serde boundary.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    /// Construct from thousandths of the currency unit (e.g. 13_990 == 13.99).
    pub const fn from_milli(milli: u64) -> Self {
        Self(milli)
    }

    pub const fn milli(&self) -> u64 {
        self.0
    }

    pub const fn add(self, other: Price) -> Price {
        Price(self.0 + other.0)
    }
}

impl ValueObject for Price {}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(DomainError::validation("price must be a finite number"));
        }
        if value < 0.0 {
            return Err(DomainError::validation("price cannot be negative"));
        }
        Ok(Self((value * 1000.0).round() as u64))
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0 as f64 / 1000.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let units = self.0 / 1000;
        let milli = self.0 % 1000;
        if milli % 10 == 0 {
            write!(f, "{units}.{:02}", milli / 10)
        } else {
            write!(f, "{units}.{milli:03}")
        }
    }
}

/// One product record as supplied by the catalog payload.
///
/// Immutable once loaded. Field names follow the payload schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(rename = "productName")]
    pub name: String,
    #[serde(rename = "productType")]
    pub section: PackSection,
    #[serde(rename = "productIcon")]
    pub icon: IconKey,
    pub price: Price,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_section_round_trips_payload_tags() {
        for (section, tag) in [
            (PackSection::One, "\"type1\""),
            (PackSection::Two, "\"type2\""),
            (PackSection::Three, "\"type3\""),
        ] {
            assert_eq!(serde_json::to_string(&section).unwrap(), tag);
            assert_eq!(
                serde_json::from_str::<PackSection>(tag).unwrap(),
                section
            );
        }
    }

    #[test]
    fn price_converts_decimal_payload_to_thousandths() {
        let price: Price = serde_json::from_str("13.99").unwrap();
        assert_eq!(price, Price::from_milli(13_990));

        let three_places: Price = serde_json::from_str("41.977").unwrap();
        assert_eq!(three_places, Price::from_milli(41_977));
    }

    #[test]
    fn price_rejects_negative_values() {
        let err = serde_json::from_str::<Price>("-1.0").unwrap_err();
        assert!(err.to_string().contains("price cannot be negative"));
    }

    #[test]
    fn price_display_trims_the_trailing_thousandth() {
        assert_eq!(Price::from_milli(33_990).to_string(), "33.99");
        assert_eq!(Price::from_milli(41_977).to_string(), "41.977");
        assert_eq!(Price::from_milli(7_000).to_string(), "7.00");
    }

    #[test]
    fn product_parses_a_payload_record() {
        let record = r#"{
            "_id": "lav-01",
            "productName": "Lavender Sage",
            "productType": "type1",
            "productIcon": "Flower",
            "price": 13.99
        }"#;

        let product: Product = serde_json::from_str(record).unwrap();
        assert_eq!(product.id, ProductId::new("lav-01"));
        assert_eq!(product.name, "Lavender Sage");
        assert_eq!(product.section, PackSection::One);
        assert_eq!(product.icon, IconKey::new("Flower"));
        assert_eq!(product.price, Price::from_milli(13_990));
    }
}
