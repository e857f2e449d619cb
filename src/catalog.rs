//! Product catalog consulted by the routine rules.
//!
//! Every rule branch selects a [`ProductSlot`]; the catalog maps each slot to
//! a concrete product. A catalog always has an entry for every slot, so
//! lookups cannot fail once one has been built.

use crate::error::{Result, SkinRoutineError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A recommendable product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tip: Option<String>,
}

impl Product {
    fn new(id: &str, name: &str, tip: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tip: tip.map(str::to_string),
        }
    }
}

/// Mnemonic key a rule selects a product by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSlot {
    GentleCleanser,
    FoamingCleanser,
    VitaminC,
    SalicylicAcid,
    GlycolicAcid,
    HydratingSerum,
    Retinol,
    SimpleMoisturizer,
    LightMoisturizer,
    Spf50,
}

impl ProductSlot {
    pub const ALL: [ProductSlot; 10] = [
        ProductSlot::GentleCleanser,
        ProductSlot::FoamingCleanser,
        ProductSlot::VitaminC,
        ProductSlot::SalicylicAcid,
        ProductSlot::GlycolicAcid,
        ProductSlot::HydratingSerum,
        ProductSlot::Retinol,
        ProductSlot::SimpleMoisturizer,
        ProductSlot::LightMoisturizer,
        ProductSlot::Spf50,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProductSlot::GentleCleanser => "gentle_cleanser",
            ProductSlot::FoamingCleanser => "foaming_cleanser",
            ProductSlot::VitaminC => "vitamin_c",
            ProductSlot::SalicylicAcid => "salicylic_acid",
            ProductSlot::GlycolicAcid => "glycolic_acid",
            ProductSlot::HydratingSerum => "hydrating_serum",
            ProductSlot::Retinol => "retinol",
            ProductSlot::SimpleMoisturizer => "simple_moisturizer",
            ProductSlot::LightMoisturizer => "light_moisturizer",
            ProductSlot::Spf50 => "spf50",
        }
    }

    /// Parse a slot name, suggesting the closest known name on failure.
    pub fn parse(name: &str) -> Result<Self> {
        if let Some(slot) = Self::ALL.iter().find(|s| s.as_str() == name) {
            return Ok(*slot);
        }
        let closest = Self::ALL
            .iter()
            .map(|s| (s.as_str(), strsim::jaro_winkler(name, s.as_str())))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(n, _)| n)
            .unwrap_or("gentle_cleanser");
        Err(SkinRoutineError::Catalog {
            message: format!("unknown product slot '{}'. Did you mean '{}'?", name, closest),
        })
    }
}

impl fmt::Display for ProductSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable slot → product table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    // Indexed by `ProductSlot as usize`.
    products: Vec<Product>,
}

static BUILTIN: Lazy<Arc<Catalog>> = Lazy::new(|| {
    Arc::new(Catalog {
        products: vec![
            Product::new("p1", "CeraVe Hydrating Cleanser", None),
            Product::new("p2", "La Roche-Posay Foaming Cleanser", None),
            Product::new(
                "p3",
                "Timeless 20% Vitamin C + E Ferulic Acid Serum",
                Some("A powerful antioxidant for brightness and protection."),
            ),
            Product::new(
                "p4",
                "Paula's Choice 2% BHA Liquid Exfoliant",
                Some("Clinically proven to unclog pores and fight breakouts."),
            ),
            Product::new(
                "p5",
                "The Ordinary Glycolic Acid 7% Toning Solution",
                Some("An AHA that exfoliates the skin surface for radiance."),
            ),
            Product::new(
                "p6",
                "The Ordinary Hyaluronic Acid 2% + B5",
                Some("Helps your skin attract and hold on to moisture."),
            ),
            Product::new(
                "p7",
                "CeraVe Resurfacing Retinol Serum",
                Some("Excellent for targeting fine lines and uneven texture."),
            ),
            Product::new(
                "p8",
                "CeraVe Moisturizing Cream",
                Some("With ceramides to support your skin's natural barrier."),
            ),
            Product::new(
                "p9",
                "Neutrogena Hydro Boost Water Gel",
                Some("A lightweight, oil-free option for hydration."),
            ),
            Product::new(
                "p10",
                "Supergoop! Unseen Sunscreen SPF 50",
                Some("The most important step to protect your skin every day."),
            ),
        ],
    })
});

impl Catalog {
    /// The default product table, shared.
    pub fn builtin() -> Arc<Catalog> {
        BUILTIN.clone()
    }

    /// Build a catalog from an explicit table. Every slot must be present.
    pub fn from_entries(entries: HashMap<ProductSlot, Product>) -> Result<Self> {
        let mut products = Vec::with_capacity(ProductSlot::ALL.len());
        let mut missing = Vec::new();
        for slot in ProductSlot::ALL {
            match entries.get(&slot) {
                Some(p) => {
                    validate_product(slot, p)?;
                    products.push(p.clone());
                }
                None => missing.push(slot.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(SkinRoutineError::Catalog {
                message: format!("catalog is missing slots: {}", missing.join(", ")),
            });
        }
        Ok(Self { products })
    }

    /// Copy of this catalog with the named slots replaced.
    pub fn with_overrides(&self, overrides: &HashMap<String, Product>) -> Result<Self> {
        let mut next = self.clone();
        for (name, product) in overrides {
            let slot = ProductSlot::parse(name)?;
            validate_product(slot, product)?;
            next.products[slot.index()] = product.clone();
        }
        Ok(next)
    }

    pub fn get(&self, slot: ProductSlot) -> &Product {
        &self.products[slot.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProductSlot, &Product)> {
        ProductSlot::ALL.into_iter().zip(self.products.iter())
    }
}

fn validate_product(slot: ProductSlot, product: &Product) -> Result<()> {
    if product.id.trim().is_empty() || product.name.trim().is_empty() {
        return Err(SkinRoutineError::Catalog {
            message: format!("product for slot '{}' needs a non-empty id and name", slot),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_slot() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.iter().count(), ProductSlot::ALL.len());
        assert_eq!(catalog.get(ProductSlot::GentleCleanser).id, "p1");
        assert_eq!(catalog.get(ProductSlot::Spf50).id, "p10");
        assert!(catalog.get(ProductSlot::FoamingCleanser).tip.is_none());
    }

    #[test]
    fn test_slot_names_round_trip() {
        for slot in ProductSlot::ALL {
            assert_eq!(ProductSlot::parse(slot.as_str()).unwrap(), slot);
            let json = serde_json::to_string(&slot).unwrap();
            assert_eq!(json, format!("\"{}\"", slot.as_str()));
        }
    }

    #[test]
    fn test_unknown_slot_suggests_nearest() {
        let err = ProductSlot::parse("vitamin_see").unwrap_err().to_string();
        assert!(err.contains("Did you mean 'vitamin_c'"), "{}", err);
    }

    #[test]
    fn test_overrides_replace_only_named_slots() {
        let mut overrides = HashMap::new();
        overrides.insert(
            "spf50".to_string(),
            Product::new("x1", "House Mineral SPF 50", None),
        );
        let catalog = Catalog::builtin().with_overrides(&overrides).unwrap();
        assert_eq!(catalog.get(ProductSlot::Spf50).name, "House Mineral SPF 50");
        assert_eq!(
            catalog.get(ProductSlot::Retinol),
            Catalog::builtin().get(ProductSlot::Retinol)
        );
    }

    #[test]
    fn test_override_rejects_blank_name() {
        let mut overrides = HashMap::new();
        overrides.insert("retinol".to_string(), Product::new("p7", " ", None));
        assert!(Catalog::builtin().with_overrides(&overrides).is_err());
    }

    #[test]
    fn test_from_entries_requires_all_slots() {
        let mut entries: HashMap<ProductSlot, Product> = Catalog::builtin()
            .iter()
            .map(|(s, p)| (s, p.clone()))
            .collect();
        assert!(Catalog::from_entries(entries.clone()).is_ok());

        entries.remove(&ProductSlot::GlycolicAcid);
        let err = Catalog::from_entries(entries).unwrap_err().to_string();
        assert!(err.contains("glycolic_acid"));
    }
}
