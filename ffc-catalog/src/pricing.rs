use crate::materials::{FulfillmentMode, Material, SizeClass};
use serde::{Deserialize, Serialize};

/// Price tables for the quote calculator. All amounts in integer cents.
///
/// Loaded from the layered config so the operator can adjust prices without
/// a rebuild; `Default` carries the shop's current rate card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Base price for a small organizer
    #[serde(default = "default_base_small")]
    pub base_small_cents: i32,

    /// Base price for a medium organizer
    #[serde(default = "default_base_medium")]
    pub base_medium_cents: i32,

    /// Base price for a full-drawer organizer
    #[serde(default = "default_base_full_drawer")]
    pub base_full_drawer_cents: i32,

    /// Multiplier applied to the base price for PLA+
    #[serde(default = "default_pla_plus_multiplier")]
    pub pla_plus_multiplier: f64,

    /// Multiplier applied to the base price for PETG
    #[serde(default = "default_petg_multiplier")]
    pub petg_multiplier: f64,

    /// Flat fee for rush turnaround
    #[serde(default = "default_rush_fee")]
    pub rush_fee_cents: i32,

    /// Flat fee for custom CAD design work beyond the photo scan
    #[serde(default = "default_cad_fee")]
    pub cad_design_fee_cents: i32,

    /// Shipping when the shop prints and mails the part itself
    #[serde(default = "default_shipping_self")]
    pub shipping_self_cents: i32,

    /// Shipping passed through when the cloud vendor ships direct
    #[serde(default = "default_shipping_cloud")]
    pub shipping_cloud_cents: i32,
}

fn default_base_small() -> i32 { 1800 }
fn default_base_medium() -> i32 { 2800 }
fn default_base_full_drawer() -> i32 { 4500 }
fn default_pla_plus_multiplier() -> f64 { 1.10 }
fn default_petg_multiplier() -> f64 { 1.25 }
fn default_rush_fee() -> i32 { 1000 }
fn default_cad_fee() -> i32 { 1500 }
fn default_shipping_self() -> i32 { 650 }
fn default_shipping_cloud() -> i32 { 800 }

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_small_cents: default_base_small(),
            base_medium_cents: default_base_medium(),
            base_full_drawer_cents: default_base_full_drawer(),
            pla_plus_multiplier: default_pla_plus_multiplier(),
            petg_multiplier: default_petg_multiplier(),
            rush_fee_cents: default_rush_fee(),
            cad_design_fee_cents: default_cad_fee(),
            shipping_self_cents: default_shipping_self(),
            shipping_cloud_cents: default_shipping_cloud(),
        }
    }
}

/// Itemized result of a quote calculation, in cents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceBreakdown {
    pub base_cents: i32,
    pub addons_cents: i32,
    pub shipping_cents: i32,
    pub total_cents: i32,
}

/// Pure quote calculator over the configured rate card
#[derive(Debug, Clone)]
pub struct QuoteCalculator {
    config: PricingConfig,
}

impl QuoteCalculator {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    /// Price an organizer. No I/O, no state; the same inputs always produce
    /// the same breakdown.
    pub fn quote(
        &self,
        material: Material,
        size: SizeClass,
        mode: FulfillmentMode,
        rush: bool,
        cad_design: bool,
    ) -> PriceBreakdown {
        let size_base = match size {
            SizeClass::Small => self.config.base_small_cents,
            SizeClass::Medium => self.config.base_medium_cents,
            SizeClass::FullDrawer => self.config.base_full_drawer_cents,
        };

        let multiplier = match material {
            Material::Pla => 1.0,
            Material::PlaPlus => self.config.pla_plus_multiplier,
            Material::Petg => self.config.petg_multiplier,
        };

        let base_cents = (size_base as f64 * multiplier).round() as i32;

        let mut addons_cents = 0;
        if rush {
            addons_cents += self.config.rush_fee_cents;
        }
        if cad_design {
            addons_cents += self.config.cad_design_fee_cents;
        }

        let shipping_cents = match mode {
            FulfillmentMode::SelfPrint => self.config.shipping_self_cents,
            FulfillmentMode::Cloud => self.config.shipping_cloud_cents,
        };

        PriceBreakdown {
            base_cents,
            addons_cents,
            shipping_cents,
            total_cents: base_cents + addons_cents + shipping_cents,
        }
    }
}

impl Default for QuoteCalculator {
    fn default() -> Self {
        Self::new(PricingConfig::default())
    }
}

/// Render a cents amount as dollars for chat replies, e.g. `$28.00`
pub fn format_cents(cents: i32) -> String {
    format!("${}.{:02}", cents / 100, (cents % 100).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_quote_pla_medium_self() {
        let calc = QuoteCalculator::default();
        let quote = calc.quote(
            Material::Pla,
            SizeClass::Medium,
            FulfillmentMode::SelfPrint,
            false,
            false,
        );

        assert_eq!(quote.base_cents, 2800);
        assert_eq!(quote.addons_cents, 0);
        assert_eq!(quote.shipping_cents, 650);
        assert_eq!(quote.total_cents, 3450);
    }

    #[test]
    fn test_petg_multiplier_applies_to_base_only() {
        let calc = QuoteCalculator::default();
        let quote = calc.quote(
            Material::Petg,
            SizeClass::Small,
            FulfillmentMode::Cloud,
            true,
            false,
        );

        // 1800 * 1.25 = 2250; rush is a flat fee on top
        assert_eq!(quote.base_cents, 2250);
        assert_eq!(quote.addons_cents, 1000);
        assert_eq!(quote.shipping_cents, 800);
        assert_eq!(quote.total_cents, 4050);
    }

    #[test]
    fn test_quote_is_deterministic() {
        let calc = QuoteCalculator::default();
        let a = calc.quote(Material::PlaPlus, SizeClass::FullDrawer, FulfillmentMode::Cloud, true, true);
        let b = calc.quote(Material::PlaPlus, SizeClass::FullDrawer, FulfillmentMode::Cloud, true, true);
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(3450), "$34.50");
        assert_eq!(format_cents(5), "$0.05");
    }
}
