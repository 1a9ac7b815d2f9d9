use shared::{
    domain::ProductId,
    protocol::{PriceTier, ProductSummary},
};

pub const OVERLAY_WIDTH: f64 = 300.0;
pub const OVERLAY_GAP: f64 = 10.0;
pub const NO_PRICING_NOTE: &str = "No pricing information available for this product.";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub top: f64,
    pub left: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayPosition {
    pub top: f64,
    pub left: f64,
}

impl OverlayPosition {
    /// Top-aligned with the anchor, just to its left.
    pub fn beside(anchor: Anchor) -> Self {
        Self {
            top: anchor.top,
            left: anchor.left - OVERLAY_WIDTH - OVERLAY_GAP,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceOverlay {
    pub product_id: ProductId,
    pub product_name: String,
    pub tiers: Vec<PriceTier>,
    pub position: OverlayPosition,
}

impl PriceOverlay {
    pub fn for_product(product: &ProductSummary, anchor: Anchor) -> Self {
        let mut tiers = product.prices.clone();
        tiers.sort_by_key(|tier| tier.units);
        Self {
            product_id: product.id.clone(),
            product_name: product.product_name.clone(),
            tiers,
            position: OverlayPosition::beside(anchor),
        }
    }

    pub fn title(&self) -> String {
        format!("Pricing info for product {}", self.product_id)
    }

    pub fn has_pricing(&self) -> bool {
        !self.tiers.is_empty()
    }
}

/// Where a click outside of any handler landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Link,
    PriceTrigger,
    CloseButton,
    InsideOverlay,
    Elsewhere,
}

impl ClickTarget {
    pub fn dismisses_overlay(self) -> bool {
        matches!(self, ClickTarget::CloseButton | ClickTarget::Elsewhere)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::protocol::ProductImage;

    #[test]
    fn overlay_sits_left_of_anchor_with_sorted_tiers() {
        let product = ProductSummary {
            id: ProductId::from("Xk2p9QmZ0aB1"),
            product_name: "Crate".into(),
            product_images: vec![ProductImage {
                image: "/media/crate.png".into(),
            }],
            prices: vec![
                PriceTier {
                    units: 10,
                    price: 4.0,
                },
                PriceTier {
                    units: 1,
                    price: 5.0,
                },
            ],
        };
        let overlay = PriceOverlay::for_product(
            &product,
            Anchor {
                top: 120.0,
                left: 500.0,
            },
        );
        assert_eq!(overlay.position, OverlayPosition { top: 120.0, left: 190.0 });
        assert_eq!(overlay.tiers[0].units, 1);
        assert_eq!(overlay.title(), "Pricing info for product Xk2p9QmZ0aB1");
        assert!(overlay.has_pricing());
    }

    #[test]
    fn only_close_and_outside_clicks_dismiss() {
        assert!(ClickTarget::CloseButton.dismisses_overlay());
        assert!(ClickTarget::Elsewhere.dismisses_overlay());
        assert!(!ClickTarget::Link.dismisses_overlay());
        assert!(!ClickTarget::PriceTrigger.dismisses_overlay());
        assert!(!ClickTarget::InsideOverlay.dismisses_overlay());
    }
}
