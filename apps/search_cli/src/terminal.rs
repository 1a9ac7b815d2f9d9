use search_core::{PaginationState, PriceOverlay, ResultPage, ResultsSurface};
use shared::protocol::{PriceTier, ProductSummary};

pub const MISSING_IMAGE_PLACEHOLDER: &str = "/static/stores/images/missing_image_placeholder.png";
pub const NO_PRODUCTS_NOTE: &str = "No products found.";

pub struct TerminalSurface;

impl ResultsSurface for TerminalSurface {
    fn render_products(&mut self, page: &ResultPage) {
        println!("-- results (page {}) --", page.page);
        for product in &page.products {
            for line in product_card_lines(product) {
                println!("{line}");
            }
        }
    }

    fn render_empty(&mut self) {
        println!("-- results --");
        println!("{NO_PRODUCTS_NOTE}");
    }

    fn set_pagination(&mut self, pagination: PaginationState) {
        println!("{}", pagination_line(pagination));
    }

    fn show_price_overlay(&mut self, overlay: &PriceOverlay) {
        for line in overlay_lines(overlay) {
            println!("{line}");
        }
    }

    fn dismiss_price_overlay(&mut self) {}
}

pub fn product_card_lines(product: &ProductSummary) -> Vec<String> {
    vec![
        format!("#{} {}", product.id, product.product_name),
        format!(
            "    image: {}",
            product.thumbnail_url().unwrap_or(MISSING_IMAGE_PLACEHOLDER)
        ),
        format!("    view:  {}", product.view_path()),
    ]
}

pub fn pagination_line(pagination: PaginationState) -> String {
    let toggle = |enabled: bool| if enabled { "enabled" } else { "disabled" };
    format!(
        "page {} | previous: {} | next: {}",
        pagination.page,
        toggle(pagination.previous_enabled),
        toggle(pagination.next_enabled)
    )
}

pub fn overlay_lines(overlay: &PriceOverlay) -> Vec<String> {
    let mut lines = vec![format!("== {} ==", overlay.title())];
    if overlay.has_pricing() {
        lines.push(format!("{:>8}  {:>10}", "Units", "Price"));
        lines.extend(overlay.tiers.iter().map(tier_line));
    } else {
        lines.push(search_core::price_overlay::NO_PRICING_NOTE.to_string());
    }
    lines
}

fn tier_line(tier: &PriceTier) -> String {
    format!("{:>8}  {:>10.2}", tier.units, tier.price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use search_core::Anchor;
    use shared::{domain::ProductId, protocol::ProductImage};

    fn boot(images: Vec<ProductImage>, prices: Vec<PriceTier>) -> ProductSummary {
        ProductSummary {
            id: ProductId::from("aB3kL9xQ2mZp"),
            product_name: "Boot".into(),
            product_images: images,
            prices,
        }
    }

    #[test]
    fn card_falls_back_to_placeholder_image() {
        let lines = product_card_lines(&boot(Vec::new(), Vec::new()));
        assert_eq!(lines[0], "#aB3kL9xQ2mZp Boot");
        assert!(lines[1].ends_with(MISSING_IMAGE_PLACEHOLDER));
        assert!(lines[2].ends_with("/view_product/aB3kL9xQ2mZp/"));

        let lines = product_card_lines(&boot(
            vec![ProductImage {
                image: "/media/boot.png".into(),
            }],
            Vec::new(),
        ));
        assert!(lines[1].ends_with("/media/boot.png"));
    }

    #[test]
    fn pagination_line_names_each_affordance() {
        assert_eq!(
            pagination_line(PaginationState {
                page: 3,
                previous_enabled: true,
                next_enabled: false,
            }),
            "page 3 | previous: enabled | next: disabled"
        );
    }

    #[test]
    fn overlay_lists_tiers_or_notes_their_absence() {
        let priced = PriceOverlay::for_product(
            &boot(
                Vec::new(),
                vec![PriceTier {
                    units: 5,
                    price: 12.5,
                }],
            ),
            Anchor::default(),
        );
        let lines = overlay_lines(&priced);
        assert_eq!(lines[0], "== Pricing info for product aB3kL9xQ2mZp ==");
        assert_eq!(lines[2], "       5       12.50");

        let unpriced = PriceOverlay::for_product(&boot(Vec::new(), Vec::new()), Anchor::default());
        assert_eq!(
            overlay_lines(&unpriced)[1],
            search_core::price_overlay::NO_PRICING_NOTE
        );
    }
}
