use vitrina_cart::{AddToCartError, CartAddition};
use vitrina_catalog::{
    DefaultSelectionPolicy, DisplayState, Product, ProductRecord, Selection, Slug, Variant,
    default_selection, display_state, matching_variant,
};
use vitrina_core::{DomainError, DomainResult};

/// Proof of an in-flight product fetch, handed out by [`ProductPage::navigate`].
///
/// The backend round trip happens outside this crate; whoever performs it
/// hands the ticket back together with the result. The ticket carries the
/// slug it was issued for, which is all [`ProductPage::resolve_fetch`] needs
/// to decide whether the result is still wanted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    slug: Slug,
}

impl FetchTicket {
    pub fn slug(&self) -> &Slug {
        &self.slug
    }
}

/// Where the shopper's product page currently stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageState {
    /// No navigation has happened yet.
    #[default]
    Idle,
    /// A fetch for this slug is in flight.
    Loading { slug: Slug },
    /// A product is on screen.
    Ready(ProductView),
    /// The backend had no product under this slug, or its record was invalid.
    NotFound { slug: Slug },
}

/// How far the current selection pins down a purchasable configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configuration {
    /// The product has no option axes; it is always fully configured.
    Simple,
    /// At least one axis is unselected, or the selection matches no variant.
    Unconfigured,
    /// The selection resolves to a variant that is in stock.
    Configured,
    /// The selection resolves to a variant, but that variant is sold out.
    ConfiguredUnavailable,
}

/// A validated product together with the shopper's current option selection
/// and the derived display values.
///
/// The three fields are kept consistent by construction: every selection
/// change recomputes the display state, so readers never observe a price or
/// image that belongs to a previous selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    product: Product,
    selection: Selection,
    display: DisplayState,
}

impl ProductView {
    fn new(product: Product, selection: Selection) -> Self {
        let display = display_state(&product, &selection);
        Self {
            product,
            selection,
            display,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// The variant the current selection resolves to, if any.
    pub fn resolved_variant(&self) -> Option<&Variant> {
        matching_variant(&self.product, &self.selection)
    }

    pub fn configuration(&self) -> Configuration {
        if !self.product.has_variants() {
            return Configuration::Simple;
        }
        match matching_variant(&self.product, &self.selection) {
            Some(variant) if self.product.variant_available(variant) => Configuration::Configured,
            Some(_) => Configuration::ConfiguredUnavailable,
            None => Configuration::Unconfigured,
        }
    }
}

/// Stateful coordinator for one shopper's product page.
///
/// Owns the [`PageState`] machine and the selection policy used to
/// prepopulate options when a product arrives. All mutation goes through
/// the methods here; the UI reads back through [`ProductPage::state`] and
/// [`ProductPage::view`].
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    state: PageState,
    policy: DefaultSelectionPolicy,
}

impl ProductPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DefaultSelectionPolicy) -> Self {
        Self {
            state: PageState::Idle,
            policy,
        }
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// The current view, if a product is on screen.
    pub fn view(&self) -> Option<&ProductView> {
        match &self.state {
            PageState::Ready(view) => Some(view),
            _ => None,
        }
    }

    /// Starts navigating to the product under `slug`.
    ///
    /// Moves the page to [`PageState::Loading`] and returns the ticket the
    /// caller must hand back once the backend responds. Navigating again
    /// before that happens simply supersedes the earlier fetch; its result
    /// will be discarded on arrival.
    pub fn navigate(&mut self, slug: &str) -> DomainResult<FetchTicket> {
        let slug = Slug::new(slug)?;
        tracing::debug!(slug = %slug, "navigating to product page");
        self.state = PageState::Loading { slug: slug.clone() };
        Ok(FetchTicket { slug })
    }

    /// Applies the result of a fetch started by [`ProductPage::navigate`].
    ///
    /// Results are only accepted while the page is still loading the slug
    /// the ticket was issued for; anything else (navigation elsewhere, a
    /// duplicate delivery after the page settled) is silently discarded.
    /// A record that fails validation moves the page to
    /// [`PageState::NotFound`] and reports the error.
    pub fn resolve_fetch(
        &mut self,
        ticket: FetchTicket,
        record: Option<ProductRecord>,
    ) -> DomainResult<()> {
        let still_wanted = matches!(&self.state, PageState::Loading { slug } if *slug == ticket.slug);
        if !still_wanted {
            tracing::debug!(slug = %ticket.slug, "discarding stale fetch result");
            return Ok(());
        }
        let Some(record) = record else {
            tracing::info!(slug = %ticket.slug, "product not found");
            self.state = PageState::NotFound { slug: ticket.slug };
            return Ok(());
        };
        let product = match Product::from_record(record) {
            Ok(product) => product,
            Err(err) => {
                tracing::info!(slug = %ticket.slug, error = %err, "rejecting invalid product record");
                self.state = PageState::NotFound { slug: ticket.slug };
                return Err(err);
            }
        };
        let selection = default_selection(&product, &self.policy);
        tracing::debug!(
            slug = %ticket.slug,
            preselected = selection.len(),
            "product page ready"
        );
        self.state = PageState::Ready(ProductView::new(product, selection));
        Ok(())
    }

    /// Records the shopper picking `value` on `axis_name`.
    ///
    /// Only declared axes and declared values are accepted; anything else
    /// is a caller bug and fails fast rather than being silently coerced.
    /// Re-selecting on an axis overwrites the previous choice.
    pub fn select_option(&mut self, axis_name: &str, value: &str) -> DomainResult<()> {
        let PageState::Ready(view) = &mut self.state else {
            return Err(DomainError::conflict("no product page is ready"));
        };
        let Some(axis) = view.product.axis(axis_name) else {
            return Err(DomainError::validation(format!(
                "unknown option axis: {axis_name}"
            )));
        };
        if !axis.values.iter().any(|declared| declared == value) {
            return Err(DomainError::validation(format!(
                "value '{value}' is not declared on axis '{axis_name}'"
            )));
        }
        view.selection.set(axis_name, value);
        view.display = display_state(&view.product, &view.selection);
        Ok(())
    }

    /// Whether picking `value` on `axis_name` could still lead to an
    /// in-stock variant, given the rest of the current selection.
    ///
    /// Returns `false` whenever no product is on screen.
    pub fn option_value_available(&self, axis_name: &str, value: &str) -> bool {
        match &self.state {
            PageState::Ready(view) => vitrina_catalog::option_value_available(
                &view.product,
                &view.selection,
                axis_name,
                value,
            ),
            _ => false,
        }
    }

    /// Builds the cart addition for the product on screen at its current
    /// selection.
    ///
    /// Fails when no page is ready, when the selection does not resolve to
    /// a variant on a product that has them, or when `quantity` is zero.
    pub fn add_to_cart(&self, quantity: u32) -> Result<CartAddition, AddToCartError> {
        let PageState::Ready(view) = &self.state else {
            return Err(AddToCartError::Domain(DomainError::conflict(
                "no product page is ready",
            )));
        };
        let variant = matching_variant(&view.product, &view.selection);
        CartAddition::new(&view.product, variant, quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrina_catalog::{OptionAxis, VariantRecord};
    use vitrina_core::{ProductId, VariantId};

    fn simple_record(slug: &str) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(),
            slug: slug.to_string(),
            title: "Lámina botánica".to_string(),
            price: 450,
            compare_at_price: None,
            images: vec!["lamina.jpg".to_string()],
            options: vec![],
            variants: vec![],
            inventory_quantity: Some(10),
            track_inventory: true,
            collection_ids: vec![],
        }
    }

    fn variant_record(size: &str, color: &str, price: u64, quantity: i64) -> VariantRecord {
        VariantRecord {
            id: VariantId::new(),
            option_values: [
                ("Tamaño".to_string(), size.to_string()),
                ("Color".to_string(), color.to_string()),
            ]
            .into_iter()
            .collect(),
            price,
            compare_at_price: None,
            image: None,
            image_urls: vec![],
            inventory_quantity: Some(quantity),
            track_inventory: None,
        }
    }

    fn grid_record(slug: &str) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(),
            slug: slug.to_string(),
            title: "Cuadro nórdico".to_string(),
            price: 1000,
            compare_at_price: None,
            images: vec!["cuadro.jpg".to_string()],
            options: vec![
                OptionAxis {
                    name: "Tamaño".to_string(),
                    values: vec!["50x50cm".to_string(), "80x80cm".to_string()],
                },
                OptionAxis {
                    name: "Color".to_string(),
                    values: vec!["Rojo".to_string(), "Azul".to_string()],
                },
            ],
            variants: vec![
                variant_record("50x50cm", "Rojo", 1000, 0),
                variant_record("50x50cm", "Azul", 1000, 4),
                variant_record("80x80cm", "Rojo", 1500, 2),
                variant_record("80x80cm", "Azul", 1500, 0),
            ],
            inventory_quantity: None,
            track_inventory: true,
            collection_ids: vec![],
        }
    }

    fn ready_page(record: ProductRecord) -> ProductPage {
        let mut page = ProductPage::new();
        let ticket = page.navigate(&record.slug).unwrap();
        page.resolve_fetch(ticket, Some(record)).unwrap();
        page
    }

    #[test]
    fn navigation_issues_a_ticket_and_enters_loading() {
        let mut page = ProductPage::new();
        assert_eq!(*page.state(), PageState::Idle);

        let ticket = page.navigate("cuadro-nordico").unwrap();

        assert_eq!(ticket.slug().as_str(), "cuadro-nordico");
        match page.state() {
            PageState::Loading { slug } => assert_eq!(slug.as_str(), "cuadro-nordico"),
            other => panic!("Expected Loading, got {other:?}"),
        }
    }

    #[test]
    fn navigation_rejects_blank_slugs() {
        let mut page = ProductPage::new();

        let result = page.navigate("   ");

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(*page.state(), PageState::Idle);
    }

    #[test]
    fn missing_product_moves_to_not_found() {
        let mut page = ProductPage::new();
        let ticket = page.navigate("no-such-product").unwrap();

        page.resolve_fetch(ticket, None).unwrap();

        match page.state() {
            PageState::NotFound { slug } => assert_eq!(slug.as_str(), "no-such-product"),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn valid_record_moves_to_ready() {
        let page = ready_page(simple_record("lamina-botanica"));

        let view = page.view().unwrap();
        assert_eq!(view.product().title(), "Lámina botánica");
        assert_eq!(view.configuration(), Configuration::Simple);
        assert_eq!(view.display().price, 450);
    }

    #[test]
    fn ready_page_prepopulates_forced_options() {
        let mut record = grid_record("cuadro-nordico");
        // Sell out everything except 80x80cm Rojo: both axes become forced.
        record.variants = vec![
            variant_record("50x50cm", "Rojo", 1000, 0),
            variant_record("80x80cm", "Rojo", 1500, 2),
            variant_record("80x80cm", "Azul", 1500, 0),
        ];
        let page = ready_page(record);

        let view = page.view().unwrap();
        assert_eq!(view.selection().get("Tamaño"), Some("80x80cm"));
        assert_eq!(view.selection().get("Color"), Some("Rojo"));
        assert_eq!(view.configuration(), Configuration::Configured);
    }

    #[test]
    fn policy_preferences_cascade_through_the_default_selection() {
        let mut page =
            ProductPage::with_policy(DefaultSelectionPolicy::preferring(["80x80"]));
        let ticket = page.navigate("cuadro-nordico").unwrap();
        page.resolve_fetch(ticket, Some(grid_record("cuadro-nordico")))
            .unwrap();

        // The preferred size settles the Tamaño axis, which leaves Rojo the
        // only purchasable color.
        let view = page.view().unwrap();
        assert_eq!(view.selection().get("Tamaño"), Some("80x80cm"));
        assert_eq!(view.selection().get("Color"), Some("Rojo"));
        assert_eq!(view.configuration(), Configuration::Configured);
        assert_eq!(view.display().price, 1500);
    }

    #[test]
    fn stale_result_is_discarded_after_navigating_elsewhere() {
        let mut page = ProductPage::new();
        let first = page.navigate("cuadro-nordico").unwrap();
        let second = page.navigate("lamina-botanica").unwrap();

        page.resolve_fetch(first, Some(grid_record("cuadro-nordico")))
            .unwrap();
        match page.state() {
            PageState::Loading { slug } => assert_eq!(slug.as_str(), "lamina-botanica"),
            other => panic!("Expected Loading, got {other:?}"),
        }

        page.resolve_fetch(second, Some(simple_record("lamina-botanica")))
            .unwrap();
        assert_eq!(page.view().unwrap().product().title(), "Lámina botánica");
    }

    #[test]
    fn duplicate_delivery_is_discarded_once_settled() {
        let mut page = ProductPage::new();
        let ticket = page.navigate("lamina-botanica").unwrap();
        page.resolve_fetch(ticket.clone(), Some(simple_record("lamina-botanica")))
            .unwrap();

        // A retry of the same fetch lands after the page settled.
        page.resolve_fetch(ticket, None).unwrap();

        assert!(page.view().is_some());
    }

    #[test]
    fn invalid_record_reports_and_moves_to_not_found() {
        let mut page = ProductPage::new();
        let ticket = page.navigate("lamina-botanica").unwrap();
        let mut record = simple_record("lamina-botanica");
        record.title = "   ".to_string();

        let result = page.resolve_fetch(ticket, Some(record));

        assert!(matches!(result, Err(DomainError::Validation(_))));
        match page.state() {
            PageState::NotFound { slug } => assert_eq!(slug.as_str(), "lamina-botanica"),
            other => panic!("Expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn selecting_options_narrows_down_to_a_variant() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        assert_eq!(
            page.view().unwrap().configuration(),
            Configuration::Unconfigured
        );

        page.select_option("Tamaño", "80x80cm").unwrap();
        page.select_option("Color", "Rojo").unwrap();

        let view = page.view().unwrap();
        assert_eq!(view.configuration(), Configuration::Configured);
        assert_eq!(view.display().price, 1500);
        assert!(view.display().in_stock);
        let variant = view.resolved_variant().unwrap();
        assert_eq!(variant.option_value("Color"), Some("Rojo"));
    }

    #[test]
    fn reselecting_an_axis_overwrites_the_previous_choice() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        page.select_option("Tamaño", "50x50cm").unwrap();

        page.select_option("Tamaño", "80x80cm").unwrap();

        let view = page.view().unwrap();
        assert_eq!(view.selection().get("Tamaño"), Some("80x80cm"));
        assert_eq!(view.selection().len(), 1);
    }

    #[test]
    fn selecting_the_same_value_twice_changes_nothing() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        page.select_option("Color", "Azul").unwrap();
        let before = page.view().unwrap().clone();

        page.select_option("Color", "Azul").unwrap();

        assert_eq!(*page.view().unwrap(), before);
    }

    #[test]
    fn selecting_an_unknown_axis_fails_fast() {
        let mut page = ready_page(grid_record("cuadro-nordico"));

        let result = page.select_option("Material", "Madera");

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn selecting_an_undeclared_value_fails_fast() {
        let mut page = ready_page(grid_record("cuadro-nordico"));

        let result = page.select_option("Color", "Verde");

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(page.view().unwrap().selection().len(), 0);
    }

    #[test]
    fn selecting_before_ready_is_a_conflict() {
        let mut page = ProductPage::new();

        let result = page.select_option("Color", "Rojo");

        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[test]
    fn sold_out_variant_configures_as_unavailable() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        page.select_option("Tamaño", "50x50cm").unwrap();
        page.select_option("Color", "Rojo").unwrap();

        let view = page.view().unwrap();
        assert_eq!(view.configuration(), Configuration::ConfiguredUnavailable);
        assert!(!view.display().in_stock);
    }

    #[test]
    fn availability_narrows_with_the_current_selection() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        assert!(page.option_value_available("Color", "Rojo"));

        // With 50x50cm selected only Azul remains purchasable.
        page.select_option("Tamaño", "50x50cm").unwrap();
        assert!(!page.option_value_available("Color", "Rojo"));
        assert!(page.option_value_available("Color", "Azul"));
    }

    #[test]
    fn availability_is_false_without_a_ready_page() {
        let page = ProductPage::new();

        assert!(!page.option_value_available("Color", "Rojo"));
    }

    #[test]
    fn add_to_cart_requires_a_ready_page() {
        let page = ProductPage::new();

        let result = page.add_to_cart(1);

        assert!(matches!(
            result,
            Err(AddToCartError::Domain(DomainError::Conflict(_)))
        ));
    }

    #[test]
    fn add_to_cart_requires_a_resolved_variant() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        page.select_option("Tamaño", "80x80cm").unwrap();

        let result = page.add_to_cart(1);

        assert!(matches!(result, Err(AddToCartError::SelectionIncomplete)));
    }

    #[test]
    fn add_to_cart_snapshots_the_resolved_variant() {
        let mut page = ready_page(grid_record("cuadro-nordico"));
        page.select_option("Tamaño", "80x80cm").unwrap();
        page.select_option("Color", "Rojo").unwrap();

        let addition = page.add_to_cart(2).unwrap();

        assert_eq!(addition.unit_price(), 1500);
        assert_eq!(addition.quantity(), 2);
        assert!(addition.variant_id().is_some());
    }

    #[test]
    fn simple_products_add_without_any_selection() {
        let page = ready_page(simple_record("lamina-botanica"));

        let addition = page.add_to_cart(1).unwrap();

        assert_eq!(addition.unit_price(), 450);
        assert_eq!(addition.variant_id(), None);
    }
}
