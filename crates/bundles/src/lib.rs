//! Bundle offers and the selection flow that assembles them.
//!
//! A bundle is a merchandising record: a preset item list, a whole
//! collection, or a mix-and-match offer where the customer picks a fixed
//! number of items. [`BundleSelection`] walks a shopper from the offer to an
//! [`AssembledBundle`] the cart can ingest, validating picks against the
//! catalog as it goes. Pure domain logic, no IO.

pub mod bundle;
pub mod selection;

pub use bundle::{AssembledBundle, Bundle, BundleComponent, BundleItem, BundleKind, BundlePricing};
pub use selection::{AssembleError, BundleSelection, BundleState};
