//! Product page session: navigation, fetch reconciliation and option
//! selection on top of the catalog and cart crates.
//!
//! A [`ProductPage`] tracks what the shopper is currently looking at.
//! Navigation hands out a [`FetchTicket`] for the backend round trip;
//! [`ProductPage::resolve_fetch`] only accepts the result if the shopper
//! has not navigated elsewhere in the meantime.

pub mod page;


pub use page::{Configuration, FetchTicket, PageState, ProductPage, ProductView};
