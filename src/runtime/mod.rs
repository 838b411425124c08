//! Transport layer: the analytics data service client and the offer
//! administration endpoint resolver

pub mod client;
pub mod endpoint;

pub use client::{DataSource, HttpDataSource, HttpDataSourceBuilder};
pub use endpoint::{EndpointResolver, NewOfferPayload, OfferAdminClient, OfferDraft};
