//! # Gateway Providers
//!
//! Provider-facing half of the relay:
//! - the [`Transformer`] contract every upstream dialect implements
//! - the name-keyed [`TransformerRegistry`] populated at startup
//! - the reference [`OpenAiTransformer`]
//! - the [`UpstreamClient`] that forwards transformed requests over HTTP

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod openai;
pub mod registry;
pub mod transformer;

pub use client::{Endpoint, HttpUpstreamClient, UpstreamClient};
pub use openai::OpenAiTransformer;
pub use registry::TransformerRegistry;
pub use transformer::{Transformer, TransformerChain, UpstreamRequest};
