//! Blocking client for the Brickset v3 API (LEGO set and collection data).
//!
//! # Overview
//! One method per upstream endpoint. Each call shapes its parameters, sends
//! a single form-encoded POST and unwraps the JSON status envelope into a
//! typed result or an `ApiError`.
//!
//! # Design
//! - `BricksetClient` holds only its immutable `ClientConfig` and a
//!   `Transport`; methods take `&self` and share no mutable state.
//! - Request building (`build_request`) and envelope handling
//!   (`parse_response`) are public, so the I/O boundary stays explicit and a
//!   host can plug in its own HTTP stack through `Transport`.
//! - Parameter normalization lives in `params`, separate from the wire
//!   encoding in `form`.
//! - No rate limiting, retries, timeouts or pagination: callers drive
//!   `page_number` / `page_size` and own the daily quota.

pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod params;
pub mod types;

pub use client::{routes, BricksetClient, ResponseEnvelope};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use form::FormBody;
pub use http::{HttpRequest, HttpResponse, Transport, UreqTransport};
pub use params::{
    GetMinifigCollectionParams, GetSetsParams, OneOrMany, OrderBy, Region, SetCollectionParams,
    SetMinifigCollectionParams, SortField,
};
pub use types::{
    AgeRange, ApiKeyUsage, Barcodes, Collection, Collections, Dimensions, ExtendedData, Image,
    Instruction, LegoCom, LegoComDetails, MinifigCollectionEntry, Review, ReviewRating, Set,
    Subtheme, Theme, UserMinifigNote, UserNote, Year,
};
