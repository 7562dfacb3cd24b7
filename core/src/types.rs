//! Domain records returned by the Brickset API.
//!
//! # Design
//! These mirror the upstream JSON schema and are never validated or mutated
//! by the client. Every record defaults missing fields so a sparse upstream
//! response still deserializes. Dates are kept as the upstream strings.

use serde::{Deserialize, Serialize};

/// A set in the Brickset catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Set {
    #[serde(rename = "setID")]
    pub set_id: u32,
    pub number: String,
    pub number_variant: u32,
    pub name: String,
    pub year: u32,
    pub theme: String,
    pub theme_group: String,
    pub subtheme: Option<String>,
    pub category: String,
    pub released: bool,
    pub pieces: Option<u32>,
    pub minifigs: Option<u32>,
    pub image: Image,
    #[serde(rename = "bricksetURL")]
    pub brickset_url: String,
    pub collection: Collection,
    pub collections: Collections,
    #[serde(rename = "LEGOCom")]
    pub lego_com: LegoCom,
    pub rating: f64,
    pub review_count: u32,
    pub packaging_type: String,
    pub availability: String,
    pub instructions_count: u32,
    pub additional_image_count: u32,
    pub age_range: AgeRange,
    pub dimensions: Dimensions,
    pub barcode: Barcodes,
    pub extended_data: Option<ExtendedData>,
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    #[serde(rename = "thumbnailURL")]
    pub thumbnail_url: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

/// The calling user's own collection details for a set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collection {
    pub owned: Option<bool>,
    pub wanted: Option<bool>,
    pub qty_owned: Option<u32>,
    pub rating: Option<f64>,
    pub notes: String,
}

/// How many Brickset members own or want a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Collections {
    pub owned_by: Option<u32>,
    pub wanted_by: Option<u32>,
}

/// Retail data from LEGO.com per region.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegoCom {
    #[serde(rename = "US")]
    pub us: Option<LegoComDetails>,
    #[serde(rename = "UK")]
    pub uk: Option<LegoComDetails>,
    #[serde(rename = "CA")]
    pub ca: Option<LegoComDetails>,
    #[serde(rename = "DE")]
    pub de: Option<LegoComDetails>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LegoComDetails {
    pub retail_price: Option<f64>,
    pub date_first_available: Option<String>,
    pub date_last_available: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dimensions {
    pub height: Option<f64>,
    pub width: Option<f64>,
    pub depth: Option<f64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Barcodes {
    #[serde(rename = "EAN")]
    pub ean: Option<String>,
    #[serde(rename = "UPC")]
    pub upc: Option<String>,
}

/// Only present when `getSets` is called with `extended_data`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedData {
    pub notes: String,
    pub tags: Vec<String>,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Review {
    pub author: String,
    pub date_posted: String,
    pub rating: ReviewRating,
    pub title: String,
    pub review: String,
    /// Whether `review` contains HTML markup.
    #[serde(rename = "HTML")]
    pub html: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewRating {
    pub overall: f64,
    pub parts: f64,
    pub building_experience: f64,
    pub playability: f64,
    pub value_for_money: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MinifigCollectionEntry {
    pub minifig_number: String,
    pub name: String,
    pub category: String,
    pub owned_in_sets: u32,
    pub owned_loose: u32,
    pub owned_total: u32,
    pub wanted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub theme: String,
    pub set_count: u32,
    pub subtheme_count: u32,
    pub year_from: u32,
    pub year_to: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Subtheme {
    pub theme: String,
    pub subtheme: String,
    pub set_count: u32,
    pub year_from: u32,
    pub year_to: u32,
}

/// Number of sets released in one year, optionally within a theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Year {
    pub theme: String,
    pub year: String,
    pub set_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instruction {
    #[serde(rename = "URL")]
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserNote {
    #[serde(rename = "setID")]
    pub set_id: u32,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UserMinifigNote {
    pub minifig_number: String,
    pub notes: String,
}

/// Calls made with the API key on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiKeyUsage {
    pub date_stamp: String,
    pub count: u32,
}
