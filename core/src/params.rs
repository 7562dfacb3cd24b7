//! Caller-facing parameter types and their normalized wire shapes.
//!
//! # Design
//! Each endpoint that takes a `params` object gets its own struct. The
//! caller-facing struct uses natural Rust types (`bool` flags, `Option`s,
//! `NaiveDate`); `to_wire` applies the Brickset normalization rules and
//! produces a borrowed, serde-serializable view that becomes the JSON
//! `params` field. Optional wire fields are skipped when absent so the JSON
//! never carries `null`.

use std::fmt::{self, Display};

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

const MAX_PAGE_SIZE: u32 = 999;
const MAX_SET_QTY_OWNED: i32 = 999;
const MAX_MINIFIG_QTY_OWNED: i32 = 500;
const NOTES_LIMIT: usize = 1000;
const NOTES_TRUNCATED_LEN: usize = 999;

/// A filter that accepts a single value or a list.
///
/// A list is sent as one comma-separated string; a single value is sent
/// unchanged, so `Many(["a", "b"])` and `One("a,b")` encode identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Display> OneOrMany<T> {
    fn joined(values: &[T]) -> String {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl<T: Serialize + Display> Serialize for OneOrMany<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OneOrMany::One(value) => value.serialize(serializer),
            OneOrMany::Many(values) => serializer.serialize_str(&Self::joined(values)),
        }
    }
}

impl From<&str> for OneOrMany<String> {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany<String> {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<&str>> for OneOrMany<String> {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for OneOrMany<String> {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<u32> for OneOrMany<u32> {
    fn from(value: u32) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<u32>> for OneOrMany<u32> {
    fn from(values: Vec<u32>) -> Self {
        OneOrMany::Many(values)
    }
}

/// Retail regions used by the price-based sort fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Uk,
    Us,
    Ca,
    De,
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Uk => "UK",
            Region::Us => "US",
            Region::Ca => "CA",
            Region::De => "DE",
        })
    }
}

/// Fields `getSets` can sort by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Number,
    YearFrom,
    Pieces,
    Minifigs,
    Rating,
    RetailPrice(Region),
    PricePerPiece(Region),
    Theme,
    Subtheme,
    Name,
    Random,
    QtyOwned,
    OwnCount,
    WantCount,
    UserRating,
    /// Order in which records were added to the user's collection.
    CollectionId,
    /// Search ranking.
    Rank,
}

impl Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Number => f.write_str("Number"),
            SortField::YearFrom => f.write_str("YearFrom"),
            SortField::Pieces => f.write_str("Pieces"),
            SortField::Minifigs => f.write_str("Minifigs"),
            SortField::Rating => f.write_str("Rating"),
            SortField::RetailPrice(region) => write!(f, "{region}RetailPrice"),
            SortField::PricePerPiece(region) => write!(f, "{region}PricePerPiece"),
            SortField::Theme => f.write_str("Theme"),
            SortField::Subtheme => f.write_str("Subtheme"),
            SortField::Name => f.write_str("Name"),
            SortField::Random => f.write_str("Random"),
            SortField::QtyOwned => f.write_str("QtyOwned"),
            SortField::OwnCount => f.write_str("OwnCount"),
            SortField::WantCount => f.write_str("WantCount"),
            SortField::UserRating => f.write_str("UserRating"),
            SortField::CollectionId => f.write_str("CollectionID"),
            SortField::Rank => f.write_str("Rank"),
        }
    }
}

/// Sort order for `getSets`.
///
/// Descending order appends `DESC` to the field name. Upstream only honours
/// it on numerical fields; the value is passed through either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub field: SortField,
    pub descending: bool,
}

impl OrderBy {
    pub fn ascending(field: SortField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub fn descending(field: SortField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

impl From<SortField> for OrderBy {
    fn from(field: SortField) -> Self {
        Self::ascending(field)
    }
}

impl Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if self.descending {
            f.write_str("DESC")?;
        }
        Ok(())
    }
}

impl Serialize for OrderBy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Filters for `getSets`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetSetsParams {
    /// Internal Brickset set ID.
    pub set_id: Option<u32>,
    /// Searches set number, name, theme and subtheme.
    pub query: Option<String>,
    pub theme: Option<OneOrMany<String>>,
    pub subtheme: Option<OneOrMany<String>>,
    /// Full set number(s) in the form `{number}-{variant}`, e.g. `6876-1`.
    pub set_number: Option<OneOrMany<String>>,
    pub year: Option<OneOrMany<u32>>,
    pub tag: Option<String>,
    pub owned: bool,
    pub wanted: bool,
    pub updated_since: Option<NaiveDate>,
    pub order_by: Option<OrderBy>,
    /// Silently lowered to 999.
    pub page_size: Option<u32>,
    pub page_number: Option<u32>,
    /// Include tags, description and notes.
    pub extended_data: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GetSetsWire<'a> {
    #[serde(rename = "setID", skip_serializing_if = "Option::is_none")]
    set_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    theme: Option<&'a OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subtheme: Option<&'a OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    set_number: Option<&'a OneOrMany<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<&'a OneOrMany<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tag: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owned: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wanted: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_since: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    extended_data: Option<u8>,
}

impl GetSetsParams {
    pub(crate) fn to_wire(&self) -> GetSetsWire<'_> {
        GetSetsWire {
            set_id: self.set_id,
            query: self.query.as_deref(),
            theme: self.theme.as_ref(),
            subtheme: self.subtheme.as_ref(),
            set_number: self.set_number.as_ref(),
            year: self.year.as_ref(),
            tag: self.tag.as_deref(),
            owned: flag(self.owned),
            wanted: flag(self.wanted),
            updated_since: self
                .updated_since
                .map(|date| date.format("%Y-%m-%d").to_string()),
            order_by: self.order_by,
            page_size: self
                .page_size
                .filter(|&size| size > 0)
                .map(|size| size.min(MAX_PAGE_SIZE)),
            page_number: self.page_number,
            extended_data: flag(self.extended_data),
        }
    }
}

/// A user's collection details for one set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetCollectionParams {
    /// When false upstream resets `qty_owned` to 0.
    pub own: bool,
    pub want: bool,
    /// Clamped to 0..=999. Upstream sets `own` when positive.
    pub qty_owned: i32,
    /// Cut to 999 characters when longer than 1000.
    pub notes: String,
    /// Any non-zero rating is sent as `qty_owned` clamped to 1..=5, which is
    /// how the existing Brickset clients behave.
    pub rating: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetCollectionWire<'a> {
    own: u8,
    want: u8,
    qty_owned: i32,
    notes: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<i32>,
}

impl SetCollectionParams {
    pub(crate) fn to_wire(&self) -> SetCollectionWire<'_> {
        SetCollectionWire {
            own: u8::from(self.own),
            want: u8::from(self.want),
            qty_owned: self.qty_owned.clamp(0, MAX_SET_QTY_OWNED),
            notes: truncate_notes(&self.notes),
            rating: self
                .rating
                .filter(|&rating| rating != 0)
                .map(|_| self.qty_owned.clamp(1, 5)),
        }
    }
}

/// Filters for `getMinifigCollection`. With no flags and no query upstream
/// returns every minifig the user owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetMinifigCollectionParams {
    pub owned: bool,
    pub wanted: bool,
    /// Minifig number or name; upstream wraps it in wildcards.
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GetMinifigCollectionWire<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    wanted: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    owned: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<&'a str>,
}

impl GetMinifigCollectionParams {
    pub(crate) fn to_wire(&self) -> GetMinifigCollectionWire<'_> {
        GetMinifigCollectionWire {
            wanted: flag(self.wanted),
            owned: flag(self.owned),
            query: self.query.as_deref(),
        }
    }
}

/// A user's "loose" minifig collection details.
///
/// Upstream expects either own/want/qty_owned or notes in one call, not both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetMinifigCollectionParams {
    pub own: bool,
    pub want: bool,
    /// Clamped to 0..=500.
    pub qty_owned: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetMinifigCollectionWire<'a> {
    own: u8,
    want: u8,
    qty_owned: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

impl SetMinifigCollectionParams {
    pub(crate) fn to_wire(&self) -> SetMinifigCollectionWire<'_> {
        SetMinifigCollectionWire {
            own: u8::from(self.own),
            want: u8::from(self.want),
            qty_owned: self.qty_owned.clamp(0, MAX_MINIFIG_QTY_OWNED),
            notes: self.notes.as_deref().map(truncate_notes),
        }
    }
}

/// Flags are sent as `1` when set and omitted otherwise.
fn flag(value: bool) -> Option<u8> {
    value.then_some(1)
}

/// Notes over the 1000-character limit keep only their first 999 characters.
///
/// Upstream measures length in UTF-16 code units, so a character outside the
/// BMP counts twice. The cut never splits a surrogate pair; it stops at the
/// last whole character that fits.
fn truncate_notes(notes: &str) -> &str {
    if notes.encode_utf16().count() <= NOTES_LIMIT {
        return notes;
    }
    let mut units = 0;
    for (index, ch) in notes.char_indices() {
        units += ch.len_utf16();
        if units > NOTES_TRUNCATED_LEN {
            return &notes[..index];
        }
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn to_json<T: Serialize>(value: &T) -> Value {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn list_filter_encodes_like_comma_joined_scalar() {
        let many: OneOrMany<String> = vec!["a", "b"].into();
        let one: OneOrMany<String> = "a,b".into();
        assert_eq!(
            serde_json::to_string(&many).unwrap(),
            serde_json::to_string(&one).unwrap()
        );
    }

    #[test]
    fn numeric_list_becomes_string_but_scalar_stays_number() {
        assert_eq!(to_json(&OneOrMany::<u32>::from(vec![1, 2])), json!("1,2"));
        assert_eq!(to_json(&OneOrMany::<u32>::from(2021)), json!(2021));
    }

    #[rstest]
    #[case(OrderBy::ascending(SortField::Number), "Number")]
    #[case(OrderBy::descending(SortField::Pieces), "PiecesDESC")]
    #[case(OrderBy::ascending(SortField::RetailPrice(Region::Uk)), "UKRetailPrice")]
    #[case(OrderBy::descending(SortField::PricePerPiece(Region::De)), "DEPricePerPieceDESC")]
    #[case(SortField::CollectionId.into(), "CollectionID")]
    fn order_by_serializes_to_upstream_name(#[case] order: OrderBy, #[case] expected: &str) {
        assert_eq!(to_json(&order), json!(expected));
    }

    #[test]
    fn empty_get_sets_params_serialize_to_empty_object() {
        assert_eq!(to_json(&GetSetsParams::default().to_wire()), json!({}));
    }

    #[test]
    fn get_sets_flags_are_one_or_absent() {
        let params = GetSetsParams {
            owned: true,
            extended_data: true,
            ..Default::default()
        };
        assert_eq!(
            to_json(&params.to_wire()),
            json!({ "owned": 1, "extendedData": 1 })
        );
    }

    #[test]
    fn get_sets_list_filters_are_joined() {
        let params = GetSetsParams {
            theme: Some(vec!["test", "twee"].into()),
            subtheme: Some(vec!["test", "twee"].into()),
            set_number: Some(vec!["test", "twee"].into()),
            year: Some(vec![1, 2].into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_string(&params.to_wire()).unwrap(),
            r#"{"theme":"test,twee","subtheme":"test,twee","setNumber":"test,twee","year":"1,2"}"#
        );
    }

    #[rstest]
    #[case(1500, Some(999))]
    #[case(999, Some(999))]
    #[case(500, Some(500))]
    #[case(0, None)]
    fn page_size_is_clamped(#[case] size: u32, #[case] expected: Option<u32>) {
        let params = GetSetsParams {
            page_size: Some(size),
            ..Default::default()
        };
        assert_eq!(params.to_wire().page_size, expected);
    }

    #[test]
    fn updated_since_is_a_calendar_date() {
        let params = GetSetsParams {
            set_id: Some(31_844),
            updated_since: NaiveDate::from_ymd_opt(2024, 3, 7),
            ..Default::default()
        };
        assert_eq!(
            to_json(&params.to_wire()),
            json!({ "setID": 31844, "updatedSince": "2024-03-07" })
        );
    }

    #[rstest]
    #[case(-5, 0)]
    #[case(0, 0)]
    #[case(10, 10)]
    #[case(999, 999)]
    #[case(5000, 999)]
    fn set_qty_owned_is_clamped(#[case] qty: i32, #[case] expected: i32) {
        let params = SetCollectionParams {
            qty_owned: qty,
            ..Default::default()
        };
        assert_eq!(params.to_wire().qty_owned, expected);
    }

    #[rstest]
    #[case(-5, 0)]
    #[case(499, 499)]
    #[case(5000, 500)]
    fn minifig_qty_owned_is_clamped(#[case] qty: i32, #[case] expected: i32) {
        let params = SetMinifigCollectionParams {
            qty_owned: qty,
            ..Default::default()
        };
        assert_eq!(params.to_wire().qty_owned, expected);
    }

    #[test]
    fn set_collection_always_sends_own_and_want() {
        let params = SetCollectionParams {
            notes: "test".to_string(),
            ..Default::default()
        };
        assert_eq!(
            to_json(&params.to_wire()),
            json!({ "own": 0, "want": 0, "qtyOwned": 0, "notes": "test" })
        );
    }

    #[rstest]
    #[case(Some(3), 10, Some(5))]
    #[case(Some(3), 2, Some(2))]
    #[case(Some(5), 0, Some(1))]
    #[case(Some(0), 3, None)]
    #[case(None, 3, None)]
    fn rating_is_clamped_from_qty_owned(
        #[case] rating: Option<i32>,
        #[case] qty: i32,
        #[case] expected: Option<i32>,
    ) {
        let params = SetCollectionParams {
            qty_owned: qty,
            rating,
            ..Default::default()
        };
        assert_eq!(params.to_wire().rating, expected);
    }

    #[rstest]
    #[case(1500, 999)]
    #[case(1001, 999)]
    #[case(1000, 1000)]
    #[case(4, 4)]
    fn notes_are_truncated_past_the_limit(#[case] len: usize, #[case] expected: usize) {
        let notes = "t".repeat(len);
        assert_eq!(truncate_notes(&notes).len(), expected);
    }

    #[test]
    fn notes_truncation_counts_characters_not_bytes() {
        let notes = "é".repeat(1200);
        let cut = truncate_notes(&notes);
        assert_eq!(cut.chars().count(), 999);
    }

    #[rstest]
    #[case(600, 499)]
    #[case(501, 499)]
    #[case(500, 500)]
    fn notes_truncation_counts_utf16_units(#[case] emoji: usize, #[case] kept: usize) {
        let notes = "\u{1F600}".repeat(emoji);
        let cut = truncate_notes(&notes);
        assert_eq!(cut.chars().count(), kept);
        assert!(cut.encode_utf16().count() <= NOTES_LIMIT);
    }

    #[test]
    fn notes_truncation_stops_before_a_pair_straddling_the_cut() {
        let notes = format!("{}{}", "t".repeat(998), "\u{1F600}".repeat(2));
        let cut = truncate_notes(&notes);
        assert_eq!(cut, "t".repeat(998));
    }

    #[test]
    fn minifig_collection_filters_put_wanted_first() {
        let params = GetMinifigCollectionParams {
            owned: true,
            wanted: true,
            query: None,
        };
        assert_eq!(
            serde_json::to_string(&params.to_wire()).unwrap(),
            r#"{"wanted":1,"owned":1}"#
        );
    }

    #[test]
    fn minifig_notes_are_omitted_when_absent() {
        let params = SetMinifigCollectionParams {
            own: true,
            want: false,
            qty_owned: 10,
            notes: None,
        };
        assert_eq!(
            to_json(&params.to_wire()),
            json!({ "own": 1, "want": 0, "qtyOwned": 10 })
        );
    }
}
