//! Request building, response unwrapping and one method per Brickset endpoint.
//!
//! # Design
//! `BricksetClient` holds only its `ClientConfig` and a `Transport`. Every
//! operation builds one form-encoded POST with `build_request`, runs it
//! through the transport and unwraps the status envelope with
//! `parse_response`. Both halves are public so a host that owns its own I/O
//! can drive them directly.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::form::FormBody;
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::params::{
    GetMinifigCollectionParams, GetSetsParams, SetCollectionParams, SetMinifigCollectionParams,
};
use crate::types::{
    ApiKeyUsage, Image, Instruction, MinifigCollectionEntry, Review, Set, Subtheme, Theme,
    UserMinifigNote, UserNote, Year,
};

/// Route suffixes appended to the base URL.
pub mod routes {
    pub const CHECK_KEY: &str = "checkKey";
    pub const CHECK_USER_HASH: &str = "checkUserHash";
    pub const GET_KEY_USAGE_STATS: &str = "getKeyUsageStats";
    pub const LOGIN: &str = "login";
    pub const GET_SETS: &str = "getSets";
    pub const GET_ADDITIONAL_IMAGES: &str = "getAdditionalImages";
    pub const GET_INSTRUCTIONS: &str = "getInstructions";
    pub const GET_INSTRUCTIONS_2: &str = "getInstructions2";
    pub const GET_REVIEWS: &str = "getReviews";
    pub const GET_THEMES: &str = "getThemes";
    pub const GET_SUBTHEMES: &str = "getSubthemes";
    pub const GET_YEARS: &str = "getYears";
    pub const SET_COLLECTION: &str = "setCollection";
    pub const GET_MINIFIG_COLLECTION: &str = "getMinifigCollection";
    pub const SET_MINIFIG_COLLECTION: &str = "setMinifigCollection";
    pub const GET_USER_NOTES: &str = "getUserNotes";
    pub const GET_USER_MINIFIG_NOTES: &str = "getUserMinifigNotes";
}

const SUCCESS: &str = "success";
const ERROR: &str = "error";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A response envelope whose status tag was not `error`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResponseEnvelope {
    /// Empty when the body carries no tag; that is never a success.
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ResponseEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }

    /// Deserialize one payload field, e.g. `sets` or `hash`.
    pub fn take<D: DeserializeOwned>(mut self, field: &str) -> Result<D> {
        let value = self
            .payload
            .remove(field)
            .ok_or_else(|| ApiError::Deserialization(format!("missing field `{field}`")))?;
        serde_json::from_value(value)
            .map_err(|e| ApiError::Deserialization(format!("field `{field}`: {e}")))
    }
}

/// Blocking client for the Brickset v3 API.
#[derive(Debug, Clone)]
pub struct BricksetClient<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl BricksetClient {
    pub fn new(api_key: &str) -> Self {
        Self::from_config(ClientConfig::new(api_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> BricksetClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the POST for `route`. The API key is always the last field.
    pub fn build_request(&self, route: &str, form: FormBody) -> HttpRequest {
        let form = form.field("apiKey", &self.config.api_key);
        HttpRequest {
            url: format!("{}/{route}", self.config.base_url),
            headers: vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())],
            body: form.encode(),
        }
    }

    /// Fail on a non-2xx status without reading the body, then fail on an
    /// `error` envelope, otherwise hand the envelope back unchanged.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ResponseEnvelope> {
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
            });
        }

        let envelope: ResponseEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        if envelope.status == ERROR {
            let message = envelope
                .payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(ApiError::Api { message });
        }
        Ok(envelope)
    }

    fn request(&self, route: &str, form: FormBody) -> Result<ResponseEnvelope> {
        let request = self.build_request(route, form);
        debug!(route, "sending Brickset request");

        let response = self.transport.execute(&request)?;
        debug!(route, status = response.status, "received Brickset response");

        self.parse_response(response).inspect_err(|e| {
            warn!(route, error = %e, "Brickset request failed");
        })
    }

    /// Check if the API key is valid.
    pub fn check_key(&self) -> Result<bool> {
        let envelope = self.request(routes::CHECK_KEY, FormBody::new())?;
        Ok(envelope.is_success())
    }

    /// Check if a user hash from `login` is still valid.
    pub fn check_user_hash(&self, user_hash: &str) -> Result<bool> {
        let form = FormBody::new().field("userHash", user_hash);
        let envelope = self.request(routes::CHECK_USER_HASH, form)?;
        Ok(envelope.is_success())
    }

    /// Key usage for the last 30 days. Only `getSets` calls count.
    pub fn get_key_usage_stats(&self) -> Result<Vec<ApiKeyUsage>> {
        self.request(routes::GET_KEY_USAGE_STATS, FormBody::new())?
            .take("apiKeyUsage")
    }

    /// Log in and return the user hash required by collection endpoints.
    pub fn login(&self, username: &str, password: &str) -> Result<String> {
        let form = FormBody::new()
            .field("username", username)
            .field("password", password);
        self.request(routes::LOGIN, form)?.take("hash")
    }

    /// Search the catalog. Pass a user hash to include the user's collection
    /// details or to filter on `owned` / `wanted`.
    ///
    /// Upstream limits this endpoint to a daily call quota; nothing here
    /// tracks it.
    pub fn get_sets(&self, params: &GetSetsParams, user_hash: Option<&str>) -> Result<Vec<Set>> {
        let form = FormBody::new()
            .params(&params.to_wire())?
            .field("userHash", user_hash.unwrap_or_default());
        self.request(routes::GET_SETS, form)?.take("sets")
    }

    pub fn get_additional_images(&self, set_id: u32) -> Result<Vec<Image>> {
        let form = FormBody::new().field("setID", set_id);
        self.request(routes::GET_ADDITIONAL_IMAGES, form)?
            .take("additionalImages")
    }

    pub fn get_instructions(&self, set_id: u32) -> Result<Vec<Instruction>> {
        let form = FormBody::new().field("setID", set_id);
        self.request(routes::GET_INSTRUCTIONS, form)?
            .take("instructions")
    }

    /// Instructions for a set number such as `10270-1`, without looking up
    /// the set ID first.
    pub fn get_instructions_by_set_number(&self, set_number: &str) -> Result<Vec<Instruction>> {
        let form = FormBody::new().field("setNumber", set_number);
        self.request(routes::GET_INSTRUCTIONS_2, form)?
            .take("instructions")
    }

    pub fn get_reviews(&self, set_id: u32) -> Result<Vec<Review>> {
        let form = FormBody::new().field("setID", set_id);
        self.request(routes::GET_REVIEWS, form)?.take("reviews")
    }

    /// All themes with their set counts.
    pub fn get_themes(&self) -> Result<Vec<Theme>> {
        self.request(routes::GET_THEMES, FormBody::new())?
            .take("themes")
    }

    pub fn get_subthemes(&self, theme: &str) -> Result<Vec<Subtheme>> {
        let form = FormBody::new().field("Theme", theme);
        self.request(routes::GET_SUBTHEMES, form)?.take("subthemes")
    }

    /// Years with their set counts, across all themes when `theme` is `None`.
    pub fn get_years(&self, theme: Option<&str>) -> Result<Vec<Year>> {
        let form = FormBody::new().field("Theme", theme.unwrap_or_default());
        self.request(routes::GET_YEARS, form)?.take("years")
    }

    /// Set a user's collection details for one set.
    pub fn set_collection(
        &self,
        set_id: u32,
        params: &SetCollectionParams,
        user_hash: &str,
    ) -> Result<bool> {
        let form = FormBody::new()
            .params(&params.to_wire())?
            .field("setID", set_id)
            .field("userHash", user_hash);
        let envelope = self.request(routes::SET_COLLECTION, form)?;
        Ok(envelope.is_success())
    }

    pub fn get_minifig_collection(
        &self,
        params: &GetMinifigCollectionParams,
        user_hash: &str,
    ) -> Result<Vec<MinifigCollectionEntry>> {
        let form = FormBody::new()
            .params(&params.to_wire())?
            .field("userHash", user_hash);
        self.request(routes::GET_MINIFIG_COLLECTION, form)?
            .take("minifigs")
    }

    /// Add or change a user's loose minifig collection.
    pub fn set_minifig_collection(
        &self,
        minifig_number: &str,
        params: &SetMinifigCollectionParams,
        user_hash: &str,
    ) -> Result<bool> {
        let form = FormBody::new()
            .params(&params.to_wire())?
            .field("minifigNumber", minifig_number)
            .field("userHash", user_hash);
        let envelope = self.request(routes::SET_MINIFIG_COLLECTION, form)?;
        Ok(envelope.is_success())
    }

    pub fn get_user_notes(&self, user_hash: &str) -> Result<Vec<UserNote>> {
        let form = FormBody::new().field("userHash", user_hash);
        self.request(routes::GET_USER_NOTES, form)?
            .take("userNotes")
    }

    pub fn get_user_minifig_notes(&self, user_hash: &str) -> Result<Vec<UserMinifigNote>> {
        let form = FormBody::new().field("userHash", user_hash);
        self.request(routes::GET_USER_MINIFIG_NOTES, form)?
            .take("userMinifigNotes")
    }
}
