use lazy_static::lazy_static;
use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{
    adverts::repo_types::{Advert, AdvertFields, AdvertFilter},
    auth::repo_types::PublicUser,
    error::ApiError,
    validation::Violations,
};

/// Width of the `title` and `city` columns.
pub const MAX_TEXT_LEN: usize = 255;

lazy_static! {
    static ref ZIP_CODE_RE: Regex = Regex::new(r"^[0-9]{5}$").unwrap();
}

/// Advert body for both create and partial update. Absent fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
}

impl From<&AdvertFields> for AdvertPayload {
    fn from(f: &AdvertFields) -> Self {
        Self {
            title: Some(f.title.clone()),
            description: Some(f.description.clone()),
            price: Some(f.price),
            zip_code: Some(f.zip_code.clone()),
            city: Some(f.city.clone()),
        }
    }
}

impl AdvertPayload {
    /// Fields present in `patch` win; the rest are kept from `self`.
    pub fn overlay(self, patch: AdvertPayload) -> Self {
        Self {
            title: patch.title.or(self.title),
            description: patch.description.or(self.description),
            price: patch.price.or(self.price),
            zip_code: patch.zip_code.or(self.zip_code),
            city: patch.city.or(self.city),
        }
    }

    /// Runs every advert rule and yields complete fields, or the full list of
    /// violations.
    pub fn validate(self) -> Result<AdvertFields, ApiError> {
        let mut v = Violations::default();
        v.not_blank("title", self.title.as_deref(), "Title is required.");
        v.max_len(
            "title",
            self.title.as_deref(),
            MAX_TEXT_LEN,
            "Title must be at most 255 characters.",
        );
        v.not_blank("description", self.description.as_deref(), "Description is required.");
        v.present("price", self.price.as_ref(), "Price is required.");
        v.not_blank("zipCode", self.zip_code.as_deref(), "Zip code is required.");
        v.matches(
            "zipCode",
            self.zip_code.as_deref(),
            &ZIP_CODE_RE,
            "Zip code must be exactly 5 digits.",
        );
        v.not_blank("city", self.city.as_deref(), "City is required.");
        v.max_len(
            "city",
            self.city.as_deref(),
            MAX_TEXT_LEN,
            "City must be at most 255 characters.",
        );
        if !v.is_empty() {
            return Err(v.into_error());
        }

        match (self.title, self.description, self.price, self.zip_code, self.city) {
            (Some(title), Some(description), Some(price), Some(zip_code), Some(city)) => {
                Ok(AdvertFields {
                    title,
                    description,
                    price,
                    zip_code,
                    city,
                })
            }
            _ => Err(ApiError::BadRequest("Incomplete advert".into())),
        }
    }
}

/// Query string of `GET /advert/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub price_min: Option<f64>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub price_max: Option<f64>,
}

fn empty_string_as_none<'de, D>(de: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(de)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => {
            let bound = s.parse::<f64>().map_err(de::Error::custom)?;
            if !bound.is_finite() {
                return Err(de::Error::custom("price bound must be a finite number"));
            }
            Ok(Some(bound))
        }
    }
}

impl From<SearchParams> for AdvertFilter {
    fn from(p: SearchParams) -> Self {
        Self {
            title: p.title,
            price_min: p.price_min,
            price_max: p.price_max,
        }
    }
}

/// An advert as shown through the "user" visibility group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvertView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub zip_code: String,
    pub city: String,
    pub user: PublicUser,
}

impl AdvertView {
    pub fn user_group(advert: Advert) -> Self {
        let Advert { id, fields, owner } = advert;
        Self {
            id,
            title: fields.title,
            description: fields.description,
            price: fields.price,
            zip_code: fields.zip_code,
            city: fields.city,
            user: owner,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub status: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
