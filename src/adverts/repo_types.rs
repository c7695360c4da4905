use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::repo_types::PublicUser;

/// A validated, complete set of advert fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvertFields {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub zip_code: String,
    pub city: String,
}

/// An advert as loaded from the store, with its owner attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Advert {
    pub id: i64,
    pub fields: AdvertFields,
    pub owner: PublicUser,
}

impl Advert {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner.id == user_id
    }
}

/// Conjunctive search filter; `None` imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvertFilter {
    pub title: Option<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

/// Flat row of `advert` joined with its owner.
#[derive(Debug, FromRow)]
pub struct AdvertRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub zip_code: String,
    pub city: String,
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

impl From<AdvertRow> for Advert {
    fn from(r: AdvertRow) -> Self {
        Self {
            id: r.id,
            fields: AdvertFields {
                title: r.title,
                description: r.description,
                price: r.price,
                zip_code: r.zip_code,
                city: r.city,
            },
            owner: PublicUser {
                id: r.user_id,
                first_name: r.first_name,
                last_name: r.last_name,
                email: r.email,
                phone_number: r.phone_number,
            },
        }
    }
}
