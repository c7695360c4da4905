use anyhow::Context;
use axum::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::adverts::repo_types::{Advert, AdvertFields, AdvertFilter, AdvertRow};

/// Persistence seam for adverts. Results come back in store order.
#[async_trait]
pub trait AdvertRepo: Send + Sync {
    async fn insert(&self, owner: Uuid, fields: &AdvertFields) -> anyhow::Result<Advert>;
    async fn find(&self, id: i64) -> anyhow::Result<Option<Advert>>;
    async fn list(&self) -> anyhow::Result<Vec<Advert>>;
    async fn search(&self, filter: &AdvertFilter) -> anyhow::Result<Vec<Advert>>;
    /// Overwrites every field of an existing advert; `None` if it vanished.
    async fn update(&self, id: i64, fields: &AdvertFields) -> anyhow::Result<Option<Advert>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

const SELECT_ADVERT: &str = r#"
    SELECT a.id, a.title, a.description, a.price, a.zip_code, a.city, a.user_id,
           u.first_name, u.last_name, u.email, u.phone_number
    FROM advert a
    JOIN "user" u ON u.id = a.user_id
"#;

/// Escapes LIKE wildcards so the input is matched literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[derive(Clone)]
pub struct PgAdvertRepo {
    db: PgPool,
}

impl PgAdvertRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdvertRepo for PgAdvertRepo {
    async fn insert(&self, owner: Uuid, fields: &AdvertFields) -> anyhow::Result<Advert> {
        let row = sqlx::query_as::<_, AdvertRow>(
            r#"
            WITH a AS (
                INSERT INTO advert (title, description, price, zip_code, city, user_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, title, description, price, zip_code, city, user_id
            )
            SELECT a.id, a.title, a.description, a.price, a.zip_code, a.city, a.user_id,
                   u.first_name, u.last_name, u.email, u.phone_number
            FROM a
            JOIN "user" u ON u.id = a.user_id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.zip_code)
        .bind(&fields.city)
        .bind(owner)
        .fetch_one(&self.db)
        .await
        .context("insert advert")?;
        Ok(row.into())
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Advert>> {
        let row = sqlx::query_as::<_, AdvertRow>(&format!("{SELECT_ADVERT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("find advert")?;
        Ok(row.map(Advert::from))
    }

    async fn list(&self) -> anyhow::Result<Vec<Advert>> {
        self.search(&AdvertFilter::default()).await
    }

    async fn search(&self, filter: &AdvertFilter) -> anyhow::Result<Vec<Advert>> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_ADVERT);
        qb.push(" WHERE TRUE");
        if let Some(title) = &filter.title {
            qb.push(" AND a.title ILIKE ")
                .push_bind(format!("%{}%", escape_like(title)));
        }
        if let Some(min) = filter.price_min {
            qb.push(" AND a.price >= ").push_bind(min);
        }
        if let Some(max) = filter.price_max {
            qb.push(" AND a.price <= ").push_bind(max);
        }

        let rows = qb
            .build_query_as::<AdvertRow>()
            .fetch_all(&self.db)
            .await
            .context("search adverts")?;
        Ok(rows.into_iter().map(Advert::from).collect())
    }

    async fn update(&self, id: i64, fields: &AdvertFields) -> anyhow::Result<Option<Advert>> {
        let row = sqlx::query_as::<_, AdvertRow>(
            r#"
            WITH a AS (
                UPDATE advert
                SET title = $1, description = $2, price = $3, zip_code = $4, city = $5
                WHERE id = $6
                RETURNING id, title, description, price, zip_code, city, user_id
            )
            SELECT a.id, a.title, a.description, a.price, a.zip_code, a.city, a.user_id,
                   u.first_name, u.last_name, u.email, u.phone_number
            FROM a
            JOIN "user" u ON u.id = a.user_id
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.price)
        .bind(&fields.zip_code)
        .bind(&fields.city)
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("update advert")?;
        Ok(row.map(Advert::from))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let done = sqlx::query("DELETE FROM advert WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete advert")?;
        Ok(done.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_quotes_wildcards() {
        assert_eq!(escape_like("bike"), "bike");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like(""), "");
    }
}
