//! In-memory implementation of the repositories, used by tests in place of
//! PostgreSQL.

use std::collections::{BTreeMap, HashMap};

use axum::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    adverts::{
        repo::AdvertRepo,
        repo_types::{Advert, AdvertFields, AdvertFilter},
    },
    auth::{
        repo::{EmailTaken, UserRepo},
        repo_types::{NewUser, PublicUser, User, DEFAULT_ROLE},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    adverts: BTreeMap<i64, (Uuid, AdvertFields)>,
    last_advert_id: i64,
}

impl Tables {
    fn joined(&self, id: i64, owner: Uuid, fields: &AdvertFields) -> anyhow::Result<Advert> {
        let user = self
            .users
            .get(&owner)
            .ok_or_else(|| anyhow::anyhow!("advert {id} references missing user {owner}"))?;
        Ok(Advert {
            id,
            fields: fields.clone(),
            owner: PublicUser::from(user),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Inserts a ready-made user and returns its id.
    pub async fn add_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        let user = User {
            id,
            first_name: "Test".into(),
            last_name: "User".into(),
            phone_number: "0600000000".into(),
            email: email.into(),
            password_hash: "unused".into(),
            roles: vec![DEFAULT_ROLE.to_string()],
            created_at: OffsetDateTime::now_utc(),
        };
        self.tables.write().await.users.insert(id, user);
        id
    }

    pub async fn user_count(&self) -> usize {
        self.tables.read().await.users.len()
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(EmailTaken(user.email).into());
        }
        let user = User {
            id: Uuid::new_v4(),
            first_name: user.first_name,
            last_name: user.last_name,
            phone_number: user.phone_number,
            email: user.email,
            password_hash: user.password_hash,
            roles: user.roles,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl AdvertRepo for MemoryStore {
    async fn insert(&self, owner: Uuid, fields: &AdvertFields) -> anyhow::Result<Advert> {
        let mut tables = self.tables.write().await;
        let id = tables.last_advert_id + 1;
        let advert = tables.joined(id, owner, fields)?;
        tables.last_advert_id = id;
        tables.adverts.insert(id, (owner, fields.clone()));
        Ok(advert)
    }

    async fn find(&self, id: i64) -> anyhow::Result<Option<Advert>> {
        let tables = self.tables.read().await;
        tables
            .adverts
            .get(&id)
            .map(|(owner, fields)| tables.joined(id, *owner, fields))
            .transpose()
    }

    async fn list(&self) -> anyhow::Result<Vec<Advert>> {
        self.search(&AdvertFilter::default()).await
    }

    async fn search(&self, filter: &AdvertFilter) -> anyhow::Result<Vec<Advert>> {
        let tables = self.tables.read().await;
        let needle = filter.title.as_deref().map(str::to_lowercase);
        tables
            .adverts
            .iter()
            .filter(|(_, (_, f))| {
                needle
                    .as_deref()
                    .map_or(true, |n| f.title.to_lowercase().contains(n))
                    && filter.price_min.map_or(true, |min| f.price >= min)
                    && filter.price_max.map_or(true, |max| f.price <= max)
            })
            .map(|(id, (owner, fields))| tables.joined(*id, *owner, fields))
            .collect()
    }

    async fn update(&self, id: i64, fields: &AdvertFields) -> anyhow::Result<Option<Advert>> {
        let mut tables = self.tables.write().await;
        let Some((owner, stored)) = tables.adverts.get_mut(&id) else {
            return Ok(None);
        };
        *stored = fields.clone();
        let owner = *owner;
        tables.joined(id, owner, fields).map(Some)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.tables.write().await.adverts.remove(&id).is_some())
    }
}
