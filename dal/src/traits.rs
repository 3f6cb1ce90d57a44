//! Trait definitions
//!
//! [`Dal`] exposes the [`EntityDal`] operations as an async trait.

use crate::connection::ConnectionProvider;
use crate::entity::Entity;
use crate::entity_dal::{EntityDal, UpdateRequest};
use crate::errors::DalError;
use async_trait::async_trait;
use filter::QueryBuilder;
use uuid::Uuid;

/// Common data access operations for one entity type
#[async_trait]
pub trait Dal: Send + Sync {
    type Entity: Entity;

    async fn insert(
        &self,
        provider: &ConnectionProvider,
        entity: Self::Entity,
    ) -> Result<Self::Entity, DalError>;

    async fn insert_many(
        &self,
        provider: &ConnectionProvider,
        entities: Vec<Self::Entity>,
    ) -> Result<Vec<Self::Entity>, DalError>;

    async fn get(
        &self,
        provider: &ConnectionProvider,
        id: Uuid,
    ) -> Result<Option<Self::Entity>, DalError>;

    async fn get_many(
        &self,
        provider: &ConnectionProvider,
        ids: &[Uuid],
    ) -> Result<Vec<Self::Entity>, DalError>;

    async fn list(
        &self,
        provider: &ConnectionProvider,
        query: &QueryBuilder,
    ) -> Result<Vec<Self::Entity>, DalError>;

    async fn count(&self, provider: &ConnectionProvider, query: &QueryBuilder) -> Result<i64, DalError>;

    async fn update(
        &self,
        provider: &ConnectionProvider,
        request: UpdateRequest<Self::Entity>,
    ) -> Result<Self::Entity, DalError>;

    async fn delete(&self, provider: &ConnectionProvider, id: Uuid) -> Result<(), DalError>;

    async fn delete_many(
        &self,
        provider: &ConnectionProvider,
        ids: &[Uuid],
    ) -> Result<Vec<Uuid>, DalError>;

    async fn purge(&self, provider: &ConnectionProvider, id: Uuid) -> Result<bool, DalError>;
}

#[async_trait]
impl<E: Entity> Dal for EntityDal<E> {
    type Entity = E;

    async fn insert(&self, provider: &ConnectionProvider, entity: E) -> Result<E, DalError> {
        EntityDal::insert(self, provider, entity).await
    }

    async fn insert_many(
        &self,
        provider: &ConnectionProvider,
        entities: Vec<E>,
    ) -> Result<Vec<E>, DalError> {
        EntityDal::insert_many(self, provider, entities).await
    }

    async fn get(&self, provider: &ConnectionProvider, id: Uuid) -> Result<Option<E>, DalError> {
        EntityDal::get(self, provider, id).await
    }

    async fn get_many(&self, provider: &ConnectionProvider, ids: &[Uuid]) -> Result<Vec<E>, DalError> {
        EntityDal::get_many(self, provider, ids).await
    }

    async fn list(&self, provider: &ConnectionProvider, query: &QueryBuilder) -> Result<Vec<E>, DalError> {
        EntityDal::list(self, provider, query).await
    }

    async fn count(&self, provider: &ConnectionProvider, query: &QueryBuilder) -> Result<i64, DalError> {
        EntityDal::count(self, provider, query).await
    }

    async fn update(
        &self,
        provider: &ConnectionProvider,
        request: UpdateRequest<E>,
    ) -> Result<E, DalError> {
        EntityDal::update(self, provider, request).await
    }

    async fn delete(&self, provider: &ConnectionProvider, id: Uuid) -> Result<(), DalError> {
        EntityDal::delete(self, provider, id).await
    }

    async fn delete_many(&self, provider: &ConnectionProvider, ids: &[Uuid]) -> Result<Vec<Uuid>, DalError> {
        EntityDal::delete_many(self, provider, ids).await
    }

    async fn purge(&self, provider: &ConnectionProvider, id: Uuid) -> Result<bool, DalError> {
        EntityDal::purge(self, provider, id).await
    }
}
