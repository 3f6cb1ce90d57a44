//! Generic CRUD over entities
//!
//! [`EntityDal`] maps any [`Entity`] to its table (and sub-tables) using the
//! entity's column metadata. Every operation takes the
//! [`ConnectionProvider`] to run on, so the same DAL works on the pool or
//! inside a caller's transaction.

use crate::binding::bind_values;
use crate::changes::{detect_changes, resolve_update_fields};
use crate::connection::ConnectionProvider;
use crate::entity::{
    all_columns, find_column, Column, Entity, SubTable, CREATED_AT_COLUMN, ID_COLUMN,
    PARENT_ID_COLUMN, UPDATED_AT_COLUMN,
};
use crate::errors::DalError;
use crate::rows::{decode_row, encode_row, encode_sub_rows, encoded_sub_rows_to_json, encoded_to_map};
use crate::statements;
use chrono::{DateTime, SubsecRound, Utc};
use filter::{QueryBuilder, QueryParam, SortOrder, SqlGenerator};
use serde_json::{Map, Value};
use sqlx::postgres::PgRow;
use sqlx::Row;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use type_mapping::{to_column_map, SqlValue};
use uuid::Uuid;

/// Update of one entity restricted by a field mask
#[derive(Debug, Clone)]
pub struct UpdateRequest<E> {
    pub id: Uuid,
    pub object: E,
    /// Fields to update; empty means every mutable field
    pub fields: Vec<String>,
    /// Fields removed from the mask
    pub exclude_fields: Vec<String>,
}

impl<E> UpdateRequest<E> {
    pub fn new(id: Uuid, object: E) -> Self {
        Self {
            id,
            object,
            fields: Vec::new(),
            exclude_fields: Vec::new(),
        }
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Generic data access for one entity type
pub struct EntityDal<E: Entity> {
    _phantom: PhantomData<E>,
}

impl<E: Entity> std::fmt::Debug for EntityDal<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityDal")
            .field("entity", &E::entity_name())
            .field("table", &E::table_name())
            .finish()
    }
}

impl<E: Entity> Clone for EntityDal<E> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<E: Entity> Default for EntityDal<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Current time at PostgreSQL precision
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn column_names(columns: &[Column]) -> Vec<&'static str> {
    columns.iter().map(|column| column.name).collect()
}

async fn insert_chunked(
    provider: &ConnectionProvider,
    table: &str,
    columns: &[&str],
    rows: &[Vec<SqlValue>],
) -> Result<(), DalError> {
    for chunk in rows.chunks(statements::rows_per_chunk(columns.len())) {
        let sql = statements::insert_rows(table, columns, chunk.len())?;
        sql_log!("insert", sql);
        let query = bind_values(sqlx::query(&sql), chunk.iter().flatten().cloned());
        provider
            .execute(query)
            .await
            .map_err(|e| e.in_operation(table, "insert"))?;
    }
    Ok(())
}

/// Child rows for one parent: parent id, position, then the sub-table columns
fn sub_table_rows(
    entity: &str,
    parent_id: Uuid,
    rows: Vec<Vec<SqlValue>>,
) -> Result<Vec<Vec<SqlValue>>, DalError> {
    rows.into_iter()
        .enumerate()
        .map(|(position, values)| {
            let position = i32::try_from(position)
                .map_err(|_| DalError::validation(entity, "too many sub-table rows"))?;
            let mut row = Vec::with_capacity(values.len() + 2);
            row.push(SqlValue::Uuid(parent_id));
            row.push(SqlValue::Integer(position));
            row.extend(values);
            Ok(row)
        })
        .collect()
}

impl<E: Entity> EntityDal<E> {
    pub fn new() -> Self {
        Self {
            _phantom: PhantomData,
        }
    }

    /// Insert one entity; see [`EntityDal::insert_many`]
    pub async fn insert(&self, provider: &ConnectionProvider, entity: E) -> Result<E, DalError> {
        let mut stored = self.insert_many(provider, vec![entity]).await?;
        stored
            .pop()
            .ok_or_else(|| DalError::validation(E::entity_name(), "insert produced no entity"))
    }

    /// Insert entities and their sub-table rows in one transaction.
    ///
    /// Nil ids are replaced with fresh v4 ids; `created_at` and `updated_at`
    /// are set to the current time and `deleted_at` is cleared. The returned
    /// entities hold the values as stored.
    pub async fn insert_many(
        &self,
        provider: &ConnectionProvider,
        mut entities: Vec<E>,
    ) -> Result<Vec<E>, DalError> {
        if entities.is_empty() {
            return Ok(entities);
        }

        let entity_name = E::entity_name();
        let table = E::table_name();
        let columns = all_columns::<E>();
        let sub_tables = E::sub_tables();
        let timestamp = now();

        let mut rows = Vec::with_capacity(entities.len());
        let mut sub_rows: Vec<Vec<Vec<SqlValue>>> = vec![Vec::new(); sub_tables.len()];
        let mut stored: Vec<E> = Vec::with_capacity(entities.len());

        for entity in &mut entities {
            let meta = entity.meta_mut();
            if meta.id.is_nil() {
                meta.id = Uuid::new_v4();
            }
            meta.created_at = timestamp;
            meta.updated_at = timestamp;
            meta.deleted_at = None;
            let id = meta.id;

            let map = to_column_map(entity)?;
            let row = encode_row(entity_name, &map, &columns)?;
            let mut stored_map = encoded_to_map(&columns, &row);
            rows.push(row);

            for (sub_table, target) in sub_tables.iter().zip(sub_rows.iter_mut()) {
                let values = encode_sub_rows(entity_name, &map, sub_table)?;
                stored_map.insert(
                    sub_table.field.to_string(),
                    encoded_sub_rows_to_json(sub_table, &values),
                );
                target.extend(sub_table_rows(entity_name, id, values)?);
            }

            // Returned entities carry the stored values, e.g. truncated timestamps
            stored.push(serde_json::from_value(Value::Object(stored_map))?);
        }

        let names = column_names(&columns);
        provider
            .transaction(|tx| async move {
                insert_chunked(&tx, &table, &names, &rows).await?;
                for (sub_table, rows) in sub_tables.iter().zip(sub_rows.iter()) {
                    let names = statements::sub_row_columns(&sub_table.column_names());
                    insert_chunked(&tx, sub_table.table, &names, rows).await?;
                }
                Ok(())
            })
            .await?;

        tracing::debug!(
            entity = entity_name,
            count = stored.len(),
            "Inserted entities"
        );
        Ok(stored)
    }

    /// Get a live (not soft-deleted) entity by id
    pub async fn get(&self, provider: &ConnectionProvider, id: Uuid) -> Result<Option<E>, DalError> {
        Ok(self.get_many(provider, &[id]).await?.pop())
    }

    /// Get live entities by id, in the order of `ids`; missing ids are skipped
    pub async fn get_many(&self, provider: &ConnectionProvider, ids: &[Uuid]) -> Result<Vec<E>, DalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = E::table_name();
        let columns = all_columns::<E>();
        let sql = statements::select_by_ids(&table, &column_names(&columns), false)?;
        sql_log!("get", sql);

        let rows = provider
            .fetch_all(sqlx::query(&sql).bind(ids.to_vec()))
            .await
            .map_err(|e| e.in_operation(&table, "get"))?;

        let mut by_id: HashMap<Uuid, E> = self
            .hydrate(provider, &rows, &columns)
            .await?
            .into_iter()
            .map(|entity| (entity.id(), entity))
            .collect();

        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    /// List entities matching `query`, newest first unless ordered otherwise
    pub async fn list(&self, provider: &ConnectionProvider, query: &QueryBuilder) -> Result<Vec<E>, DalError> {
        self.check_fields(query)?;

        let table = E::table_name();
        let columns = all_columns::<E>();

        let mut generator = SqlGenerator::new();
        let condition = generator.conditions_sql(query.conditions())?;
        let params = self.typed_params(generator.into_params())?;

        let order_clause = if query.ordering().is_empty() {
            SqlGenerator::build_order_clause(&[(CREATED_AT_COLUMN.to_string(), SortOrder::Desc)])?
        } else {
            query.build_order_clause()?
        };

        let sql = statements::select(
            &table,
            &column_names(&columns),
            condition.as_deref(),
            query.includes_deleted(),
            &order_clause,
            &query.build_limit_clause(),
        )?;
        sql_log!("list", sql);

        let rows = provider
            .fetch_all(bind_values(sqlx::query(&sql), params))
            .await
            .map_err(|e| e.in_operation(&table, "list"))?;

        self.hydrate(provider, &rows, &columns).await
    }

    /// Count entities matching the filters of `query`
    pub async fn count(&self, provider: &ConnectionProvider, query: &QueryBuilder) -> Result<i64, DalError> {
        self.check_fields(query)?;

        let table = E::table_name();
        let mut generator = SqlGenerator::new();
        let condition = generator.conditions_sql(query.conditions())?;
        let params = self.typed_params(generator.into_params())?;

        let sql = statements::count(&table, condition.as_deref(), query.includes_deleted())?;
        sql_log!("count", sql);

        let row = provider
            .fetch_one(bind_values(sqlx::query(&sql), params))
            .await
            .map_err(|e| e.in_operation(&table, "count"))?;

        row.try_get::<i64, _>("total")
            .map_err(|e| DalError::database_operation(&table, "count", e))
    }

    /// Apply the changed fields of `request` and return the stored entity.
    ///
    /// Nothing is written when the selected fields already hold the
    /// requested values; the current entity is returned as is.
    pub async fn update(&self, provider: &ConnectionProvider, request: UpdateRequest<E>) -> Result<E, DalError> {
        let entity_name = E::entity_name();
        let fields = resolve_update_fields::<E>(&request.fields, &request.exclude_fields)?;
        let requested = to_column_map(&request.object)?;
        let id = request.id;

        provider
            .transaction(|tx| async move {
                let current = self
                    .get(&tx, id)
                    .await?
                    .ok_or_else(|| DalError::not_found(entity_name, id))?;
                let current_map = to_column_map(&current)?;

                let changes = detect_changes(entity_name, &fields, &current_map, &requested)?;
                if changes.is_empty() {
                    tracing::debug!(entity = entity_name, %id, "Update skipped, nothing changed");
                    return Ok(current);
                }

                let table = E::table_name();
                let mut names: Vec<&str> = changes.columns.iter().map(|(c, _)| c.name).collect();
                names.push(UPDATED_AT_COLUMN);
                let mut values: Vec<SqlValue> =
                    changes.columns.iter().map(|(_, v)| v.clone()).collect();
                values.push(SqlValue::Timestamp(now()));
                values.push(SqlValue::Uuid(id));

                let sql = statements::update_by_id(&table, &names)?;
                sql_log!("update", sql);
                let result = tx
                    .execute(bind_values(sqlx::query(&sql), values))
                    .await
                    .map_err(|e| e.in_operation(&table, "update"))?;
                if result.rows_affected() == 0 {
                    return Err(DalError::not_found(entity_name, id));
                }

                for (sub_table, rows) in &changes.sub_tables {
                    self.replace_sub_rows(&tx, sub_table, id, rows.clone()).await?;
                }

                tracing::debug!(
                    entity = entity_name,
                    %id,
                    fields = ?changes.changed_fields(),
                    "Updated entity"
                );

                self.get(&tx, id)
                    .await?
                    .ok_or_else(|| DalError::not_found(entity_name, id))
            })
            .await
    }

    /// Soft delete one entity
    pub async fn delete(&self, provider: &ConnectionProvider, id: Uuid) -> Result<(), DalError> {
        let deleted = self.delete_many(provider, &[id]).await?;
        if deleted.is_empty() {
            return Err(DalError::not_found(E::entity_name(), id));
        }
        Ok(())
    }

    /// Soft delete entities; returns the ids that were live and are now deleted
    pub async fn delete_many(&self, provider: &ConnectionProvider, ids: &[Uuid]) -> Result<Vec<Uuid>, DalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let table = E::table_name();
        let sql = statements::soft_delete(&table)?;
        sql_log!("delete", sql);

        let rows = provider
            .fetch_all(sqlx::query(&sql).bind(now()).bind(ids.to_vec()))
            .await
            .map_err(|e| e.in_operation(&table, "delete"))?;

        let deleted = rows
            .iter()
            .map(|row| row.try_get::<Uuid, _>(ID_COLUMN))
            .collect::<Result<HashSet<_>, _>>()
            .map_err(|e| DalError::database_operation(&table, "delete", e))?;

        tracing::debug!(
            entity = E::entity_name(),
            requested = ids.len(),
            deleted = deleted.len(),
            "Soft deleted entities"
        );

        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| deleted.contains(id) && seen.insert(**id))
            .copied()
            .collect())
    }

    /// Permanently remove an entity and its sub-table rows, deleted or not
    pub async fn purge(&self, provider: &ConnectionProvider, id: Uuid) -> Result<bool, DalError> {
        let table = E::table_name();

        provider
            .transaction(|tx| async move {
                for sub_table in E::sub_tables() {
                    let sql = statements::delete_sub_rows(sub_table.table)?;
                    tx.execute(sqlx::query(&sql).bind(vec![id]))
                        .await
                        .map_err(|e| e.in_operation(sub_table.table, "purge"))?;
                }

                let sql = statements::delete_by_id(&table)?;
                sql_log!("purge", sql);
                let result = tx
                    .execute(sqlx::query(&sql).bind(id))
                    .await
                    .map_err(|e| e.in_operation(&table, "purge"))?;

                Ok(result.rows_affected() > 0)
            })
            .await
    }

    /// Every filter and order field must be a stored column
    fn check_fields(&self, query: &QueryBuilder) -> Result<(), DalError> {
        for field in query.referenced_fields() {
            if find_column::<E>(&field).is_none() {
                return Err(DalError::unknown_field(E::entity_name(), &field));
            }
        }
        Ok(())
    }

    /// Convert filter parameters to the storage type of their column.
    ///
    /// Scalar values compared against an array column (`HAS_ANY`,
    /// `HAS_ALL`) use the array's element type.
    fn typed_params(&self, params: Vec<QueryParam>) -> Result<Vec<SqlValue>, DalError> {
        params
            .into_iter()
            .map(|param| {
                let column = find_column::<E>(&param.field)
                    .ok_or_else(|| DalError::unknown_field(E::entity_name(), &param.field))?;
                let column_type = match column.column_type.element_type() {
                    Some(element) if !param.value.is_array() => element,
                    _ => column.column_type,
                };
                SqlValue::from_json(&param.value, column_type)
                    .map_err(|e| DalError::invalid_value(&param.field, e))
            })
            .collect()
    }

    /// Decode rows and attach sub-table lists, then deserialize
    async fn hydrate(
        &self,
        provider: &ConnectionProvider,
        rows: &[PgRow],
        columns: &[Column],
    ) -> Result<Vec<E>, DalError> {
        let table = E::table_name();
        let mut maps = Vec::with_capacity(rows.len());
        let mut ids = Vec::with_capacity(rows.len());
        for row in rows {
            let map = decode_row(row, columns).map_err(|e| DalError::database_operation(&table, "decode", e))?;
            let id = row
                .try_get::<Uuid, _>(ID_COLUMN)
                .map_err(|e| DalError::database_operation(&table, "decode", e))?;
            maps.push(map);
            ids.push(id);
        }

        if !ids.is_empty() {
            for sub_table in E::sub_tables() {
                let mut grouped = self.load_sub_rows(provider, sub_table, &ids).await?;
                for (id, map) in ids.iter().zip(maps.iter_mut()) {
                    let items = grouped.remove(id).unwrap_or_default();
                    map.insert(sub_table.field.to_string(), Value::Array(items));
                }
            }
        }

        maps.into_iter()
            .map(|map| serde_json::from_value(Value::Object(map)).map_err(DalError::from))
            .collect()
    }

    async fn load_sub_rows(
        &self,
        provider: &ConnectionProvider,
        sub_table: &SubTable,
        parent_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Value>>, DalError> {
        let sql = statements::select_sub_rows(sub_table.table, &sub_table.column_names())?;
        sql_log!("load_sub_rows", sql);

        let rows = provider
            .fetch_all(sqlx::query(&sql).bind(parent_ids.to_vec()))
            .await
            .map_err(|e| e.in_operation(sub_table.table, "get"))?;

        let mut grouped: HashMap<Uuid, Vec<Value>> = HashMap::new();
        for row in &rows {
            let parent_id = row
                .try_get::<Uuid, _>(PARENT_ID_COLUMN)
                .map_err(|e| DalError::database_operation(sub_table.table, "decode", e))?;
            let item: Map<String, Value> = decode_row(row, sub_table.columns)
                .map_err(|e| DalError::database_operation(sub_table.table, "decode", e))?;
            grouped.entry(parent_id).or_default().push(Value::Object(item));
        }
        Ok(grouped)
    }

    async fn replace_sub_rows(
        &self,
        provider: &ConnectionProvider,
        sub_table: &SubTable,
        parent_id: Uuid,
        rows: Vec<Vec<SqlValue>>,
    ) -> Result<(), DalError> {
        let sql = statements::delete_sub_rows(sub_table.table)?;
        sql_log!("replace_sub_rows", sql);
        provider
            .execute(sqlx::query(&sql).bind(vec![parent_id]))
            .await
            .map_err(|e| e.in_operation(sub_table.table, "update"))?;

        let rows = sub_table_rows(E::entity_name(), parent_id, rows)?;
        let names = statements::sub_row_columns(&sub_table.column_names());
        insert_chunked(provider, sub_table.table, &names, &rows).await
    }
}
