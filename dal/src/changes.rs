//! Update field masks and change detection.

use crate::entity::{find_column, find_sub_table, Column, Entity, SubTable};
use crate::errors::DalError;
use crate::rows::{encode_row, encode_sub_rows};
use serde_json::{Map, Value};
use type_mapping::SqlValue;

/// A field an update may touch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpdateField {
    Column(Column),
    SubTable(SubTable),
}

impl UpdateField {
    pub fn name(&self) -> &'static str {
        match self {
            UpdateField::Column(column) => column.name,
            UpdateField::SubTable(sub_table) => sub_table.field,
        }
    }
}

/// Columns and sub-tables whose requested value differs from the stored one
#[derive(Debug, Default, PartialEq)]
pub struct ChangeSet {
    pub columns: Vec<(Column, SqlValue)>,
    pub sub_tables: Vec<(SubTable, Vec<Vec<SqlValue>>)>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.sub_tables.is_empty()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .map(|(column, _)| column.name)
            .chain(self.sub_tables.iter().map(|(sub_table, _)| sub_table.field))
            .collect()
    }
}

fn lookup_field<E: Entity>(name: &str) -> Result<UpdateField, DalError> {
    if let Some(column) = find_column::<E>(name) {
        return Ok(UpdateField::Column(column));
    }
    find_sub_table::<E>(name)
        .map(UpdateField::SubTable)
        .ok_or_else(|| DalError::unknown_field(E::entity_name(), name))
}

/// Resolve the field mask of an update.
///
/// An empty `fields` list selects every mutable column and sub-table.
/// Named fields must exist and be mutable; exclusions must exist.
pub fn resolve_update_fields<E: Entity>(
    fields: &[String],
    exclude_fields: &[String],
) -> Result<Vec<UpdateField>, DalError> {
    for name in exclude_fields {
        lookup_field::<E>(name)?;
    }

    let selected = if fields.is_empty() {
        E::columns()
            .iter()
            .filter(|column| column.mutable)
            .copied()
            .map(UpdateField::Column)
            .chain(
                E::sub_tables()
                    .iter()
                    .filter(|sub_table| sub_table.mutable)
                    .copied()
                    .map(UpdateField::SubTable),
            )
            .collect::<Vec<_>>()
    } else {
        let mut selected = Vec::with_capacity(fields.len());
        for name in fields {
            let field = lookup_field::<E>(name)?;
            let mutable = match field {
                UpdateField::Column(column) => column.mutable,
                UpdateField::SubTable(sub_table) => sub_table.mutable,
            };
            if !mutable {
                return Err(DalError::immutable_field(E::entity_name(), name));
            }
            if !selected.contains(&field) {
                selected.push(field);
            }
        }
        selected
    };

    Ok(selected
        .into_iter()
        .filter(|field| !exclude_fields.iter().any(|name| name == field.name()))
        .collect())
}

/// Compare the stored and requested values of the selected fields
pub fn detect_changes(
    entity: &str,
    fields: &[UpdateField],
    current: &Map<String, Value>,
    requested: &Map<String, Value>,
) -> Result<ChangeSet, DalError> {
    let mut changes = ChangeSet::default();

    for field in fields {
        match field {
            UpdateField::Column(column) => {
                let columns = std::slice::from_ref(column);
                let before = encode_row(entity, current, columns)?;
                let mut after = encode_row(entity, requested, columns)?;
                if before != after {
                    if let Some(value) = after.pop() {
                        changes.columns.push((*column, value));
                    }
                }
            }
            UpdateField::SubTable(sub_table) => {
                let before = encode_sub_rows(entity, current, sub_table)?;
                let after = encode_sub_rows(entity, requested, sub_table)?;
                if before != after {
                    changes.sub_tables.push((*sub_table, after));
                }
            }
        }
    }

    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Meta;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use type_mapping::ColumnType;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Tag {
        label: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Article {
        #[serde(flatten)]
        meta: Meta,
        slug: String,
        title: String,
        views: i64,
        tags: Vec<Tag>,
    }

    const TAG_COLUMNS: &[Column] = &[Column::new("label", ColumnType::Text)];

    impl Entity for Article {
        fn entity_name() -> &'static str {
            "Article"
        }

        fn columns() -> &'static [Column] {
            const COLUMNS: &[Column] = &[
                Column::new("slug", ColumnType::Text).immutable(),
                Column::new("title", ColumnType::Text),
                Column::new("views", ColumnType::BigInt),
            ];
            COLUMNS
        }

        fn sub_tables() -> &'static [SubTable] {
            const SUB_TABLES: &[SubTable] = &[SubTable::new("tags", "article_tags", TAG_COLUMNS)];
            SUB_TABLES
        }

        fn meta(&self) -> &Meta {
            &self.meta
        }

        fn meta_mut(&mut self) -> &mut Meta {
            &mut self.meta
        }
    }

    fn names(fields: &[UpdateField]) -> Vec<&'static str> {
        fields.iter().map(UpdateField::name).collect()
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_empty_mask_selects_mutable_fields() {
        let fields = resolve_update_fields::<Article>(&[], &[]).unwrap();
        assert_eq!(names(&fields), vec!["title", "views", "tags"]);

        let fields = resolve_update_fields::<Article>(&[], &["views".to_string()]).unwrap();
        assert_eq!(names(&fields), vec!["title", "tags"]);
    }

    #[test]
    fn test_mask_validation() {
        assert!(matches!(
            resolve_update_fields::<Article>(&["colour".to_string()], &[]),
            Err(DalError::UnknownField { .. })
        ));
        assert!(matches!(
            resolve_update_fields::<Article>(&["slug".to_string()], &[]),
            Err(DalError::ImmutableField { .. })
        ));
        assert!(matches!(
            resolve_update_fields::<Article>(&["created_at".to_string()], &[]),
            Err(DalError::ImmutableField { .. })
        ));
        assert!(matches!(
            resolve_update_fields::<Article>(&[], &["nope".to_string()]),
            Err(DalError::UnknownField { .. })
        ));

        let fields = resolve_update_fields::<Article>(
            &["title".to_string(), "title".to_string(), "tags".to_string()],
            &["tags".to_string()],
        )
        .unwrap();
        assert_eq!(names(&fields), vec!["title"]);
    }

    #[test]
    fn test_detect_changes() {
        let fields = resolve_update_fields::<Article>(&[], &[]).unwrap();
        let current = object(json!({
            "title": "Hello",
            "views": 10,
            "tags": [{"label": "rust"}]
        }));

        let same = detect_changes("Article", &fields, &current, &current.clone()).unwrap();
        assert!(same.is_empty());

        let requested = object(json!({
            "title": "Hello",
            "views": 11,
            "tags": [{"label": "rust"}, {"label": "sql"}]
        }));
        let changes = detect_changes("Article", &fields, &current, &requested).unwrap();
        assert_eq!(changes.changed_fields(), vec!["views", "tags"]);
        assert_eq!(changes.columns[0].1, SqlValue::BigInt(11));
        assert_eq!(changes.sub_tables[0].1.len(), 2);
    }

    #[test]
    fn test_unselected_fields_ignored() {
        let fields = resolve_update_fields::<Article>(&["title".to_string()], &[]).unwrap();
        let current = object(json!({"title": "A", "views": 1, "tags": []}));
        let requested = object(json!({"title": "A", "views": 99, "tags": []}));
        assert!(detect_changes("Article", &fields, &current, &requested)
            .unwrap()
            .is_empty());
    }
}
