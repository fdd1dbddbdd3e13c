use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    Int,
    BigInt,
    Serial,
    BigSerial,
    Varchar,
    Text,
    Char,
    Boolean,
    Date,
    Timestamp,
    TimestampTz,
    Float,
    Double,
    Decimal,
    Numeric,
    Uuid,
    Json,
    Jsonb,
    Bytea,
}

impl ColumnType {
    /// Picker order.
    pub const ALL: [ColumnType; 19] = [
        Self::Int,
        Self::BigInt,
        Self::Serial,
        Self::BigSerial,
        Self::Varchar,
        Self::Text,
        Self::Char,
        Self::Boolean,
        Self::Date,
        Self::Timestamp,
        Self::TimestampTz,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Numeric,
        Self::Uuid,
        Self::Json,
        Self::Jsonb,
        Self::Bytea,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::BigInt => "BIGINT",
            Self::Serial => "SERIAL",
            Self::BigSerial => "BIGSERIAL",
            Self::Varchar => "VARCHAR",
            Self::Text => "TEXT",
            Self::Char => "CHAR",
            Self::Boolean => "BOOLEAN",
            Self::Date => "DATE",
            Self::Timestamp => "TIMESTAMP",
            Self::TimestampTz => "TIMESTAMPTZ",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Uuid => "UUID",
            Self::Json => "JSON",
            Self::Jsonb => "JSONB",
            Self::Bytea => "BYTEA",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| UnknownVariant {
                kind: "column type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipType {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl RelationshipType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OneToOne => "one-to-one",
            Self::OneToMany => "one-to-many",
            Self::ManyToMany => "many-to-many",
        }
    }

    /// Short cardinality label drawn on connectors and in relationship lists.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneToOne => "1:1",
            Self::OneToMany => "1:N",
            Self::ManyToMany => "N:N",
        }
    }

    /// Whether the terminal end is a "many" side.
    pub fn is_many_ended(self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "one-to-one" | "1:1" => Ok(Self::OneToOne),
            "one-to-many" | "1:n" => Ok(Self::OneToMany),
            "many-to-many" | "n:n" => Ok(Self::ManyToMany),
            _ => Err(UnknownVariant {
                kind: "relationship type",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub is_primary_key: bool,
    pub is_foreign_key: bool,
    pub is_nullable: bool,
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Column {
    /// The `id SERIAL` column every new table starts with.
    pub fn primary_key(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "id".to_string(),
            column_type: ColumnType::Serial,
            is_primary_key: true,
            is_foreign_key: false,
            is_nullable: false,
            is_unique: true,
            default_value: None,
        }
    }

    /// A nullable `column VARCHAR`, appended by "add column".
    pub fn placeholder(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "column".to_string(),
            column_type: ColumnType::Varchar,
            is_primary_key: false,
            is_foreign_key: false,
            is_nullable: true,
            is_unique: false,
            default_value: None,
        }
    }
}

/// Field-level update for a column. `None` leaves the field untouched;
/// `default_value: Some(None)` clears the default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub column_type: Option<ColumnType>,
    pub is_primary_key: Option<bool>,
    pub is_foreign_key: Option<bool>,
    pub is_nullable: Option<bool>,
    pub is_unique: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    pub default_value: Option<Option<String>>,
}

impl ColumnPatch {
    pub fn apply(&self, column: &mut Column) {
        if let Some(name) = &self.name {
            column.name = name.clone();
        }
        if let Some(column_type) = self.column_type {
            column.column_type = column_type;
        }
        if let Some(v) = self.is_primary_key {
            column.is_primary_key = v;
        }
        if let Some(v) = self.is_foreign_key {
            column.is_foreign_key = v;
        }
        if let Some(v) = self.is_nullable {
            column.is_nullable = v;
        }
        if let Some(v) = self.is_unique {
            column.is_unique = v;
        }
        if let Some(default_value) = &self.default_value {
            column.default_value = default_value.clone();
        }
    }
}

/// Distinguishes an explicit `null` (clear) from an absent key (keep).
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: String,
    pub name: String,
    pub columns: Vec<Column>,
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Table {
    pub fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// Display index of a column, which is also its vertical slot on the canvas.
    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RelationshipType,
    pub from_table_id: String,
    pub from_column_id: String,
    pub to_table_id: String,
    pub to_column_id: String,
}

impl Relationship {
    pub fn touches_table(&self, table_id: &str) -> bool {
        self.from_table_id == table_id || self.to_table_id == table_id
    }

    pub fn touches_column(&self, table_id: &str, column_id: &str) -> bool {
        (self.from_table_id == table_id && self.from_column_id == column_id)
            || (self.to_table_id == table_id && self.to_column_id == column_id)
    }
}

/// One immutable state of the diagram editor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramSnapshot {
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub selected_table_id: Option<String>,
}

impl DiagramSnapshot {
    pub fn table(&self, table_id: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    /// Whether both endpoints name an existing table and a column on it.
    pub fn resolves(&self, rel: &Relationship) -> bool {
        self.resolve_endpoint(&rel.from_table_id, &rel.from_column_id)
            && self.resolve_endpoint(&rel.to_table_id, &rel.to_column_id)
    }

    fn resolve_endpoint(&self, table_id: &str, column_id: &str) -> bool {
        self.table(table_id)
            .is_some_and(|t| t.column(column_id).is_some())
    }

    /// Drops every relationship that no longer resolves and a selection that
    /// points at a missing table, in one pass over the snapshot. Returns the
    /// number of relationships removed.
    pub fn enforce_references(&mut self) -> usize {
        let before = self.relationships.len();
        let resolved: Vec<bool> = self.relationships.iter().map(|r| self.resolves(r)).collect();
        let mut keep = resolved.into_iter();
        self.relationships.retain(|_| keep.next().unwrap_or(false));

        if self
            .selected_table_id
            .as_deref()
            .is_some_and(|id| self.table(id).is_none())
        {
            self.selected_table_id = None;
        }

        before - self.relationships.len()
    }

    /// `users.id 1:N posts.user_id`, or `None` when an endpoint is missing.
    pub fn describe_relationship(&self, rel: &Relationship) -> Option<String> {
        let from = self.table(&rel.from_table_id)?;
        let to = self.table(&rel.to_table_id)?;
        let from_col = from.column(&rel.from_column_id)?;
        let to_col = to.column(&rel.to_column_id)?;
        Some(format!(
            "{}.{} {} {}.{}",
            from.name,
            from_col.name,
            rel.kind.label(),
            to.name,
            to_col.name
        ))
    }
}
