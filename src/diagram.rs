//! Diagram store: tables, columns, relationships and the current selection.
//!
//! Every mutation clones the current snapshot, applies the change and swaps the
//! result in as a new `Arc`. Readers holding an older snapshot keep seeing it
//! unchanged. Operations on ids that do not exist leave the store untouched.

use std::sync::Arc;

use crate::ids::{self, IdGenerator, ShortIds};
use crate::model::{
    Column, ColumnPatch, DiagramSnapshot, Position, Relationship, RelationshipType, Table,
};
use crate::sample;

/// Chooses where a newly added table lands.
pub trait Placement {
    fn next_position(&mut self) -> Position;
}

/// Uniformly random point inside a rectangle.
#[derive(Debug, Clone, Copy)]
pub struct ScatterPlacement {
    pub origin: Position,
    pub width: f64,
    pub height: f64,
}

impl Default for ScatterPlacement {
    fn default() -> Self {
        Self {
            origin: Position::new(100.0, 100.0),
            width: 400.0,
            height: 300.0,
        }
    }
}

impl Placement for ScatterPlacement {
    fn next_position(&mut self) -> Position {
        Position::new(
            self.origin.x + ids::random_unit() * self.width,
            self.origin.y + ids::random_unit() * self.height,
        )
    }
}

/// Always the same point.
#[derive(Debug, Clone, Copy)]
pub struct FixedPlacement(pub Position);

impl Placement for FixedPlacement {
    fn next_position(&mut self) -> Position {
        self.0
    }
}

/// Normalizes a user-typed table name: trimmed, lower case, whitespace runs
/// collapsed to `_`. Blank input yields `None`.
pub fn normalize_table_name(raw: &str) -> Option<String> {
    let parts: Vec<String> = raw.split_whitespace().map(str::to_lowercase).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("_"))
    }
}

pub struct DiagramStore {
    current: Arc<DiagramSnapshot>,
    ids: Box<dyn IdGenerator>,
    placement: Box<dyn Placement>,
}

impl Default for DiagramStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DiagramStore {
    pub fn new() -> Self {
        Self::with_sources(ShortIds, ScatterPlacement::default())
    }

    pub fn with_sources(ids: impl IdGenerator + 'static, placement: impl Placement + 'static) -> Self {
        Self {
            current: Arc::new(DiagramSnapshot::default()),
            ids: Box::new(ids),
            placement: Box::new(placement),
        }
    }

    pub fn snapshot(&self) -> Arc<DiagramSnapshot> {
        Arc::clone(&self.current)
    }

    fn commit(&mut self, next: DiagramSnapshot) {
        self.current = Arc::new(next);
    }

    /// Clones the current state, lets `f` edit it and commits the result when
    /// `f` reports a change. Dangling references are pruned before the swap.
    fn transition<R>(&mut self, f: impl FnOnce(&mut DiagramSnapshot) -> Option<R>) -> Option<R> {
        let mut next = (*self.current).clone();
        let out = f(&mut next)?;
        let pruned = next.enforce_references();
        if pruned > 0 {
            tracing::debug!(pruned, "removed relationships with missing endpoints");
        }
        self.commit(next);
        Some(out)
    }

    pub fn add_table(&mut self, name: &str) -> String {
        let id = self.ids.next_id();
        let column_id = self.ids.next_id();
        let table = Table {
            id: id.clone(),
            name: name.to_string(),
            columns: vec![Column::primary_key(column_id)],
            position: self.placement.next_position(),
            color: None,
        };
        tracing::debug!(table_id = %id, name, "added table");
        self.transition(|s| {
            s.tables.push(table);
            Some(())
        });
        id
    }

    pub fn remove_table(&mut self, table_id: &str) {
        let removed = self.transition(|s| {
            let idx = s.tables.iter().position(|t| t.id == table_id)?;
            s.tables.remove(idx);
            Some(())
        });
        log_outcome(removed, "removed table", table_id);
    }

    pub fn update_table_name(&mut self, table_id: &str, name: &str) {
        let updated = self.transition(|s| {
            let table = s.tables.iter_mut().find(|t| t.id == table_id)?;
            table.name = name.to_string();
            Some(())
        });
        log_outcome(updated, "renamed table", table_id);
    }

    pub fn update_table_position(&mut self, table_id: &str, position: Position) {
        let updated = self.transition(|s| {
            let table = s.tables.iter_mut().find(|t| t.id == table_id)?;
            table.position = position;
            Some(())
        });
        log_outcome(updated, "moved table", table_id);
    }

    pub fn set_table_color(&mut self, table_id: &str, color: Option<String>) {
        let updated = self.transition(|s| {
            let table = s.tables.iter_mut().find(|t| t.id == table_id)?;
            table.color = color;
            Some(())
        });
        log_outcome(updated, "recolored table", table_id);
    }

    pub fn select_table(&mut self, table_id: Option<&str>) {
        if let Some(id) = table_id {
            if self.current.table(id).is_none() {
                tracing::debug!(table_id = id, "select: table not found; ignoring");
                return;
            }
        }
        if self.current.selected_table_id.as_deref() == table_id {
            return;
        }
        self.transition(|s| {
            s.selected_table_id = table_id.map(str::to_string);
            Some(())
        });
    }

    pub fn add_column(&mut self, table_id: &str) -> Option<String> {
        if self.current.table(table_id).is_none() {
            tracing::debug!(table_id, "add column: table not found; ignoring");
            return None;
        }
        let column_id = self.ids.next_id();
        self.transition(|s| {
            let table = s.tables.iter_mut().find(|t| t.id == table_id)?;
            table.columns.push(Column::placeholder(column_id.clone()));
            Some(())
        })?;
        tracing::debug!(table_id, column_id = %column_id, "added column");
        Some(column_id)
    }

    /// Removes a column; relationships touching it go in the same transition.
    pub fn remove_column(&mut self, table_id: &str, column_id: &str) {
        let removed = self.transition(|s| {
            let table = s.tables.iter_mut().find(|t| t.id == table_id)?;
            let idx = table.columns.iter().position(|c| c.id == column_id)?;
            table.columns.remove(idx);
            Some(())
        });
        log_outcome(removed, "removed column", column_id);
    }

    pub fn update_column(&mut self, table_id: &str, column_id: &str, patch: &ColumnPatch) {
        let updated = self.transition(|s| {
            let column = s
                .tables
                .iter_mut()
                .find(|t| t.id == table_id)?
                .columns
                .iter_mut()
                .find(|c| c.id == column_id)?;
            patch.apply(column);
            Some(())
        });
        log_outcome(updated, "updated column", column_id);
    }

    /// Endpoints may be the same table or column, and the same pair may be
    /// linked more than once. Endpoints that do not resolve are ignored.
    pub fn add_relationship(
        &mut self,
        kind: RelationshipType,
        from_table_id: &str,
        from_column_id: &str,
        to_table_id: &str,
        to_column_id: &str,
    ) -> Option<String> {
        let rel = Relationship {
            id: String::new(),
            kind,
            from_table_id: from_table_id.to_string(),
            from_column_id: from_column_id.to_string(),
            to_table_id: to_table_id.to_string(),
            to_column_id: to_column_id.to_string(),
        };
        if !self.current.resolves(&rel) {
            tracing::debug!(
                from_table_id,
                from_column_id,
                to_table_id,
                to_column_id,
                "add relationship: endpoint not found; ignoring"
            );
            return None;
        }
        let rel = Relationship {
            id: self.ids.next_id(),
            ..rel
        };
        let id = rel.id.clone();
        tracing::debug!(relationship_id = %id, kind = %kind, "added relationship");
        self.transition(|s| {
            s.relationships.push(rel);
            Some(())
        });
        Some(id)
    }

    pub fn remove_relationship(&mut self, relationship_id: &str) {
        let removed = self.transition(|s| {
            let idx = s.relationships.iter().position(|r| r.id == relationship_id)?;
            s.relationships.remove(idx);
            Some(())
        });
        log_outcome(removed, "removed relationship", relationship_id);
    }

    /// Replaces everything with the four-table demo schema.
    pub fn load_sample(&mut self) {
        tracing::debug!("loaded sample diagram");
        self.commit(sample::sample_diagram());
    }
}

fn log_outcome(outcome: Option<()>, action: &'static str, id: &str) {
    match outcome {
        Some(()) => tracing::debug!(id, "{action}"),
        None => tracing::debug!(id, "{action}: target not found; ignoring"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::model::ColumnType;

    fn store() -> DiagramStore {
        DiagramStore::with_sources(SequentialIds::new("id"), FixedPlacement(Position::new(10.0, 20.0)))
    }

    #[test]
    fn test_add_table_defaults() {
        let mut s = store();
        let id = s.add_table("orders");
        let snap = s.snapshot();
        let t = snap.table(&id).unwrap();
        assert_eq!(t.name, "orders");
        assert_eq!(t.position, Position::new(10.0, 20.0));
        assert_eq!(t.columns.len(), 1);
        let pk = &t.columns[0];
        assert_eq!(pk.name, "id");
        assert_eq!(pk.column_type, ColumnType::Serial);
        assert!(pk.is_primary_key && pk.is_unique && !pk.is_nullable);
    }

    #[test]
    fn test_random_placement_within_region() {
        let mut s = DiagramStore::new();
        for _ in 0..50 {
            s.add_table("t");
        }
        for t in &s.snapshot().tables {
            assert!((100.0..500.0).contains(&t.position.x));
            assert!((100.0..400.0).contains(&t.position.y));
        }
    }

    #[test]
    fn test_rename_keeps_columns() {
        let mut s = store();
        let id = s.add_table("orders");
        s.update_table_name(&id, "customers");
        let snap = s.snapshot();
        let named: Vec<_> = snap.tables.iter().filter(|t| t.name == "customers").collect();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].columns.len(), 1);
        assert!(snap.tables.iter().all(|t| t.name != "orders"));
    }

    #[test]
    fn test_update_position_allows_overlap() {
        let mut s = store();
        let a = s.add_table("a");
        let b = s.add_table("b");
        s.update_table_position(&b, Position::new(10.0, 20.0));
        s.update_table_position(&a, Position::new(-50.0, 1e6));
        let snap = s.snapshot();
        assert_eq!(snap.table(&a).unwrap().position, Position::new(-50.0, 1e6));
        assert_eq!(snap.table(&b).unwrap().position, Position::new(10.0, 20.0));
    }

    #[test]
    fn test_set_table_color() {
        let mut s = store();
        let t = s.add_table("a");
        s.set_table_color(&t, Some("#7c3aed".into()));
        assert_eq!(s.snapshot().table(&t).unwrap().color.as_deref(), Some("#7c3aed"));
        s.set_table_color(&t, None);
        assert_eq!(s.snapshot().table(&t).unwrap().color, None);

        let before = s.snapshot();
        s.set_table_color("nope", Some("red".into()));
        assert!(Arc::ptr_eq(&before, &s.snapshot()));
    }

    #[test]
    fn test_remove_table_cascades_and_clears_selection() {
        let mut s = store();
        s.load_sample();
        s.select_table(Some("users"));
        s.remove_table("users");
        let snap = s.snapshot();
        assert!(snap.table("users").is_none());
        assert!(snap.relationships.iter().all(|r| !r.touches_table("users")));
        assert_eq!(snap.relationships.len(), 1);
        assert_eq!(snap.selected_table_id, None);
    }

    #[test]
    fn test_remove_other_table_keeps_selection() {
        let mut s = store();
        s.load_sample();
        s.select_table(Some("posts"));
        s.remove_table("tags");
        assert_eq!(s.snapshot().selected_table_id.as_deref(), Some("posts"));
    }

    #[test]
    fn test_remove_column_cascades() {
        let mut s = store();
        s.load_sample();
        s.remove_column("users", "u1");
        let snap = s.snapshot();
        assert!(snap.table("users").unwrap().column("u1").is_none());
        assert!(snap.relationships.iter().all(|r| !r.touches_column("users", "u1")));
        assert_eq!(snap.relationships.len(), 1);
        assert_eq!(snap.relationships[0].id, "r2");
    }

    #[test]
    fn test_every_table_removal_leaves_no_reference() {
        let sample = crate::sample::sample_diagram();
        for table in &sample.tables {
            let mut s = store();
            s.load_sample();
            s.remove_table(&table.id);
            let snap = s.snapshot();
            assert!(snap.relationships.iter().all(|r| !r.touches_table(&table.id)));
            assert!(snap.relationships.iter().all(|r| snap.resolves(r)));
        }
    }

    #[test]
    fn test_every_column_removal_leaves_no_reference() {
        let sample = crate::sample::sample_diagram();
        for table in &sample.tables {
            for column in &table.columns {
                let mut s = store();
                s.load_sample();
                s.remove_column(&table.id, &column.id);
                let snap = s.snapshot();
                assert!(
                    snap.relationships
                        .iter()
                        .all(|r| !r.touches_column(&table.id, &column.id))
                );
            }
        }
    }

    #[test]
    fn test_add_and_update_column() {
        let mut s = store();
        let t = s.add_table("t");
        let c = s.add_column(&t).unwrap();
        s.update_column(
            &t,
            &c,
            &ColumnPatch {
                name: Some("email".into()),
                column_type: Some(ColumnType::Text),
                is_unique: Some(true),
                default_value: Some(Some("''".into())),
                ..Default::default()
            },
        );
        let snap = s.snapshot();
        let col = snap.table(&t).unwrap().column(&c).unwrap();
        assert_eq!(col.name, "email");
        assert_eq!(col.column_type, ColumnType::Text);
        assert!(col.is_unique && col.is_nullable && !col.is_primary_key);
        assert_eq!(col.default_value.as_deref(), Some("''"));
        assert_eq!(snap.table(&t).unwrap().column_index(&c), Some(1));
    }

    #[test]
    fn test_add_column_missing_table() {
        let mut s = store();
        assert_eq!(s.add_column("nope"), None);
    }

    #[test]
    fn test_relationship_permissive_and_removable() {
        let mut s = store();
        let t = s.add_table("t");
        let pk = s.snapshot().table(&t).unwrap().columns[0].id.clone();
        let r1 = s.add_relationship(RelationshipType::OneToOne, &t, &pk, &t, &pk).unwrap();
        let r2 = s.add_relationship(RelationshipType::OneToOne, &t, &pk, &t, &pk).unwrap();
        assert_ne!(r1, r2);
        assert_eq!(s.snapshot().relationships.len(), 2);
        s.remove_relationship(&r1);
        let snap = s.snapshot();
        assert_eq!(snap.relationships.len(), 1);
        assert_eq!(snap.relationships[0].id, r2);
    }

    #[test]
    fn test_relationship_with_missing_endpoint_is_ignored() {
        let mut s = store();
        let t = s.add_table("t");
        assert_eq!(
            s.add_relationship(RelationshipType::OneToMany, &t, "nope", &t, "nope"),
            None
        );
        assert!(s.snapshot().relationships.is_empty());
    }

    #[test]
    fn test_missing_targets_are_noops() {
        let mut s = store();
        s.load_sample();
        let before = s.snapshot();
        s.remove_table("nope");
        s.update_table_name("nope", "x");
        s.update_table_position("nope", Position::new(1.0, 1.0));
        s.remove_column("users", "nope");
        s.update_column("users", "nope", &ColumnPatch::default());
        s.remove_relationship("nope");
        s.select_table(Some("nope"));
        assert!(Arc::ptr_eq(&before, &s.snapshot()));
    }

    #[test]
    fn test_old_snapshots_are_immutable() {
        let mut s = store();
        let before = s.snapshot();
        s.add_table("t");
        assert!(before.tables.is_empty());
        assert_eq!(s.snapshot().tables.len(), 1);
    }

    #[test]
    fn test_load_sample_is_idempotent() {
        let mut s = store();
        s.add_table("scratch");
        s.load_sample();
        let first = s.snapshot();
        s.load_sample();
        let second = s.snapshot();
        assert_eq!(first.tables.len(), 4);
        assert_eq!(first.relationships.len(), 3);
        assert_eq!(*first, *second);
    }

    #[test]
    fn test_normalize_table_name() {
        assert_eq!(normalize_table_name("  Order Items "), Some("order_items".into()));
        assert_eq!(normalize_table_name("a \t b"), Some("a_b".into()));
        assert_eq!(normalize_table_name("   "), None);
    }
}
