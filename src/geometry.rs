//! Connector geometry between table nodes.

use crate::measure::CanvasMetrics;
use crate::model::{DiagramSnapshot, Relationship, RelationshipType, Table};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Marker ids shared with the SVG `<defs>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Dot,
    /// Single tick at a "one" end.
    One,
    /// Crow's foot at a "many" end.
    Many,
}

impl Marker {
    pub fn id(self) -> &'static str {
        match self {
            Self::Dot => "dot",
            Self::One => "arrow-one",
            Self::Many => "arrow-many",
        }
    }
}

/// A rendered relationship: anchors, cubic path and decorations.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    pub relationship_id: String,
    pub kind: RelationshipType,
    pub from: Point,
    pub to: Point,
    pub start_marker: Marker,
    pub end_marker: Marker,
    pub dashed: bool,
    pub label: &'static str,
    pub label_at: Point,
}

impl Connector {
    pub fn mid_x(&self) -> f64 {
        (self.from.x + self.to.x) / 2.0
    }

    /// `M fx fy C mx fy, mx ty, tx ty`
    pub fn path(&self) -> String {
        let mx = self.mid_x();
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.from.x, self.from.y, mx, self.from.y, mx, self.to.y, self.to.x, self.to.y
        )
    }
}

/// Anchor y of `column_id` in absolute canvas coordinates.
pub fn column_anchor_y(metrics: &CanvasMetrics, table: &Table, column_id: &str) -> Option<f64> {
    let index = table.column_index(column_id)?;
    Some(table.position.y + metrics.row_center(index))
}

/// Endpoints of a connector from one column to another.
///
/// The connector leaves the right edge of the leftward table and enters the
/// left edge of the rightward one. When `from` is not strictly left of `to`
/// (including self references) it leaves the left edge of `from` and enters
/// the right edge of `to`.
pub fn connection_points(
    metrics: &CanvasMetrics,
    from_table: &Table,
    from_column_id: &str,
    to_table: &Table,
    to_column_id: &str,
) -> Option<(Point, Point)> {
    let from_y = column_anchor_y(metrics, from_table, from_column_id)?;
    let to_y = column_anchor_y(metrics, to_table, to_column_id)?;

    let from_w = metrics.table_width(from_table);
    let to_w = metrics.table_width(to_table);
    let from_center_x = from_table.position.x + from_w / 2.0;
    let to_center_x = to_table.position.x + to_w / 2.0;

    let (from_x, to_x) = if from_center_x < to_center_x {
        (from_table.position.x + from_w, to_table.position.x)
    } else {
        (from_table.position.x, to_table.position.x + to_w)
    };

    Some((Point { x: from_x, y: from_y }, Point { x: to_x, y: to_y }))
}

pub fn connector(metrics: &CanvasMetrics, snapshot: &DiagramSnapshot, rel: &Relationship) -> Option<Connector> {
    let from_table = snapshot.table(&rel.from_table_id)?;
    let to_table = snapshot.table(&rel.to_table_id)?;
    let (from, to) = connection_points(
        metrics,
        from_table,
        &rel.from_column_id,
        to_table,
        &rel.to_column_id,
    )?;

    let end_marker = if rel.kind.is_many_ended() {
        Marker::Many
    } else {
        Marker::One
    };

    Some(Connector {
        relationship_id: rel.id.clone(),
        kind: rel.kind,
        from,
        to,
        start_marker: Marker::Dot,
        end_marker,
        dashed: rel.kind == RelationshipType::ManyToMany,
        label: rel.kind.label(),
        label_at: Point {
            x: (from.x + to.x) / 2.0,
            y: from.y.min(to.y) - metrics.label_offset,
        },
    })
}

/// Connectors for every relationship that resolves; the rest are skipped.
pub fn connectors(metrics: &CanvasMetrics, snapshot: &DiagramSnapshot) -> Vec<Connector> {
    snapshot
        .relationships
        .iter()
        .filter_map(|rel| {
            let c = connector(metrics, snapshot, rel);
            if c.is_none() {
                tracing::trace!(relationship_id = %rel.id, "skipping unresolved connector");
            }
            c
        })
        .collect()
}
