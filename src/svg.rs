use crate::geometry::{self, Connector, Marker};
use crate::measure::CanvasMetrics;
use crate::model::{Column, DiagramSnapshot, Table};
use std::fmt::Write;

pub struct SvgRenderer {
    metrics: CanvasMetrics,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            metrics: CanvasMetrics::default(),
        }
    }
}

impl SvgRenderer {
    pub fn new(metrics: CanvasMetrics) -> Self {
        Self { metrics }
    }

    /// Canvas size: the configured area, grown to fit tables dragged past it.
    fn extent(&self, snapshot: &DiagramSnapshot) -> (f64, f64) {
        snapshot.tables.iter().fold(
            (self.metrics.canvas_width, self.metrics.canvas_height),
            |(w, h), t| {
                (
                    w.max(t.position.x + self.metrics.table_width(t)),
                    h.max(t.position.y + self.metrics.table_height(t)),
                )
            },
        )
    }

    pub fn render(&self, snapshot: &DiagramSnapshot) -> String {
        let mut svg = String::new();
        let (width, height) = self.extent(snapshot);

        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            width, height, width, height
        )
        .unwrap();

        writeln!(
            &mut svg,
            r#"<style>
  .table-bg {{ fill: #1e293b; }}
  .table-header {{ fill: #334155; }}
  .table-border {{ fill: none; stroke: #475569; stroke-width: 1; }}
  .table-border.selected {{ stroke: #38bdf8; stroke-width: 2; }}
  .table-name {{ font-family: monospace; font-size: 14px; font-weight: bold; fill: #f8fafc; }}
  .column-name {{ font-family: monospace; font-size: 12px; fill: #e2e8f0; }}
  .column-type {{ font-family: monospace; font-size: 10px; fill: #a78bfa; }}
  .badge {{ font-family: monospace; font-size: 10px; font-weight: bold; }}
  .badge.pk {{ fill: #facc15; }}
  .badge.fk {{ fill: #38bdf8; }}
  .badge.uq {{ fill: #94a3b8; }}
  .not-null {{ font-family: monospace; font-size: 9px; font-weight: bold; fill: #f87171; }}
  .row-sep {{ stroke: #334155; stroke-width: 1; }}
  .connector {{ fill: none; stroke: #38bdf8; stroke-width: 2; opacity: 0.7; }}
  .connector-label {{ font-family: monospace; font-size: 9px; fill: #94a3b8; }}
  .empty {{ font-family: monospace; fill: #94a3b8; }}
</style>"#
        )
        .unwrap();

        self.render_defs(&mut svg);

        // Connectors first (behind tables)
        for connector in geometry::connectors(&self.metrics, snapshot) {
            self.render_connector(&mut svg, &connector);
        }

        for table in &snapshot.tables {
            let selected = snapshot.selected_table_id.as_deref() == Some(table.id.as_str());
            self.render_table(&mut svg, table, selected);
        }

        if snapshot.tables.is_empty() {
            writeln!(
                &mut svg,
                r#"<text class="empty" x="{}" y="{}" font-size="14" text-anchor="middle">No tables yet</text>"#,
                width / 2.0,
                height / 2.0
            )
            .unwrap();
            writeln!(
                &mut svg,
                r#"<text class="empty" x="{}" y="{}" font-size="12" text-anchor="middle" opacity="0.6">Add a table from the sidebar or load sample data</text>"#,
                width / 2.0,
                height / 2.0 + 20.0
            )
            .unwrap();
        }

        writeln!(&mut svg, "</svg>").unwrap();
        svg
    }

    fn render_defs(&self, svg: &mut String) {
        writeln!(
            svg,
            r##"<defs>
  <marker id="{one}" markerWidth="10" markerHeight="10" refX="9" refY="5" orient="auto">
    <line x1="9" y1="1" x2="9" y2="9" stroke="#38bdf8" stroke-width="2" />
  </marker>
  <marker id="{many}" markerWidth="14" markerHeight="14" refX="1" refY="7" orient="auto">
    <path d="M1,7 L13,1 M1,7 L13,7 M1,7 L13,13" stroke="#38bdf8" stroke-width="1.5" fill="none" />
  </marker>
  <marker id="{dot}" markerWidth="8" markerHeight="8" refX="4" refY="4" orient="auto">
    <circle cx="4" cy="4" r="3" fill="#38bdf8" />
  </marker>
</defs>"##,
            one = Marker::One.id(),
            many = Marker::Many.id(),
            dot = Marker::Dot.id(),
        )
        .unwrap();
    }

    fn render_connector(&self, svg: &mut String, c: &Connector) {
        let dash = if c.dashed { "6 3" } else { "none" };
        writeln!(
            svg,
            r#"<g data-relationship="{}">"#,
            escape_xml(&c.relationship_id)
        )
        .unwrap();
        writeln!(
            svg,
            r#"<path class="connector" d="{}" stroke-dasharray="{}" marker-start="url(#{})" marker-end="url(#{})" />"#,
            c.path(),
            dash,
            c.start_marker.id(),
            c.end_marker.id()
        )
        .unwrap();
        writeln!(
            svg,
            r#"<text class="connector-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
            c.label_at.x, c.label_at.y, c.label
        )
        .unwrap();
        writeln!(svg, "</g>").unwrap();
    }

    fn render_table(&self, svg: &mut String, table: &Table, selected: bool) {
        let m = &self.metrics;
        let x = table.position.x;
        let y = table.position.y;
        let w = m.table_width(table);
        let h = m.table_height(table);

        writeln!(
            svg,
            r#"<g data-table="{}">"#,
            escape_xml(&table.id)
        )
        .unwrap();

        // 1. Background
        writeln!(
            svg,
            r#"<rect class="table-bg" x="{}" y="{}" width="{}" height="{}" rx="8" />"#,
            x, y, w, h
        )
        .unwrap();

        // 2. Header, optionally tinted by the table color
        let fill = match &table.color {
            Some(color) => format!(r#" style="fill: {}""#, escape_xml(color)),
            None => String::new(),
        };
        writeln!(
            svg,
            r#"<rect class="table-header" x="{}" y="{}" width="{}" height="{}" rx="8"{} />"#,
            x, y, w, m.header_height, fill
        )
        .unwrap();
        if !table.columns.is_empty() {
            writeln!(
                svg,
                r#"<rect class="table-header" x="{}" y="{}" width="{}" height="8"{} />"#,
                x,
                y + m.header_height - 8.0,
                w,
                fill
            )
            .unwrap();
        }

        // 3. Table name
        writeln!(
            svg,
            r#"<text class="table-name" x="{}" y="{}">{}</text>"#,
            x + m.padding_x + m.icon_width + m.gap,
            y + m.header_height / 2.0 + 5.0,
            escape_xml(&table.name)
        )
        .unwrap();

        // 4. Columns
        for (i, col) in table.columns.iter().enumerate() {
            let row_y = y + m.header_height + i as f64 * m.row_height;
            self.render_column(svg, col, x, row_y, w);
            if i + 1 < table.columns.len() {
                writeln!(
                    svg,
                    r#"<line class="row-sep" x1="{}" y1="{}" x2="{}" y2="{}" />"#,
                    x,
                    row_y + m.row_height,
                    x + w,
                    row_y + m.row_height
                )
                .unwrap();
            }
        }

        // 5. Border (drawn last to be on top)
        let class = if selected {
            "table-border selected"
        } else {
            "table-border"
        };
        writeln!(
            svg,
            r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}" rx="8" />"#,
            class, x, y, w, h
        )
        .unwrap();
        writeln!(svg, "</g>").unwrap();
    }

    fn render_column(&self, svg: &mut String, col: &Column, x: f64, row_y: f64, w: f64) {
        let m = &self.metrics;
        let baseline = row_y + m.row_height / 2.0 + 4.0;

        if let Some((class, glyph)) = badge(col) {
            writeln!(
                svg,
                r#"<text class="badge {}" x="{}" y="{}">{}</text>"#,
                class,
                x + m.padding_x,
                baseline,
                glyph
            )
            .unwrap();
        }

        writeln!(
            svg,
            r#"<text class="column-name" x="{}" y="{}">{}</text>"#,
            x + m.padding_x + m.icon_width + m.gap,
            baseline,
            escape_xml(&col.name)
        )
        .unwrap();

        let mut right = x + w - m.padding_x;
        if !col.is_nullable {
            writeln!(
                svg,
                r#"<text class="not-null" x="{}" y="{}" text-anchor="end">NN</text>"#,
                right, baseline
            )
            .unwrap();
            right -= m.text_width("NN", m.type_char_width) + m.gap;
        }
        writeln!(
            svg,
            r#"<text class="column-type" x="{}" y="{}" text-anchor="end">{}</text>"#,
            right, baseline, col.column_type
        )
        .unwrap();
    }
}

/// Key marker shown left of a column name; primary key wins over foreign key
/// over unique.
fn badge(col: &Column) -> Option<(&'static str, &'static str)> {
    if col.is_primary_key {
        Some(("pk", "PK"))
    } else if col.is_foreign_key {
        Some(("fk", "FK"))
    } else if col.is_unique {
        Some(("uq", "#"))
    } else {
        None
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
