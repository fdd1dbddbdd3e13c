//! wasm-bindgen surface for the browser editor.
//!
//! Snapshots and derived views cross the boundary as JSON strings; patches and
//! drafts come in as JSON using the same camelCase field names.

use wasm_bindgen::prelude::*;

use crate::diagram::{DiagramStore, normalize_table_name};
use crate::glossary::{GlossaryStore, SqlPatternDraft, TermDraft, TermPatch};
use crate::model::{ColumnPatch, ColumnType, Position, RelationshipType};
use crate::svg::SvgRenderer;

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn to_array<I, S>(items: I) -> js_sys::Array
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| JsValue::from_str(s.as_ref()))
        .collect()
}

#[wasm_bindgen]
pub struct ErdEditor {
    store: DiagramStore,
    renderer: SvgRenderer,
}

impl Default for ErdEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ErdEditor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: DiagramStore::new(),
            renderer: SvgRenderer::default(),
        }
    }

    #[wasm_bindgen(js_name = "snapshotJson")]
    pub fn snapshot_json(&self) -> Result<String, String> {
        to_json(&*self.store.snapshot())
    }

    #[wasm_bindgen(js_name = "renderSvg")]
    pub fn render_svg(&self) -> String {
        self.renderer.render(&self.store.snapshot())
    }

    /// Adds a table after normalizing the typed name; blank names add nothing.
    #[wasm_bindgen(js_name = "addTable")]
    pub fn add_table(&mut self, name: &str) -> Option<String> {
        let name = normalize_table_name(name)?;
        Some(self.store.add_table(&name))
    }

    #[wasm_bindgen(js_name = "removeTable")]
    pub fn remove_table(&mut self, table_id: &str) {
        self.store.remove_table(table_id);
    }

    #[wasm_bindgen(js_name = "updateTableName")]
    pub fn update_table_name(&mut self, table_id: &str, name: &str) {
        self.store.update_table_name(table_id, name);
    }

    /// Non-finite coordinates are ignored; JSON has no encoding for them.
    #[wasm_bindgen(js_name = "updateTablePosition")]
    pub fn update_table_position(&mut self, table_id: &str, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            tracing::debug!(table_id, x, y, "move table: non-finite position; ignoring");
            return;
        }
        self.store.update_table_position(table_id, Position::new(x, y));
    }

    /// Header tint as a CSS color; `undefined` or a blank string clears it.
    #[wasm_bindgen(js_name = "setTableColor")]
    pub fn set_table_color(&mut self, table_id: &str, color: Option<String>) {
        let color = color
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        self.store.set_table_color(table_id, color);
    }

    #[wasm_bindgen(js_name = "selectTable")]
    pub fn select_table(&mut self, table_id: Option<String>) {
        self.store.select_table(table_id.as_deref());
    }

    #[wasm_bindgen(js_name = "addColumn")]
    pub fn add_column(&mut self, table_id: &str) -> Option<String> {
        self.store.add_column(table_id)
    }

    #[wasm_bindgen(js_name = "removeColumn")]
    pub fn remove_column(&mut self, table_id: &str, column_id: &str) {
        self.store.remove_column(table_id, column_id);
    }

    #[wasm_bindgen(js_name = "updateColumn")]
    pub fn update_column(
        &mut self,
        table_id: &str,
        column_id: &str,
        patch_json: &str,
    ) -> Result<(), String> {
        let patch: ColumnPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        self.store.update_column(table_id, column_id, &patch);
        Ok(())
    }

    #[wasm_bindgen(js_name = "addRelationship")]
    pub fn add_relationship(
        &mut self,
        kind: &str,
        from_table_id: &str,
        from_column_id: &str,
        to_table_id: &str,
        to_column_id: &str,
    ) -> Result<Option<String>, String> {
        let kind = kind.parse::<RelationshipType>().map_err(|e| e.to_string())?;
        Ok(self.store.add_relationship(
            kind,
            from_table_id,
            from_column_id,
            to_table_id,
            to_column_id,
        ))
    }

    #[wasm_bindgen(js_name = "removeRelationship")]
    pub fn remove_relationship(&mut self, relationship_id: &str) {
        self.store.remove_relationship(relationship_id);
    }

    #[wasm_bindgen(js_name = "loadSample")]
    pub fn load_sample(&mut self) {
        self.store.load_sample();
    }

    #[wasm_bindgen(js_name = "columnTypes")]
    pub fn column_types() -> js_sys::Array {
        to_array(ColumnType::ALL.iter().map(|t| t.as_str()))
    }
}

#[wasm_bindgen]
pub struct GlossaryEditor {
    store: GlossaryStore,
}

impl Default for GlossaryEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GlossaryEditor {
    /// Starts with the sample terms, as the glossary page always has.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            store: GlossaryStore::with_sample_terms(),
        }
    }

    #[wasm_bindgen(js_name = "termsJson")]
    pub fn terms_json(&self) -> Result<String, String> {
        to_json(&self.store.snapshot().terms)
    }

    #[wasm_bindgen(js_name = "addTerm")]
    pub fn add_term(&mut self, draft_json: &str) -> Result<String, String> {
        let draft: TermDraft = serde_json::from_str(draft_json).map_err(|e| e.to_string())?;
        Ok(self.store.add_term(draft))
    }

    #[wasm_bindgen(js_name = "updateTerm")]
    pub fn update_term(&mut self, id: &str, patch_json: &str) -> Result<(), String> {
        let patch: TermPatch = serde_json::from_str(patch_json).map_err(|e| e.to_string())?;
        self.store.update_term(id, patch);
        Ok(())
    }

    #[wasm_bindgen(js_name = "deleteTerm")]
    pub fn delete_term(&mut self, id: &str) {
        self.store.delete_term(id);
    }

    #[wasm_bindgen(js_name = "addSqlPattern")]
    pub fn add_sql_pattern(&mut self, term_id: &str, pattern_json: &str) -> Result<Option<String>, String> {
        let draft: SqlPatternDraft = serde_json::from_str(pattern_json).map_err(|e| e.to_string())?;
        Ok(self.store.add_sql_pattern(term_id, draft))
    }

    #[wasm_bindgen(js_name = "removeSqlPattern")]
    pub fn remove_sql_pattern(&mut self, term_id: &str, pattern_id: &str) {
        self.store.remove_sql_pattern(term_id, pattern_id);
    }

    #[wasm_bindgen(js_name = "setSearchQuery")]
    pub fn set_search_query(&mut self, query: &str) {
        self.store.set_search_query(query);
    }

    #[wasm_bindgen(js_name = "setSelectedCategory")]
    pub fn set_selected_category(&mut self, category: &str) {
        self.store.set_selected_category(category);
    }

    #[wasm_bindgen(js_name = "setSelectedDataset")]
    pub fn set_selected_dataset(&mut self, dataset: &str) {
        self.store.set_selected_dataset(dataset);
    }

    pub fn categories(&self) -> js_sys::Array {
        to_array(self.store.categories())
    }

    #[wasm_bindgen(js_name = "filteredTermsJson")]
    pub fn filtered_terms_json(&self) -> Result<String, String> {
        to_json(&self.store.filtered_terms())
    }

    /// Groups sorted alphabetically, ready to render.
    #[wasm_bindgen(js_name = "groupedTermsJson")]
    pub fn grouped_terms_json(&self) -> Result<String, String> {
        let groups = self.store.grouped_terms();
        to_json(&groups.sorted())
    }
}
