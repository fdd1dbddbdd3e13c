pub mod bindings;
pub mod diagram;
pub mod geometry;
pub mod glossary;
pub mod ids;
pub mod measure;
pub mod model;
pub mod sample;
pub mod svg;

use wasm_bindgen::prelude::*;

use model::DiagramSnapshot;
use svg::SvgRenderer;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a diagram snapshot given as JSON to SVG
#[wasm_bindgen(js_name = "diagramToSvg")]
pub fn render_diagram(snapshot_json: &str) -> Result<String, String> {
    let snapshot: DiagramSnapshot = serde_json::from_str(snapshot_json).map_err(|e| e.to_string())?;
    Ok(SvgRenderer::default().render(&snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_diagram_from_json() {
        let json = serde_json::to_string(&sample::sample_diagram()).unwrap();
        let svg = render_diagram(&json).unwrap();
        assert!(svg.contains(r#"data-table="comments""#));
    }

    #[test]
    fn test_render_diagram_bad_json() {
        assert!(render_diagram("{").is_err());
    }
}
