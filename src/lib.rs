pub mod ddl;
pub mod diag;
pub mod dot;
pub mod graph;
pub mod model;

use wasm_bindgen::prelude::*;

use ddl::SchemaExtractor;
use dot::{DotRenderer, DotView};
use graph::{GroupingPolicy, Resolver};

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Extract an ER graph from DDL text and emit Graphviz DOT
#[wasm_bindgen(js_name = "ddlToDot")]
pub fn render_ddl(
    source: &str,
    view: Option<String>,
    master_prefix: Option<String>,
) -> Result<String, String> {
    let view = view
        .as_deref()
        .and_then(DotView::from_str)
        .unwrap_or(DotView::Detailed);
    let policy = GroupingPolicy::master_detail(master_prefix.as_deref().unwrap_or("master_"));

    let extraction = SchemaExtractor::new().extract(source);
    let mut diagnostics = extraction.diagnostics;
    let graph = Resolver::new(&extraction.model, &policy)
        .resolve(&extraction.references, &mut diagnostics)
        .map_err(|e| e.to_string())?;

    Ok(DotRenderer::default().render(view, &extraction.model, &graph))
}
