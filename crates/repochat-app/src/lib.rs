//! Repo Chat — WASM entry point.
//!
//! This crate is the composition root (DI wiring layer).
//! It assembles the HTTP adapter and chat session and hands them to the
//! egui UI.

mod app;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

const CANVAS_ID: &str = "repochat_canvas";

/// WASM entry point — called from index.html
#[wasm_bindgen(start)]
pub async fn main() {
    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Repo Chat WASM starting...");

    let web_options = eframe::WebOptions::default();

    let canvas = gloo_utils::document()
        .get_element_by_id(CANVAS_ID)
        .expect("No canvas element with id 'repochat_canvas'")
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .expect("Element is not a canvas");

    wasm_bindgen_futures::spawn_local(async move {
        eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(app::RepoChatApp::new(cc)))),
            )
            .await
            .expect("Failed to start eframe");
    });
}
