pub mod analytics;
pub mod api;
pub mod app;
pub mod auth;
pub mod client;
pub mod components;
pub mod config;
pub mod contact;
pub mod db;
pub mod error;
pub mod listing;
pub mod models;
pub mod pricing;
pub mod search;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    use crate::app::App;

    console_error_panic_hook::set_once();
    utils::panic_hook::init();
    leptos::mount_to_body(App);
}
