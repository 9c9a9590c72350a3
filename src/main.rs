#[cfg(feature = "ssr")]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use actix_files::Files;
    use actix_web::{web, App, HttpServer};
    use leptos::*;
    use leptos_actix::{generate_route_list, LeptosRoutes};
    use rentnest::api::{self, AppState};
    use rentnest::app::App as RentNest;
    use rentnest::config::AppConfig;

    let config = AppConfig::from_env();
    let storage_dir = config.storage_dir.clone();
    let storage_mount = config.storage_mount().map(str::to_owned);
    // Photos are posted as raw bodies.
    let payload_limit = config.max_upload_bytes as usize + 64 * 1024;

    // Initialize the database and storage buckets
    let state = AppState::open(config)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let state = web::Data::new(state);

    // Load configuration
    let conf = get_configuration(None)
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let addr = conf.leptos_options.site_addr;

    // Generate the list of routes in your Leptos App
    let routes = generate_route_list(RentNest);
    logging::log!("listening on http://{}", &addr);

    HttpServer::new(move || {
        let leptos_options = &conf.leptos_options;
        let site_root = &leptos_options.site_root;

        let mut app = App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(payload_limit))
            // Register custom API routes BEFORE Leptos routes
            .configure(api::configure)
            // Serve JS/WASM/CSS from `pkg`
            .service(Files::new("/pkg", format!("{site_root}/pkg")));
        if let Some(mount) = &storage_mount {
            // Uploaded photos and avatars
            app = app.service(Files::new(mount, storage_dir.clone()));
        }
        app
            // Serve other assets from the `assets` directory
            .service(Files::new("/assets", site_root))
            .service(favicon)
            .leptos_routes(leptos_options.to_owned(), routes.to_owned(), RentNest)
            .app_data(web::Data::new(leptos_options.to_owned()))
    })
    .bind(&addr)?
    .run()
    .await
}

#[cfg(feature = "ssr")]
#[actix_web::get("favicon.ico")]
async fn favicon(
    leptos_options: actix_web::web::Data<leptos::LeptosOptions>,
) -> actix_web::Result<actix_files::NamedFile> {
    let leptos_options = leptos_options.into_inner();
    let site_root = &leptos_options.site_root;
    Ok(actix_files::NamedFile::open(format!(
        "{site_root}/favicon.ico"
    ))?)
}

#[cfg(not(any(feature = "ssr", feature = "csr")))]
pub fn main() {
    // no client-side main function
    // see lib.rs for hydration function instead
}

#[cfg(all(not(feature = "ssr"), feature = "csr"))]
pub fn main() {
    // to run: `trunk serve --open --features csr`
    use rentnest::app::*;

    console_error_panic_hook::set_once();
    rentnest::utils::panic_hook::init();

    leptos::mount_to_body(App);
}
