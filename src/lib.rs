pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};
pub use handlers::AppState;

use handlers::openapi::ApiDoc;
use handlers::{carts, collections, customers, orders, products, reviews};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Register every storefront route plus the Swagger UI.
///
/// Shared by `build_server` and the integration tests, which mount it on
/// `actix_web::test::init_service`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/carts")
            .route("", web::post().to(carts::create_cart))
            .route("/{cart_id}", web::get().to(carts::get_cart))
            .route("/{cart_id}", web::delete().to(carts::delete_cart))
            .route("/{cart_id}/items", web::get().to(carts::list_cart_items))
            .route("/{cart_id}/items", web::post().to(carts::add_cart_item))
            .route(
                "/{cart_id}/items/{item_id}",
                web::patch().to(carts::update_cart_item),
            )
            .route(
                "/{cart_id}/items/{item_id}",
                web::delete().to(carts::remove_cart_item),
            ),
    )
    .service(
        web::scope("/orders")
            .route("", web::post().to(orders::place_order))
            .route("", web::get().to(orders::list_orders))
            .route("/{id}", web::get().to(orders::get_order))
            .route("/{id}", web::patch().to(orders::update_payment_status))
            .route("/{id}", web::delete().to(orders::delete_order)),
    )
    .service(
        web::scope("/products")
            .route("", web::get().to(products::list_products))
            .route("", web::post().to(products::create_product))
            .route("/{id}", web::get().to(products::get_product))
            .route("/{id}", web::put().to(products::update_product))
            .route("/{id}", web::delete().to(products::delete_product))
            .route("/{product_id}/reviews", web::get().to(reviews::list_reviews))
            .route("/{product_id}/reviews", web::post().to(reviews::create_review))
            .route("/{product_id}/reviews/{id}", web::get().to(reviews::get_review))
            .route("/{product_id}/reviews/{id}", web::put().to(reviews::update_review))
            .route(
                "/{product_id}/reviews/{id}",
                web::delete().to(reviews::delete_review),
            ),
    )
    .service(
        web::scope("/collections")
            .route("", web::get().to(collections::list_collections))
            .route("", web::post().to(collections::create_collection))
            .route("/{id}", web::get().to(collections::get_collection))
            .route("/{id}", web::put().to(collections::update_collection))
            .route("/{id}", web::delete().to(collections::delete_collection)),
    )
    .service(
        web::resource("/customers/me")
            .route(web::get().to(customers::me))
            .route(web::put().to(customers::update_me)),
    )
    .service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .configure(configure)
    })
    .bind((host.to_string(), port))?
    .run())
}
