use std::sync::Arc;

use actix_web::web;
use dotenvy::dotenv;
use storefront::config::{PublisherKind, Settings};
use storefront::domain::ports::EventPublisher;
use storefront::infrastructure::channel_publisher::{run_notifier, ChannelEventPublisher};
use storefront::infrastructure::outbox_publisher::OutboxEventPublisher;
use storefront::infrastructure::store::DieselStore;
use storefront::{build_server, create_pool, run_migrations, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let settings = Settings::from_env().expect("Invalid configuration");

    let pool = create_pool(&settings.database_url);
    run_migrations(&pool);

    let publisher: Arc<dyn EventPublisher> = match settings.publisher {
        PublisherKind::Outbox => Arc::new(OutboxEventPublisher::new(pool.clone())),
        PublisherKind::Channel => {
            let (publisher, rx) = ChannelEventPublisher::new();
            actix_web::rt::spawn(run_notifier(rx));
            Arc::new(publisher)
        }
    };
    log::info!("Publishing order events via {:?}", settings.publisher);

    let state = web::Data::new(AppState::new(DieselStore::new(pool), publisher));

    log::info!("Starting server at http://{}:{}", settings.host, settings.port);

    build_server(state, &settings.host, settings.port)?.await
}
