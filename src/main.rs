use actix_web::{web, HttpServer};
use env_logger::Env;
use mongodb::{options::ClientOptions, Client};
use roommate_finder::app::{build_app, AppState};
use roommate_finder::config::{Config, StoreBackend, APP_NAME};
use roommate_finder::store::{InMemoryListingStore, ListingStore, MongoListingStore};
use std::io;
use std::sync::Arc;

fn startup_error(err: impl std::error::Error + Send + Sync + 'static) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err)
}

async fn connect(config: &Config) -> io::Result<Arc<dyn ListingStore>> {
    let store: Arc<dyn ListingStore> = match config.backend {
        StoreBackend::Memory => Arc::new(InMemoryListingStore::new()),
        StoreBackend::Mongo => {
            let mut client_options = ClientOptions::parse(&config.mongodb_uri)
                .await
                .map_err(startup_error)?;
            client_options.app_name = Some(APP_NAME.to_string());
            let client = Client::with_options(client_options).map_err(startup_error)?;
            Arc::new(MongoListingStore::new(&client.database(&config.database)))
        }
    };
    if let Err(err) = store.health_check().await {
        log::error!("{} connection error: {}", store.backend_name(), err);
        return Err(startup_error(err));
    }
    log::info!("{} store connected", store.backend_name());
    Ok(store)
}

#[actix_rt::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = Config::from_env().map_err(startup_error)?;
    let store = connect(&config).await?;
    let state = web::Data::new(AppState::new(store));

    log::info!("RoommateFinder API listening on {}", config.bind_addr);
    HttpServer::new(move || build_app(state.clone()))
        .bind(config.bind_addr)?
        .run()
        .await
}
