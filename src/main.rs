use actix_web::{web, App, HttpServer};
use codecamp::storage::mem::MemStorage;
use codecamp::storage::sqlite::SqliteStorage;
use codecamp::storage::{Storage, StoreError};
use codecamp::{api, seed};
use dotenv::dotenv;
use log::info;

fn store_io_err(e: StoreError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{:?}", e))
}

async fn serve<S: Storage + Send + Sync + 'static>(
    store: S,
    host: String,
    port: u16,
) -> std::io::Result<()> {
    let data = web::Data::new(store);
    info!("listening on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(api::config::<S>)
    })
    .bind((host, port))?
    .run()
    .await
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    pretty_env_logger::init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(5000);

    match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let store = SqliteStorage::connect(&url).await.map_err(store_io_err)?;
            // only seed a fresh database, restarts keep their data
            let courses = store.get_all_courses().await.map_err(store_io_err)?;
            if courses.is_empty() {
                seed::load(&store).await.map_err(store_io_err)?;
            }
            serve(store, host, port).await
        }
        Err(_) => {
            info!("DATABASE_URL not set, using the in-memory store");
            let store = MemStorage::new();
            seed::load(&store).await.map_err(store_io_err)?;
            serve(store, host, port).await
        }
    }
}
