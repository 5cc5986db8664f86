use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{PasswordHasher, SessionCoordinator};
use crate::clock::{Clock, SystemClock};
use crate::configuration::Settings;
use crate::metrics::FileserverHits;
use crate::middleware::HitCounter;
use crate::routes::{
    create_chirp, create_user, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, reset_metrics, revoke, update_user,
};
use crate::store::Store;

/// Session coordinator as shared by the HTTP layer
pub type Sessions = SessionCoordinator<dyn Store>;

pub fn run(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    run_with_clock(listener, store, settings, Arc::new(SystemClock))
}

/// Same as [`run`] with an explicit time source
pub fn run_with_clock(
    listener: TcpListener,
    store: Arc<dyn Store>,
    settings: Settings,
    clock: Arc<dyn Clock>,
) -> Result<Server, std::io::Error> {
    settings
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let sessions: Sessions = SessionCoordinator::new(
        store.clone(),
        PasswordHasher::new(settings.auth.bcrypt_cost),
        settings.auth.jwt_secret.clone(),
        clock,
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

    let store_data: web::Data<dyn Store> = web::Data::from(store);
    let sessions = web::Data::new(sessions);
    let hits = web::Data::new(FileserverHits::new());
    let application = web::Data::new(settings.application.clone());
    let auth = web::Data::new(settings.auth.clone());
    let static_dir = settings.application.static_dir.clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())

            // Shared state
            .app_data(store_data.clone())
            .app_data(sessions.clone())
            .app_data(hits.clone())
            .app_data(application.clone())
            .app_data(auth.clone())

            // Operations
            .route("/api/healthz", web::get().to(health_check))
            .route("/admin/metrics", web::get().to(metrics))
            .route("/admin/reset", web::post().to(reset_metrics))

            // Sessions
            .route("/api/login", web::post().to(login))
            .route("/api/refresh", web::post().to(refresh))
            .route("/api/revoke", web::post().to(revoke))

            // Resources
            .service(
                web::resource("/api/users")
                    .route(web::post().to(create_user))
                    .route(web::put().to(update_user)),
            )
            .service(
                web::resource("/api/chirps")
                    .route(web::post().to(create_chirp))
                    .route(web::get().to(list_chirps)),
            )
            .service(
                web::resource("/api/chirps/{chirp_id}")
                    .route(web::get().to(get_chirp))
                    .route(web::delete().to(delete_chirp)),
            )
            .route("/api/polka/webhooks", web::post().to(polka_webhook))

            // Static files, counted
            .service(
                web::scope("/app")
                    .wrap(HitCounter::new(hits.clone()))
                    .service(fs::Files::new("/", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
