use std::path::Path;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use beadle::auth::{password, rate_limit::RateLimiter};
use beadle::config::AppConfig;
use beadle::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    // Ensure the directory holding the SQLite file exists
    if let Some(path) = config.database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    let admin_hash = password::hash_password(&config.admin_password)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    db::seed(&pool, &config.admin_email, &admin_hash)
        .await
        .map_err(std::io::Error::other)?;

    // Session encryption key: SESSION_KEY keeps sessions valid across restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let limiter = web::Data::new(RateLimiter::default());
    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);

    log::info!("Starting {} at http://{}", config.app_name, bind_addr);

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
            .cookie_secure(false)
            .cookie_http_only(true)
            .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(config.clone())
            .app_data(limiter.clone())
            .service(actix_files::Files::new("/static", &config.static_dir))
            .configure(handlers::configure)
            .default_service(web::to(handlers::not_found))
    })
    .bind(bind_addr)?
    .run()
    .await
}
