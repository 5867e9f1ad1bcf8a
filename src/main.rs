use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use line_lottery::{
    config::{Config, StoreBackend},
    database::create_pool,
    external::{IdTokenVerifier, LineIdTokenVerifier, SupabaseWinnerStore},
    handlers,
    services::{LotteryService, SeaOrmWinnerStore, WinnerStore},
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置, 缺少必填项直接退出
    let config = Config::from_toml().context("Failed to load configuration")?;

    let store: Arc<dyn WinnerStore> = match config.store.backend {
        StoreBackend::Rest => Arc::new(
            SupabaseWinnerStore::new(&config.store).context("Failed to create store client")?,
        ),
        StoreBackend::Postgres => {
            let pool = create_pool(&config.store)
                .await
                .context("Failed to create database connection pool")?;
            Arc::new(SeaOrmWinnerStore::new(pool))
        }
    };
    log::info!("Winners store backend: {:?}", config.store.backend);

    let verifier: Arc<dyn IdTokenVerifier> = Arc::new(
        LineIdTokenVerifier::new(config.line.clone()).context("Failed to create LINE verifier")?,
    );
    let lottery_service = LotteryService::new(store);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::from(verifier.clone()))
            .app_data(web::Data::new(lottery_service.clone()))
            .configure(handlers::lottery_config)
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
