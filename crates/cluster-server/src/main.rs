use std::sync::Arc;

use actix_web::http::KeepAlive;
use actix_web::web::Data;
use actix_web::{App, HttpResponse, HttpServer};
use clap::Parser;
use cluster_server::config::Opt;
use cluster_server::routes;
use cluster_server::state::AppState;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::Layer as _;

fn setup_logging(opt: &Opt) {
    let level = opt.log_level.parse().unwrap_or(tracing::level_filters::LevelFilter::INFO);
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true).with_filter(level);
    tracing_subscriber::registry().with(fmt_layer).init();
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "available" }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();
    setup_logging(&opt);

    let state = Arc::new(AppState::bootstrap(opt.clone())?);
    tracing::info!(http_addr = %opt.http_addr, data_path = %opt.data_path.display(), "starting the create-index control plane");

    let state_data = Data::new(state);
    let http_server = HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .service(actix_web::web::resource("/health").route(actix_web::web::get().to(health)))
            .configure(routes::configure)
    })
    .disable_signals()
    .keep_alive(KeepAlive::Os);

    http_server.bind(&opt.http_addr)?.run().await?;

    Ok(())
}
