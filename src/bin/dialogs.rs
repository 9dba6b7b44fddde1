use actix_web::{
    middleware::{from_fn, Condition, Logger},
    web, App, HttpServer,
};
use std::sync::Arc;

use agora::broker::Broker;
use agora::configs::{connect_pool, init_tracing, AppConfig};
use agora::constants::PREFIX_V2;
use agora::middlewares::{remote_authentication, AuthClient};
use agora::modules::dialog::repository_pg::DialogRepositoryPg;
use agora::modules::dialog::route;
use agora::modules::dialog::service::DialogService;
use agora::modules::dialog::worker::run_reply_consumer;
use agora::workers::WorkerHandle;

async fn index() -> &'static str {
    "Agora dialogs service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config =
        AppConfig::load_default().map_err(|e| std::io::Error::other(e.to_string()))?;

    if config.features.use_alt_store {
        tracing::warn!(
            "use_alt_store is set, but no alternate message store ships in this build; \
             dialogs stay on the relational store"
        );
    }

    tracing::info!("connecting to Postgres");
    let pool = connect_pool(&config.dialogs.db, config.database.max_connections)
        .await
        .map_err(std::io::Error::other)?;

    tracing::info!("connecting to RabbitMQ");
    let broker = Broker::connect(&config.rabbitmq.url).await.map_err(std::io::Error::other)?;

    let repo = Arc::new(DialogRepositoryPg::new(pool.clone()));
    let service = DialogService::with_dependencies(
        repo,
        Arc::new(broker.clone()),
        config.features.mark_as_read_on_listing,
    );
    let auth = AuthClient::new(&config.server.host, config.server.port);

    let reply_consumer = WorkerHandle::spawn("dialog-reply-consumer", {
        let (broker, service) = (broker.clone(), service.clone());
        move |token| run_reply_consumer(token, broker, service)
    });

    let monitoring = config.features.monitoring_enabled;
    tracing::info!(port = config.dialogs.port, "dialogs service started");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(monitoring, Logger::default()))
            .app_data(web::Data::new(service.clone()))
            .app_data(web::Data::new(auth.clone()))
            .service(
                web::scope(PREFIX_V2).route("", web::get().to(index)).service(
                    web::scope("")
                        .wrap(from_fn(remote_authentication))
                        .configure(route::configure),
                ),
            )
    })
    .bind(("0.0.0.0", config.dialogs.port))?
    .run();

    let result = server.await;

    reply_consumer.stop().await;
    broker.close().await;
    pool.close().await;

    result
}
