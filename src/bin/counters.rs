use actix_web::{
    middleware::{from_fn, Condition, Logger},
    web, App, HttpServer,
};
use std::sync::Arc;

use agora::broker::Broker;
use agora::configs::{connect_pool, init_tracing, AppConfig};
use agora::constants::PREFIX_V2;
use agora::middlewares::{remote_authentication, AuthClient};
use agora::modules::counter::repository_pg::CounterRepositoryPg;
use agora::modules::counter::route;
use agora::modules::counter::service::CounterService;
use agora::modules::counter::worker::run_request_consumer;
use agora::workers::WorkerHandle;

async fn index() -> &'static str {
    "Agora counters service"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config =
        AppConfig::load_default().map_err(|e| std::io::Error::other(e.to_string()))?;

    tracing::info!("connecting to Postgres");
    let pool = connect_pool(&config.counters.db, config.database.max_connections)
        .await
        .map_err(std::io::Error::other)?;

    tracing::info!("connecting to RabbitMQ");
    let broker = Broker::connect(&config.rabbitmq.url).await.map_err(std::io::Error::other)?;

    let repo = Arc::new(CounterRepositoryPg::new(pool.clone()));
    let service = CounterService::with_dependencies(repo, Arc::new(broker.clone()));
    let auth = AuthClient::new(&config.server.host, config.server.port);

    let request_consumer = WorkerHandle::spawn("counter-request-consumer", {
        let (broker, service) = (broker.clone(), service.clone());
        move |token| run_request_consumer(token, broker, service)
    });

    let monitoring = config.features.monitoring_enabled;
    tracing::info!(port = config.counters.port, "counters service started");

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
    .bind(("0.0.0.0", config.counters.port))?
    .run();

    let result = server.await;

    request_consumer.stop().await;
    broker.close().await;
    pool.close().await;

    result
}
