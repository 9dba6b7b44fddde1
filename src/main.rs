use actix_cors::Cors;
use actix_web::{
    middleware::{from_fn, Condition, Logger},
    web, App, HttpServer,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use agora::api::error::ApiError;
use agora::broker::Broker;
use agora::configs::{init_tracing, AppConfig, RedisCache};
use agora::constants::{PREFIX_V1, PREFIX_V2};
use agora::middlewares::{authentication, request_id};
use agora::modules::feed::cache::FeedCache;
use agora::modules::feed::service::FeedService;
use agora::modules::feed::worker::{run_cache_primer, run_cache_updater};
use agora::modules::friend::repository_pg::FriendRepositoryPg;
use agora::modules::friend::service::FriendService;
use agora::modules::post::repository_pg::PostRepositoryPg;
use agora::modules::post::service::PostService;
use agora::modules::user::repository_pg::{TokenRepositoryPg, UserRepositoryPg};
use agora::modules::user::service::UserService;
use agora::modules::{counter, dialog, friend, post, user};
use agora::routing::DataRouter;
use agora::workers::{stop_all, WorkerHandle};
use agora::Services;

async fn index() -> &'static str {
    "Welcome to the agora social network!"
}

fn api_scope(prefix: &str) -> actix_web::Scope {
    web::scope(prefix)
        .route("", web::get().to(index))
        .configure(user::route::public_configure)
        .configure(post::route::public_configure)
        .service(
            web::scope("")
                .wrap(from_fn(authentication))
                .configure(user::route::configure)
                .configure(friend::route::configure)
                .configure(post::route::configure)
                .configure(dialog::proxy::configure)
                .configure(counter::proxy::configure),
        )
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = Arc::new(
        AppConfig::load_default().map_err(|e| std::io::Error::other(e.to_string()))?,
    );

    tracing::info!("connecting to Postgres");
    let router = DataRouter::connect(&config).await.map_err(std::io::Error::other)?;

    tracing::info!("connecting to cache");
    let redis = RedisCache::new(&config.cache.url)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    tracing::info!("connecting to RabbitMQ");
    let broker = Broker::connect(&config.rabbitmq.url).await.map_err(std::io::Error::other)?;

    let user_repo = Arc::new(UserRepositoryPg::new(router.clone()));
    let token_repo = Arc::new(TokenRepositoryPg::new(router.clone()));
    let friend_repo = Arc::new(FriendRepositoryPg::new(router.clone()));
    let post_repo = Arc::new(PostRepositoryPg::new(router.clone()));
    let feed_cache = FeedCache::new(redis);

    let services = Services {
        config: config.clone(),
        users: UserService::with_dependencies(user_repo, token_repo),
        friends: FriendService::with_dependencies(friend_repo.clone()),
        posts: PostService::with_dependencies(post_repo.clone(), Arc::new(broker.clone())),
        feed: FeedService::with_dependencies(post_repo.clone(), feed_cache.clone()),
        http: reqwest::Client::new(),
        shutdown: CancellationToken::new(),
    };

    let workers = vec![
        WorkerHandle::spawn("cache-primer", {
            let (posts, friends, cache) = (post_repo, friend_repo, feed_cache.clone());
            move |token| run_cache_primer(token, posts, friends, cache)
        }),
        WorkerHandle::spawn("cache-updater", {
            let (broker, cache) = (broker.clone(), feed_cache);
            move |token| run_cache_updater(token, broker, cache)
        }),
    ];

    let app_services = services.clone();
    tracing::info!(host = %config.server.host, port = config.server.port, "server started");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Condition::new(
                app_services.config.features.monitoring_enabled,
                Logger::default(),
            ))
            .app_data(web::Data::new(app_services.clone()))
            .app_data(web::JsonConfig::default().error_handler(|_err, req| {
                ApiError::bad_request(&request_id(req)).into()
            }))
            .service(api_scope(PREFIX_V1))
            .service(api_scope(PREFIX_V2))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run();

    let result = server.await;

    // teardown in reverse order of acquisition
    services.shutdown.cancel();
    stop_all(workers).await;
    broker.close().await;
    router.close().await;

    result
}
