use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ffc_api::{app, state::{AppState, AuthConfig}};
use ffc_catalog::QuoteCalculator;
use ffc_chat::{ChatEngine, ConversationStore, MessageStore};
use ffc_core::{ChatGateway, ModelGenerator, PrintVendorClient};
use ffc_order::{OrderAdmin, OrderPipeline, OrderStore, PipelineConfig};
use ffc_store::clients::{HttpChatGateway, HttpModelGenerator, HttpPrintVendor};
use ffc_store::{PgConversationStore, PgMessageStore, PgOrderStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ffc_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ffc_store::Config::load().expect("Failed to load config");
    tracing::info!("Starting FFC engine on port {}", config.server.port);

    let pool = ffc_store::database::connect(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");

    let orders: Arc<dyn OrderStore> = Arc::new(PgOrderStore::new(pool.clone()));
    let messages: Arc<dyn MessageStore> = Arc::new(PgMessageStore::new(pool.clone()));
    let conversations: Arc<dyn ConversationStore> = Arc::new(PgConversationStore::new(pool));

    let gateway: Arc<dyn ChatGateway> = Arc::new(
        HttpChatGateway::new(config.gateway.clone()).expect("Failed to build gateway client"),
    );
    let generator: Arc<dyn ModelGenerator> = Arc::new(
        HttpModelGenerator::new(config.modelgen.clone()).expect("Failed to build modelgen client"),
    );
    let vendor: Arc<dyn PrintVendorClient> = Arc::new(
        HttpPrintVendor::new(config.vendor.clone()).expect("Failed to build vendor client"),
    );

    let engine = Arc::new(ChatEngine::new(
        orders.clone(),
        messages.clone(),
        conversations,
        gateway,
        QuoteCalculator::new(config.pricing.clone()),
    ));

    let pipeline = Arc::new(OrderPipeline::new(
        orders.clone(),
        generator,
        vendor.clone(),
        PipelineConfig {
            generation_attempts: config.pipeline.generation_attempts,
            generation_retry_delay: Duration::from_secs(config.pipeline.generation_retry_delay_seconds),
            model_output_dir: config.modelgen.output_dir.clone(),
            auto_order: config.vendor.api_key.is_some(),
        },
    ));

    let admin = Arc::new(OrderAdmin::new(orders.clone()));

    let app_state = AppState {
        orders,
        messages,
        engine,
        pipeline,
        admin,
        vendor,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            operator_passphrase: config.auth.operator_passphrase.clone(),
        },
        auto_fulfill: config.pipeline.auto_fulfill,
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
