use eventbus::{BusConfig, JsonEventBus};
use serde_json::{json, Value};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventbus=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BusConfig::from_env();
    info!(
        config = %serde_json::to_string(&config).unwrap_or_default(),
        "Starting event bus demo"
    );

    // One bus per process, handed to every publisher and subscriber
    let bus = JsonEventBus::with_config(config);

    bus.watch("order:created", |change| {
        info!(
            event = %change.event,
            subscribers = change.len,
            "Subscriber list changed"
        );
    });

    bus.subscribe("order:created", |order: Option<&Value>| {
        info!(order = ?order, "Reserving stock");
    });
    bus.subscribe("order:created", |order: Option<&Value>| {
        info!(order = ?order, "Sending confirmation email");
    });

    bus.publish("order:created", json!({ "id": 7 }));

    // Nobody listens for shipments yet: logs a warning and moves on
    bus.publish("order:shipped", json!({ "id": 7 }));

    match bus.dispatch("order:created", None) {
        Ok(delivery) => info!(
            delivery = %serde_json::to_string(&delivery).unwrap_or_default(),
            "Dispatch complete"
        ),
        Err(e) => info!(error = %e, "Dispatch failed"),
    }
}
