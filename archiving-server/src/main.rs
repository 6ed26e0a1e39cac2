use anyhow::Result;
use archiving_server::{config::AppConfig, server::Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = AppConfig::load()?;

    // 初始化日志
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "archiving_server={level},opentok_client={level},tower_http=debug",
            level = config.logging.level
        )
        .into()
    });

    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(false))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true),
            )
            .init();
    }

    tracing::info!("Starting archiving server with config: {:?}", config);

    // 启动服务器
    let server = Server::new(config).await?;
    server.run().await?;

    Ok(())
}
