/// API сервер для скоринга табличных данных

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use tabular_ml::{
    api::{router, AppState},
    config::{load_config, DEFAULT_CONFIG_FILE},
    models::LogisticModel,
    PreprocessingSpec, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_config(Path::new(DEFAULT_CONFIG_FILE))
        .map_err(|e| anyhow::anyhow!("loading configuration: {e}"))?;

    // Спецификация и модель загружаются один раз и дальше только читаются
    let spec = PreprocessingSpec::load(&config.spec_path)
        .with_context(|| format!("loading spec from {}", config.spec_path.display()))?;
    let model = LogisticModel::load(&config.model_path)
        .with_context(|| format!("loading model from {}", config.model_path.display()))?;
    let session = Session::new(spec, Arc::new(model)).context("model does not match spec")?;

    let app = router(AppState::new(session));

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
