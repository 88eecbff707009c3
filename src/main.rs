use actix_web::web::{self, ServiceConfig};
use shuttle_actix_web::ShuttleActixWeb;
use shuttle_runtime::SecretStore;

use mashup::app_state::AppState;
use mashup::config::Config;
use mashup::endpoints::mashup::configure as mashup_configure;

#[shuttle_runtime::main]
async fn main(
    #[shuttle_runtime::Secrets] secrets: SecretStore,
) -> ShuttleActixWeb<impl FnOnce(&mut ServiceConfig) + Send + Clone + 'static> {
    // Secrets first, plain environment as a fallback for hosts without a
    // secret store.
    let config = Config::from_lookup(|key| secrets.get(key).or_else(|| std::env::var(key).ok()));

    // Missing or malformed mail settings stop the service here rather than
    // failing each request later.
    let state = AppState::from_config(&config).map_err(|e| {
        tracing::error!("Refusing to start: {}", e);
        shuttle_runtime::Error::Custom(e.into())
    })?;

    if let Err(e) = std::fs::create_dir_all(&state.workspace_root) {
        tracing::error!(
            "Failed to create workspace root {}: {:?}",
            state.workspace_root.display(),
            e
        );
    }
    tracing::info!("Jobs will run under {}", state.workspace_root.display());

    let state = web::Data::new(state);
    let app_config = move |cfg: &mut ServiceConfig| {
        cfg.app_data(state);
        mashup_configure(cfg);
    };

    Ok(app_config.into())
}
