use dashboard_server::config::{ApiKeys, AppConfig, ConfigError};
use dashboard_server::geocode::{GeocodeConfig, GeocodeError, Geocoder};
use dashboard_server::hafas::{HafasClient, HafasConfig, HafasError};
use dashboard_server::mosmix::{ForecastError, MosmixClient, MosmixConfig};
use dashboard_server::transit::{TransitConfig, TransitProvider};
use dashboard_server::weather::WeatherProvider;
use dashboard_server::web::{AppState, create_router};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Anything that stops the server from coming up.
#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("transit client: {0}")]
    Hafas(#[from] HafasError),
    #[error("forecast client: {0}")]
    Forecast(#[from] ForecastError),
    #[error("geocoder: {0}")]
    Geocode(#[from] GeocodeError),
    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run().await {
        error!(error = %e, "dashboard server stopped");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), StartupError> {
    let config = AppConfig::from_env()?;
    let keys = ApiKeys::load(&config.api_keys_path)?;

    let mut hafas_config = HafasConfig::new();
    if let Some(url) = &config.hafas_base_url {
        hafas_config = hafas_config.with_base_url(url);
    }
    let hafas = HafasClient::new(hafas_config)?;

    let mut mosmix_config = MosmixConfig::new();
    if let Some(url) = &config.mosmix_base_url {
        mosmix_config = mosmix_config.with_base_url(url);
    }
    let mosmix = MosmixClient::new(mosmix_config)?;

    let geocoder = Geocoder::select(keys.here(), &GeocodeConfig::new())?;
    info!(geocoder = geocoder.name(), zone = config.zone.name(), "backends configured");

    let transit = TransitProvider::new(hafas, config.zone, &TransitConfig::default());
    let weather = WeatherProvider::new(geocoder, mosmix, config.zone);

    let state = AppState::new(transit, weather, config.dashboard.clone(), config.zone);
    let app = create_router(state, &config.static_dir);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "dashboard listening");
    axum::serve(listener, app).await?;
    Ok(())
}
