//! `pedsgate serve` — Start the HTTP gateway.

use pedsgate_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    if !config.has_api_key() {
        return Err("No API key configured — set MISTRAL_API_KEY or api_key in config.toml".into());
    }

    println!("pedsgate gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.provider.model);

    pedsgate_gateway::start(config).await?;

    Ok(())
}
