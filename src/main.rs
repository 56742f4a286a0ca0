use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn, Level};

use apres_ski_finder::cache::{CacheConfig, VenueCache};
use apres_ski_finder::clients::OverpassClient;
use apres_ski_finder::config::database::DatabaseConfig;
use apres_ski_finder::config::EnvironmentConfig;
use apres_ski_finder::models::location::ski_resorts;
use apres_ski_finder::repositories::{InMemoryUserRepository, PgUserRepository, UserStore};
use apres_ski_finder::routes::create_router;
use apres_ski_finder::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    let level = std::env::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("⛷️ Après-ski finder API");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    if config.is_development() {
        info!("🧪 Modo desarrollo");
    }

    // Almacén de usuarios
    let users: Arc<dyn UserStore> = match &config.database_url {
        Some(url) => {
            let db_config = DatabaseConfig::new(url.clone());
            info!("🔗 Conectando a PostgreSQL: {}", db_config.masked_url());

            let pool = db_config.create_pool().await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                anyhow::anyhow!("Error de base de datos: {}", e)
            })?;

            let repository = PgUserRepository::new(pool);
            repository
                .ensure_schema()
                .await
                .map_err(|e| anyhow::anyhow!("Error creando el schema: {}", e))?;
            info!("✅ Base de datos lista");
            Arc::new(repository)
        }
        None => {
            warn!("⚠️ DATABASE_URL no definido: usuarios en memoria (se pierden al reiniciar)");
            Arc::new(InMemoryUserRepository::new())
        }
    };

    // Cliente Overpass + cache por estación
    let overpass = OverpassClient::new(&config.overpass_url)
        .context("No se pudo crear el cliente HTTP de Overpass")?;
    let resorts = ski_resorts();
    info!("🏔️ {} estaciones en el catálogo", resorts.len());
    let venues = VenueCache::new(Arc::new(overpass), resorts, &CacheConfig::default());

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let app_state = AppState::new(config, users, venues);
    let app = create_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    / - Health check");
    info!("   POST   /auth/register - Registrar usuario");
    info!("   POST   /auth/login - Login");
    info!("   GET    /me - Claims del token");
    info!("   GET    /profile - Perfil");
    info!("   PUT    /profile - Actualizar perfil");
    info!("   DELETE /profile - Eliminar cuenta");
    info!("   GET    /api/apres-ski - Estaciones y estado del cache");
    info!("   GET    /api/apres-ski/:slug - Locales de una estación");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
