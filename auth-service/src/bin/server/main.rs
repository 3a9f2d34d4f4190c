use std::sync::Arc;

use auth::TokenService;
use auth_service::config::BootstrapAdminConfig;
use auth_service::config::Config;
use auth_service::domain::principal::models::AdminRole;
use auth_service::domain::principal::models::EmailAddress;
use auth_service::domain::principal::models::Password;
use auth_service::domain::principal::models::PersonName;
use auth_service::domain::principal::models::ProvisionAdminCommand;
use auth_service::domain::principal::ports::AuthServicePort;
use auth_service::domain::principal::service::AuthService;
use auth_service::inbound::http::cookies::CookieSettings;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::email::LogEmailSender;
use auth_service::outbound::email::SmtpEmailSender;
use auth_service::outbound::repositories::PostgresCredentialStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        production = config.server.production,
        email_enabled = config.email.enabled,
        otp_ttl_minutes = config.otp.ttl_minutes,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let lifetimes = config.jwt.lifetimes();
    let tokens = Arc::new(TokenService::new(
        config.jwt.user_secrets(),
        config.jwt.admin_secrets(),
        lifetimes,
    ));
    let credential_store = Arc::new(PostgresCredentialStore::new(pg_pool));
    let otp_ttl = chrono::Duration::minutes(config.otp.ttl_minutes);

    let auth_service: Arc<dyn AuthServicePort> = if config.email.enabled {
        let mailer = Arc::new(SmtpEmailSender::new(&config.email, config.otp.ttl_minutes)?);
        Arc::new(AuthService::new(
            credential_store,
            mailer,
            Arc::clone(&tokens),
            otp_ttl,
        ))
    } else {
        Arc::new(AuthService::new(
            credential_store,
            Arc::new(LogEmailSender::new()),
            Arc::clone(&tokens),
            otp_ttl,
        ))
    };

    if let Some(bootstrap) = &config.bootstrap_admin {
        provision_bootstrap_admin(auth_service.as_ref(), bootstrap).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let cookies = CookieSettings::new(config.server.production, &lifetimes);
    let http_application = create_router(auth_service, tokens, cookies);

    axum::serve(http_listener, http_application).await?;
    tracing::info!("Server exited successfully");

    Ok(())
}

async fn provision_bootstrap_admin(
    auth_service: &dyn AuthServicePort,
    bootstrap: &BootstrapAdminConfig,
) -> Result<(), anyhow::Error> {
    let command = ProvisionAdminCommand {
        email: EmailAddress::new(bootstrap.email.clone())?,
        password: Password::new(bootstrap.password.clone())?,
        first_name: PersonName::new(bootstrap.first_name.clone())?,
        last_name: PersonName::new(bootstrap.last_name.clone())?,
        role: AdminRole::from_name(&bootstrap.role),
    };

    let admin = auth_service.provision_admin(command).await?;
    tracing::info!(
        account_id = %admin.id,
        role = admin.role.as_str(),
        "Bootstrap admin ready"
    );
    Ok(())
}
