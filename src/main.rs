//! Binary entry point: configuration, wiring, and the two long-running
//! loops (update router, expiry sweep).

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use channel_gate::adapters::export::CsvTableExporter;
use channel_gate::adapters::sqlite::{
    SqliteAccountRepository, SqlitePaymentLedger, SqlitePricingStore,
};
use channel_gate::adapters::telegram::{TelegramClient, TelegramNotifier, UpdateRouter};
use channel_gate::application::handlers::{
    EvidenceHandler, ExportHandler, ForceStatusHandler, PricingHandler, RegistrationHandler,
    ReviewHandler, StatsHandler,
};
use channel_gate::application::{
    AccountLocks, ConversationFlow, Dispatcher, ExpirySweep, SweepConfig,
};
use channel_gate::config::AppConfig;
use channel_gate::domain::foundation::AccountId;
use channel_gate::ports::{
    AccountRepository, Clock, Notifier, PaymentLedger, PricingStore, SystemClock, TableExporter,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let options = SqliteConnectOptions::from_str(&config.database.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("migrations applied");
    }

    let accounts: Arc<dyn AccountRepository> =
        Arc::new(SqliteAccountRepository::new(pool.clone()));
    let ledger: Arc<dyn PaymentLedger> = Arc::new(SqlitePaymentLedger::new(pool.clone()));
    let pricing: Arc<dyn PricingStore> = Arc::new(SqlitePricingStore::new(pool.clone()));
    let exporter: Arc<dyn TableExporter> = Arc::new(CsvTableExporter::new());
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let client = Arc::new(TelegramClient::new(config.bot.token.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        Arc::clone(&client),
        config.bot.channel_invite_url.clone(),
    ));

    let flow = Arc::new(ConversationFlow::new());
    let locks = Arc::new(AccountLocks::new());
    let operator = AccountId::new(config.bot.operator_id);
    let sub_days = config.subscription.sub_days;

    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&flow),
        Arc::clone(&notifier),
        Arc::clone(&accounts),
        Arc::clone(&clock),
        RegistrationHandler::new(
            Arc::clone(&accounts),
            Arc::clone(&pricing),
            Arc::clone(&flow),
            Arc::clone(&notifier),
            Arc::clone(&clock),
        ),
        EvidenceHandler::new(
            Arc::clone(&ledger),
            Arc::clone(&pricing),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            operator,
        ),
        ReviewHandler::new(
            Arc::clone(&accounts),
            Arc::clone(&ledger),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            Arc::clone(&locks),
            sub_days,
        ),
        ForceStatusHandler::new(
            Arc::clone(&accounts),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            Arc::clone(&locks),
            sub_days,
        ),
        PricingHandler::new(Arc::clone(&pricing)),
        StatsHandler::new(Arc::clone(&accounts), Arc::clone(&ledger)),
        ExportHandler::new(
            Arc::clone(&accounts),
            Arc::clone(&ledger),
            Arc::clone(&exporter),
            Arc::clone(&notifier),
        ),
        operator,
        config.bot.support_contact.clone(),
    ));

    let sweep = Arc::new(ExpirySweep::new(
        Arc::clone(&accounts),
        Arc::clone(&notifier),
        Arc::clone(&clock),
        SweepConfig {
            interval: config.subscription.sweep_interval(),
            warn_days: config.subscription.warn_days,
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweep_task = {
        let sweep = Arc::clone(&sweep);
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { sweep.run(shutdown).await })
    };

    let router = UpdateRouter::new(Arc::clone(&client), Arc::clone(&dispatcher));
    let router_task = {
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move { router.run(shutdown).await })
    };

    tracing::info!(operator = config.bot.operator_id, "channel gate started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown signal received");
    shutdown_tx.send(true).ok();

    let _ = router_task.await;
    let _ = sweep_task.await;
    pool.close().await;

    Ok(())
}
