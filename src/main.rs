use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use tripmates::{
    balance::{format_money, summarize},
    schemas::format_date,
    Config, FileStore, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let store = FileStore::open(&config.data_dir)?;
    info!("Using data directory {}", store.dir().display());

    let session = Session::open(config, Arc::new(store))?;
    match session.auth().user() {
        Some(user) => info!("Signed in as {} <{}>", user.name, user.email),
        None => info!("Nobody signed in"),
    }

    {
        let trips = session.trips().lock().await;
        info!("{} trips", trips.trips().len());
        for trip in trips.trips() {
            let summary = summarize(trip);
            info!(
                "{} [{}] {}, {} to {}: {} members, {} spent ({} each)",
                trip.name,
                trip.id,
                trip.location,
                format_date(trip.start_date),
                format_date(trip.end_date),
                trip.members.len(),
                format_money(summary.total),
                format_money(summary.per_member),
            );
        }
    }

    session.close().await;
    Ok(())
}
