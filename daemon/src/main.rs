use std::{fs::File, io::Write, path::Path};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use strum::IntoEnumIterator;
use twist_common::{
    config::VERSION, logger, node::ChainType, roles::Capability,
    time::get_current_time_in_seconds,
};
use twist_daemon::{
    config::{Config, SNAPSHOT_FILE_EXTENSION, SUMMARY_RECENT_EVENTS},
    core::{CoreState, SharedState, StateSnapshot},
};

#[tokio::main]
async fn main() -> Result<()> {
    let mut config: Config = Config::parse();
    if let Some(path) = config.config_file.as_ref() {
        if config.generate_config_template {
            if Path::new(path).exists() {
                eprintln!("Config file already exists at {}", path);
                return Ok(());
            }

            let mut file = File::create(path).context("Error while creating config file")?;
            let json = serde_json::to_string_pretty(&config)
                .context("Error while serializing config file")?;
            file.write_all(json.as_bytes())
                .context("Error while writing config file")?;
            println!("Config file template generated at {}", path);
            return Ok(());
        }

        let file = File::open(path).context("Error while opening config file")?;
        config = serde_json::from_reader(file).context("Error while reading config file")?;
    } else if config.generate_config_template {
        eprintln!("Provided config file path is required to generate the template with --config-file");
        return Ok(());
    }

    logger::init(
        config.log.log_level,
        config.log.disable_log_color,
        config.log.datetime_format.clone(),
    )
    .context("Error while initializing the logger")?;

    info!("Twist daemon v{} starting...", VERSION);

    let state = match config.snapshot.as_ref() {
        Some(path) => {
            info!("Restoring state from {}", path);
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Error while reading snapshot {}", path))?;
            let snapshot = StateSnapshot::from_json(&json).context("Invalid snapshot file")?;
            CoreState::restore(snapshot).context("Snapshot failed validation")?
        }
        None => CoreState::new(&config.core).context("Invalid core configuration")?,
    };

    let shared = SharedState::new(state);
    log_summary(&shared).await;

    if let Some(path) = config.snapshot_out.as_ref() {
        let mut path = Path::new(path).to_path_buf();
        if path.extension().is_none() {
            path.set_extension(SNAPSHOT_FILE_EXTENSION);
        }

        let json = shared
            .read()
            .await
            .snapshot()
            .to_json()
            .context("Error while serializing snapshot")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Error while writing snapshot {}", path.display()))?;
        info!("Snapshot written to {}", path.display());
    }

    Ok(())
}

async fn log_summary(shared: &SharedState) {
    let state = shared.read().await;
    let registry = state.registry();
    let vesting = state.vesting();
    let roles = state.roles();

    info!(
        "Nodes: {} registered, {} active",
        registry.count(),
        registry.active_count()
    );
    for chain_type in ChainType::iter() {
        let count = registry.count_by_chain(chain_type);
        if count > 0 {
            info!("  {}: {} active", chain_type, count);
        }
    }

    let window = vesting.window();
    info!(
        "Vesting: {} beneficiaries, {} vested of {} max supply, window [{}, {}]",
        vesting.beneficiaries().count(),
        vesting.total_vested(),
        vesting.max_supply(),
        window.start,
        window.end
    );

    // Display only
    let now = get_current_time_in_seconds();
    let unlocked: u128 = vesting
        .beneficiaries()
        .map(|beneficiary| vesting.vested_amount(beneficiary, now) as u128)
        .sum();
    info!("Unlocked at {}: {}", now, unlocked);
    if vesting.is_paused() {
        warn!("Vesting is paused: grants and claims are rejected");
    }

    for capability in Capability::iter() {
        info!(
            "Role {}: {} holder(s)",
            capability,
            roles.holder_count(capability)
        );
    }

    let last = state.events().last_sequence();
    info!("Event log at sequence {}", last);
    if log::log_enabled!(log::Level::Debug) {
        for record in state.events_since(last.saturating_sub(SUMMARY_RECENT_EVENTS)) {
            debug!("#{} {:?}", record.sequence, record.event);
        }
    }
}
