use anyhow::{Context, Result};

use tempsweep::disk::ensure_directory;
use tempsweep::logging::init_logging;
use tempsweep::services::autostart::platform_registry;
use tempsweep::services::preference::JsonPreferenceStore;
use tempsweep::services::prompt::ConsolePrompt;
use tempsweep::utils::is_elevated;
use tempsweep::{AgentSettings, Cleaner, ScheduleConfig, Scheduler, StartupRegistrar};

#[tokio::main]
async fn main() -> Result<()> {
    // Un seul argument facultatif : le chemin du fichier de configuration
    let settings = AgentSettings::from_args(std::env::args().skip(1));
    let _log_guard = init_logging(&settings.log_dir);

    ensure_directory(&settings.install_dir);

    // Enregistrement au démarrage : jamais bloquant pour le nettoyage
    let registrar = StartupRegistrar::new(
        settings.task_name.clone(),
        settings.launch_command(),
        Box::new(ConsolePrompt),
        platform_registry(is_elevated()),
        Box::new(JsonPreferenceStore::new(&settings.preference_path)),
    );
    let state = registrar.reconcile().await;
    tracing::debug!(?state, "Startup registration done");

    let config = match ScheduleConfig::load_from_file(&settings.config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Cannot start without a valid configuration: {}", e);
            return Err(e).with_context(|| format!("loading {}", settings.config_path.display()));
        }
    };

    tracing::info!(
        targets = config.targets.len(),
        interval_hours = config.interval_hours,
        "Configuration loaded from {}",
        settings.config_path.display()
    );

    let scheduler = Scheduler::new(config, Cleaner::default());
    scheduler.run().await;
    Ok(())
}
