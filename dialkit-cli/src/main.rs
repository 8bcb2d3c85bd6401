use std::error::Error;

use clap::Parser;
use dialkit::prelude::*;
use dialkit::runtime::storage::{config_dir, load_settings_if_exists};

mod cli;

use cli::{Cli, Commands};

fn main() -> std::result::Result<(), Box<dyn Error>> {
    init_logger();
    let cli = Cli::parse();
    let settings = load_user_settings();

    match cli.command {
        Commands::Inspect { schema, name } => {
            let config = parse_from_path(&schema)?;
            let store = DialStore::builder().settings(&settings).build();
            let kit = DialKit::create(&store, &name, config);
            let panel = store.get_panel(kit.panel_id())?;
            let output = serde_json::json!({
                "id": panel.id,
                "name": panel.name,
                "controls": panel.controls,
                "values": kit.values()?.to_json(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Curve { spring, duration } => {
            let spring = spring.to_spring();
            let simple = spring.implied_mode().is_simple();
            let physics = resolve_spring_physics(&spring, simple);
            let duration = duration.unwrap_or(settings.preview_duration);
            if duration.is_nan() || duration <= 0.0 {
                return Err("duration must be positive".into());
            }
            println!("time,position");
            for sample in generate_spring_curve(
                physics.stiffness,
                physics.damping,
                physics.mass,
                duration,
            ) {
                println!("{:.4},{:.6}", sample.time, sample.position);
            }
        }
        Commands::Convert { spring, to } => {
            let converted = spring.to_spring().to_mode(to.into());
            println!("{}", serde_json::to_string_pretty(&converted)?);
        }
        Commands::Presets { panel_id, dir } => {
            let storage = match dir {
                Some(dir) => JsonFileStorage::new(dir),
                None => JsonFileStorage::from_settings(&settings),
            };
            let state = storage.load(&panel_id)?.unwrap_or_else(|| {
                log::warn!(
                    "No presets stored at {:?}",
                    storage.path_for(&panel_id)
                );
                PanelState::new(vec![], None)
            });
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }

    Ok(())
}

fn load_user_settings() -> DialSettings {
    let Some(dir) = config_dir() else {
        return DialSettings::default();
    };
    match load_settings_if_exists(&dir.to_string_lossy()) {
        Ok(Some(settings)) => {
            log::debug!("Loaded settings from {:?}", dir);
            settings
        }
        Ok(None) => DialSettings::default(),
        Err(e) => {
            log::warn!("Ignoring unreadable settings in {:?}: {}", dir, e);
            DialSettings::default()
        }
    }
}
