use std::path::PathBuf;

use bevy::prelude::*;
use bevy::window::PresentMode;
use bevy::winit::{UpdateMode, WinitSettings};

use automation::settings::HigherTaxesCapability;

mod sandbox;

use sandbox::{load_settings, SandboxPlugin, SettingsPath};

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "State of Emergency".to_string(),
            resolution: (1280.0, 720.0).into(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }))
    .insert_resource(WinitSettings {
        focused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(16)),
        unfocused_mode: UpdateMode::reactive_low_power(std::time::Duration::from_millis(100)),
    })
    .add_plugins((automation::AutomationPlugin, ui::UiPlugin, SandboxPlugin));

    // Stands in for detecting the cooperating higher-taxes mod.
    if std::env::var("STATE_OF_EMERGENCY_HIGHER_TAXES").is_ok() {
        info!("Higher taxes enabled: tax cap may exceed 30%");
        app.insert_resource(HigherTaxesCapability(true));
    }

    if let Ok(path) = std::env::var("STATE_OF_EMERGENCY_SETTINGS") {
        let path = PathBuf::from(path);
        app.insert_resource(load_settings(&path))
            .insert_resource(SettingsPath(path));
    }

    app.run();
}
