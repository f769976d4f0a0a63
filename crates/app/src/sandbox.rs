//! A tiny stand-in realm for driving the automation by hand.
//!
//! Keys: `D` toggles a dragon, `R` toggles a raid, `N` starts a new game and
//! `H` flips hazard pay the way a player would from the chamber of war.

use std::path::PathBuf;

use bevy::prelude::*;

use automation::host::{
    ChamberOfWar, HazardPay, HazardPayToggle, Invasion, NewGameEvent, RegionId, TaxRates, Tower,
    TowerKind, Treasury,
};
use automation::settings::AutomationSettings;

const STARTING_GOLD: i64 = 500;
const STARTING_REGIONS: [(u32, f32); 3] = [(1, 0.10), (2, 0.20), (3, 0.30)];
const TOWERS_PER_KIND: usize = 2;

/// Where settings are persisted, if anywhere.
#[derive(Resource, Debug, Clone)]
pub struct SettingsPath(pub PathBuf);

pub fn seed_realm(
    mut commands: Commands,
    mut treasury: ResMut<Treasury>,
    mut tax_rates: ResMut<TaxRates>,
    mut chamber: ResMut<ChamberOfWar>,
) {
    commands.spawn(Camera2d);

    treasury.gold = STARTING_GOLD;
    chamber.staffing = 1.0;
    for (id, rate) in STARTING_REGIONS {
        tax_rates.claim(RegionId(id), rate);
    }
    for kind in TowerKind::ALL {
        for _ in 0..TOWERS_PER_KIND {
            commands.spawn(Tower::new(kind, false));
        }
    }
    info!(
        "Sandbox realm seeded: {} gold, {} regions, {} towers",
        STARTING_GOLD,
        STARTING_REGIONS.len(),
        TowerKind::ALL.len() * TOWERS_PER_KIND
    );
}

pub fn sandbox_keybinds(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut invasion: ResMut<Invasion>,
    mut hazard_pay: ResMut<HazardPay>,
    mut toggle: ResMut<HazardPayToggle>,
    mut new_game: EventWriter<NewGameEvent>,
) {
    if keyboard.just_pressed(KeyCode::KeyD) {
        invasion.dragons = if invasion.dragons > 0 { 0 } else { 1 };
        info!("Dragons over the realm: {}", invasion.dragons);
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        invasion.raid_in_progress = !invasion.raid_in_progress;
        info!("Raid in progress: {}", invasion.raid_in_progress);
    }
    if keyboard.just_pressed(KeyCode::KeyN) {
        new_game.send(NewGameEvent);
        info!("New game started");
    }
    if keyboard.just_pressed(KeyCode::KeyH) {
        if hazard_pay.active {
            hazard_pay.deactivate();
        } else {
            hazard_pay.activate(true);
        }
        toggle.is_on = hazard_pay.active;
        info!("Player set hazard pay: {}", hazard_pay.active);
    }
}

/// Writes the settings back to disk whenever the window changes them.
pub fn persist_settings(settings: Res<AutomationSettings>, path: Option<Res<SettingsPath>>) {
    let Some(path) = path else {
        return;
    };
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    let json = match settings.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize automation settings: {}", e);
            return;
        }
    };
    if let Err(e) = std::fs::write(&path.0, json) {
        warn!(
            "Failed to write automation settings to {}: {}",
            path.0.display(),
            e
        );
    }
}

/// Reads settings from `path`, falling back to defaults when the file is
/// missing or malformed.
pub fn load_settings(path: &std::path::Path) -> AutomationSettings {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            info!(
                "No automation settings at {} ({}), using defaults",
                path.display(),
                e
            );
            return AutomationSettings::default();
        }
    };
    match AutomationSettings::from_json(&json) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Ignoring malformed settings at {}: {}", path.display(), e);
            AutomationSettings::default()
        }
    }
}

pub struct SandboxPlugin;

impl Plugin for SandboxPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, seed_realm)
            .add_systems(Update, (sandbox_keybinds, persist_settings));
    }
}
