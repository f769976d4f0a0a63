//! Player-facing settings for the invasion automation.
//!
//! `AutomationSettings` is the key-value store both controllers re-read every
//! tick. The host persists it as JSON; Bevy change detection on the resource
//! is the change notification.

use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

// =============================================================================
// Constants
// =============================================================================

/// Default hazard-pay tax rate cap (30%).
pub const DEFAULT_TAX_RATE_CAP: f32 = 0.30;

/// Highest tax rate the host allows on its own.
pub const ABSOLUTE_TAX_RATE_CEILING: f32 = 0.30;

/// Highest tax rate when the higher-taxes capability is present.
pub const EXTENDED_TAX_RATE_CEILING: f32 = 1.0;

/// Slider granularity for the tax rate cap.
pub const TAX_RATE_STEP: f32 = 0.05;

// =============================================================================
// Resources
// =============================================================================

/// Settings exposed to the player.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    /// Auto-activate hazard pay (and raise taxes) during invasions.
    pub auto_hazard_pay: bool,
    /// Auto-open defensive towers during invasions.
    pub auto_towers: bool,
    /// Tax rate applied to every region while hazard pay is automated.
    pub max_hazard_pay_tax_rate: f32,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        Self {
            auto_hazard_pay: true,
            auto_towers: true,
            max_hazard_pay_tax_rate: DEFAULT_TAX_RATE_CAP,
        }
    }
}

impl AutomationSettings {
    /// Set the tax rate cap, snapped to the slider step and clamped to `[0, 1]`.
    pub fn set_max_hazard_pay_tax_rate(&mut self, rate: f32) {
        // Divide last so each step lands on the same f32 as its percentage literal.
        let steps_per_unit = (1.0 / TAX_RATE_STEP).round();
        let snapped = (rate * steps_per_unit).round() / steps_per_unit;
        self.max_hazard_pay_tax_rate = snapped.clamp(0.0, EXTENDED_TAX_RATE_CEILING);
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let mut settings: Self = serde_json::from_str(json)?;
        // Stored values bypass the setter.
        settings.set_max_hazard_pay_tax_rate(settings.max_hazard_pay_tax_rate);
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Present when a cooperating "higher taxes" mod was detected at startup,
/// lifting the tax ceiling above 30%.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HigherTaxesCapability(pub bool);

impl HigherTaxesCapability {
    /// Upper bound for the tax rate cap slider.
    pub fn ceiling(self) -> f32 {
        if self.0 {
            EXTENDED_TAX_RATE_CEILING
        } else {
            ABSOLUTE_TAX_RATE_CEILING
        }
    }
}

/// The tax rate automation actually applies: the player's cap, held to the
/// host ceiling unless the higher-taxes capability is present.
pub fn target_tax_rate(max_tax_rate: f32, capability: HigherTaxesCapability) -> f32 {
    max_tax_rate.min(capability.ceiling())
}

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while reading or writing persisted settings.
#[derive(Debug)]
pub enum SettingsError {
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Json(e) => write!(f, "settings JSON error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Json(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Logs every settings change made after startup.
pub fn log_settings_changes(
    settings: Res<AutomationSettings>,
    capability: Res<HigherTaxesCapability>,
) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }
    info!(
        "Automation settings changed: hazard pay {}, towers {}, tax cap {:.0}% (applied {:.0}%)",
        if settings.auto_hazard_pay { "on" } else { "off" },
        if settings.auto_towers { "on" } else { "off" },
        settings.max_hazard_pay_tax_rate * 100.0,
        target_tax_rate(settings.max_hazard_pay_tax_rate, *capability) * 100.0,
    );
}

// =============================================================================
// Plugin
// =============================================================================

pub struct SettingsPlugin;

impl Plugin for SettingsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutomationSettings>()
            .init_resource::<HigherTaxesCapability>()
            .add_systems(Update, log_settings_changes);
    }
}
