//! Invasion automation for the realm: hazard pay with temporary tax increases,
//! and defensive towers that open for the duration of a dragon or raider
//! attack.
//!
//! The two controllers ([`hazard_pay::HazardPayController`] and
//! [`towers::TowerController`]) are plain state machines that only talk to the
//! host through a context trait. [`bindings`] adapts the host's ECS state to
//! those traits and runs the controllers once per fixed tick.

use bevy::prelude::*;

pub mod bindings;
pub mod error;
pub mod hazard_pay;
pub mod host;
pub mod settings;
pub mod towers;

#[cfg(test)]
pub mod test_harness;

// ---------------------------------------------------------------------------
// Schedule phases
// ---------------------------------------------------------------------------

/// Ordered phases for automation systems in `FixedUpdate`.
///
/// Configured as a chain: `Host` → `Controllers`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum AutomationSet {
    /// Host-side bookkeeping the controllers read (hazard-pay warm-up).
    Host,
    /// New-game resets, manual tower commands, then both controller ticks.
    Controllers,
}

pub struct AutomationPlugin;

impl Plugin for AutomationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (AutomationSet::Host, AutomationSet::Controllers).chain(),
        );

        app.add_plugins((host::HostPlugin, settings::SettingsPlugin));

        app.init_resource::<hazard_pay::HazardPayController>()
            .init_resource::<towers::TowerController>()
            .add_event::<bindings::TowerCommand>()
            .add_systems(
                FixedUpdate,
                (
                    bindings::reset_on_new_game,
                    bindings::apply_tower_commands,
                    // Controllers share no state and may run in either order.
                    (
                        bindings::run_hazard_pay_automation,
                        bindings::run_tower_automation,
                    ),
                )
                    .chain()
                    .in_set(AutomationSet::Controllers),
            );
    }
}
