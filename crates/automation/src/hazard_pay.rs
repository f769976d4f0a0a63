//! Hazard pay automation.
//!
//! Buys hazard pay as soon as an invasion starts (if the chamber of war is
//! staffed and the treasury can cover it), raises every region's tax rate to
//! the configured cap to fund it, and undoes both once the invasion is over.
//!
//! ```text
//! Idle ──invasion, affordable──▶ WarmingUp ──warm-up done──▶ Active
//!  ▲  ╲                                                      │   │
//!  │   ╲ hazard pay already on                  invasion over│   │player turned it off
//!  │    ▼                                                    │   ▼
//!  │  Suppressed ◀───────────────────────────────────────────┼───┘
//!  │      │ invasion over                                    │
//!  └──────┴──────────────────────────────────────────────────┘
//! ```
//!
//! `Suppressed` keeps hands off hazard pay the player manages themselves until
//! the current invasion ends.

use std::collections::BTreeMap;

use bevy::prelude::*;

use crate::error::HostError;
use crate::host::RegionId;

// =============================================================================
// Constants
// =============================================================================

/// Gold charged when hazard pay is bought.
pub const HAZARD_PAY_ACTIVATION_COST: i64 = 50;

/// Minimum chamber of war staffing required to buy hazard pay.
pub const MIN_ACTIVATION_STAFFING: f32 = 0.95;

/// Whether the host would let the player buy hazard pay right now.
pub fn can_afford_activation(staffing: f32, gold: i64) -> bool {
    staffing >= MIN_ACTIVATION_STAFFING && gold >= HAZARD_PAY_ACTIVATION_COST
}

// =============================================================================
// Host interface
// =============================================================================

/// Everything the hazard pay controller reads from and does to the host.
pub trait HazardPayContext {
    fn hazard_pay_active(&self) -> bool;
    fn hazard_pay_warming_up(&self) -> bool;
    fn invasion_active(&self) -> bool;
    /// Staffing and treasury both allow buying hazard pay.
    fn can_afford_activation(&self) -> bool;
    fn feature_enabled(&self) -> bool;
    /// Tax rate to apply while automated, already held to the host ceiling.
    fn max_tax_rate(&self) -> f32;

    fn owned_regions(&self) -> Vec<RegionId>;
    fn region_tax_rate(&self, region: RegionId) -> Result<f32, HostError>;
    fn set_region_tax_rate(&mut self, region: RegionId, rate: f32) -> Result<(), HostError>;

    fn charge_activation_cost(&mut self) -> Result<(), HostError>;
    fn play_activation_feedback(&mut self);
    fn activate_hazard_pay(&mut self) -> Result<(), HostError>;
    fn deactivate_hazard_pay(&mut self) -> Result<(), HostError>;
    /// Bring the chamber of war toggle in line with the benefit.
    fn sync_ui_toggle(&mut self, is_on: bool);
}

// =============================================================================
// Controller
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HazardPayPhase {
    /// Waiting for an invasion.
    #[default]
    Idle,
    /// Hazard pay bought by automation, benefit still warming up.
    WarmingUp,
    /// Hazard pay bought by automation and in effect.
    Active,
    /// The player is managing hazard pay; wait out the invasion.
    Suppressed,
}

impl HazardPayPhase {
    pub fn label(self) -> &'static str {
        match self {
            HazardPayPhase::Idle => "Idle",
            HazardPayPhase::WarmingUp => "Warming up",
            HazardPayPhase::Active => "Active",
            HazardPayPhase::Suppressed => "Suppressed",
        }
    }
}

/// Hazard pay automation state.
///
/// `saved_tax_rates` holds the pre-invasion rate of every region automation
/// raised. It is only non-empty in `WarmingUp` and `Active`.
#[derive(Resource, Debug, Clone, Default)]
pub struct HazardPayController {
    phase: HazardPayPhase,
    saved_tax_rates: BTreeMap<RegionId, f32>,
}

impl HazardPayController {
    pub fn phase(&self) -> HazardPayPhase {
        self.phase
    }

    pub fn saved_tax_rates(&self) -> &BTreeMap<RegionId, f32> {
        &self.saved_tax_rates
    }

    /// Forget everything without touching the host. Saved rates are dropped,
    /// not restored.
    pub fn reset(&mut self) {
        self.phase = HazardPayPhase::Idle;
        self.saved_tax_rates.clear();
    }

    /// Advance the state machine by one host frame. At most one transition
    /// happens per call.
    pub fn tick(&mut self, ctx: &mut impl HazardPayContext) {
        if !ctx.feature_enabled() {
            // TODO: restore in-flight tax overrides here once the host can tell
            // a settings toggle apart from a save being unloaded.
            self.reset();
            return;
        }

        let next = match self.phase {
            HazardPayPhase::Idle => {
                if !ctx.hazard_pay_active() && ctx.invasion_active() && ctx.can_afford_activation()
                {
                    match self.engage(ctx) {
                        Ok(()) => Some(HazardPayPhase::WarmingUp),
                        Err(e) => {
                            error!("Hazard pay automation: activation failed: {e}");
                            None
                        }
                    }
                } else if ctx.hazard_pay_active() || ctx.hazard_pay_warming_up() {
                    Some(HazardPayPhase::Suppressed)
                } else {
                    None
                }
            }
            HazardPayPhase::WarmingUp => {
                if !ctx.hazard_pay_warming_up() && ctx.hazard_pay_active() {
                    ctx.sync_ui_toggle(true);
                    Some(HazardPayPhase::Active)
                } else {
                    None
                }
            }
            HazardPayPhase::Active => {
                if ctx.hazard_pay_active() && !ctx.invasion_active() {
                    match ctx.deactivate_hazard_pay() {
                        Ok(()) => {
                            ctx.sync_ui_toggle(false);
                            self.restore_tax_rates(ctx);
                            Some(HazardPayPhase::Idle)
                        }
                        Err(e) => {
                            error!("Hazard pay automation: deactivation failed: {e}");
                            None
                        }
                    }
                } else if !ctx.hazard_pay_active() {
                    // Turned off mid-invasion, by the player or by running out of gold.
                    ctx.sync_ui_toggle(false);
                    self.restore_tax_rates(ctx);
                    Some(HazardPayPhase::Suppressed)
                } else {
                    None
                }
            }
            HazardPayPhase::Suppressed => {
                if !ctx.invasion_active() {
                    Some(HazardPayPhase::Idle)
                } else {
                    None
                }
            }
        };

        if let Some(next) = next {
            info!(
                "Hazard pay automation: {} -> {}",
                self.phase.label(),
                next.label()
            );
            self.phase = next;
        }
    }

    /// Buy hazard pay and raise taxes to fund it.
    fn engage(&mut self, ctx: &mut impl HazardPayContext) -> Result<(), HostError> {
        ctx.charge_activation_cost()?;
        ctx.play_activation_feedback();
        ctx.activate_hazard_pay()?;
        // The toggle syncs itself on once the warm-up is over.
        ctx.sync_ui_toggle(false);

        if let Err(e) = self.raise_tax_rates(ctx) {
            self.restore_tax_rates(ctx);
            return Err(e);
        }
        Ok(())
    }

    /// Raise every owned region below the target rate, remembering its old rate.
    fn raise_tax_rates(&mut self, ctx: &mut impl HazardPayContext) -> Result<(), HostError> {
        let target = ctx.max_tax_rate();
        for region in ctx.owned_regions() {
            let rate = ctx.region_tax_rate(region)?;
            if rate < target {
                ctx.set_region_tax_rate(region, target)?;
                self.saved_tax_rates.insert(region, rate);
            }
        }
        debug!(
            "Hazard pay automation: raised {} region(s) to {:.0}%",
            self.saved_tax_rates.len(),
            target * 100.0
        );
        Ok(())
    }

    /// Put every saved rate back and clear the map. A region that can no
    /// longer be restored is logged and skipped.
    fn restore_tax_rates(&mut self, ctx: &mut impl HazardPayContext) {
        for (region, rate) in std::mem::take(&mut self.saved_tax_rates) {
            if let Err(e) = ctx.set_region_tax_rate(region, rate) {
                warn!("Hazard pay automation: could not restore tax rate of region {region}: {e}");
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
