//! Wires the controllers into the host's frame loop.
//!
//! Each controller sees the host through a `SystemParam` bundle implementing
//! its context trait. The host's frame hook is the `FixedUpdate` schedule and
//! its new-game hook is [`NewGameEvent`].

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::error::HostError;
use crate::hazard_pay::{
    can_afford_activation, HazardPayContext, HazardPayController, HAZARD_PAY_ACTIVATION_COST,
};
use crate::host::{
    AutomationFeedback, ChamberOfWar, HazardPay, HazardPayToggle, Invasion, NewGameEvent,
    RegionId, TaxRates, Tower, Treasury,
};
use crate::settings::{target_tax_rate, AutomationSettings, HigherTaxesCapability};
use crate::towers::{TowerContext, TowerController};

// =============================================================================
// Events
// =============================================================================

/// Manual tower buttons from the settings surface.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TowerCommand {
    OpenAll,
    CloseAll,
}

// =============================================================================
// Hazard pay host
// =============================================================================

/// Host view handed to [`HazardPayController::tick`].
#[derive(SystemParam)]
pub struct HazardPayHost<'w> {
    pub settings: Res<'w, AutomationSettings>,
    pub capability: Res<'w, HigherTaxesCapability>,
    pub invasion: Res<'w, Invasion>,
    pub chamber: Res<'w, ChamberOfWar>,
    pub treasury: ResMut<'w, Treasury>,
    pub hazard_pay: ResMut<'w, HazardPay>,
    pub tax_rates: ResMut<'w, TaxRates>,
    pub toggle: ResMut<'w, HazardPayToggle>,
    pub feedback: EventWriter<'w, AutomationFeedback>,
}

impl HazardPayContext for HazardPayHost<'_> {
    fn hazard_pay_active(&self) -> bool {
        self.hazard_pay.active
    }

    fn hazard_pay_warming_up(&self) -> bool {
        self.hazard_pay.is_warming_up()
    }

    fn invasion_active(&self) -> bool {
        self.invasion.in_progress()
    }

    fn can_afford_activation(&self) -> bool {
        can_afford_activation(self.chamber.staffing, self.treasury.gold)
    }

    fn feature_enabled(&self) -> bool {
        self.settings.auto_hazard_pay
    }

    fn max_tax_rate(&self) -> f32 {
        target_tax_rate(self.settings.max_hazard_pay_tax_rate, *self.capability)
    }

    fn owned_regions(&self) -> Vec<RegionId> {
        self.tax_rates.owned()
    }

    fn region_tax_rate(&self, region: RegionId) -> Result<f32, HostError> {
        self.tax_rates.get(region)
    }

    fn set_region_tax_rate(&mut self, region: RegionId, rate: f32) -> Result<(), HostError> {
        self.tax_rates.set(region, rate)
    }

    fn charge_activation_cost(&mut self) -> Result<(), HostError> {
        self.treasury.spend(HAZARD_PAY_ACTIVATION_COST)
    }

    fn play_activation_feedback(&mut self) {
        self.feedback.send(AutomationFeedback::HazardPayPurchased {
            cost: HAZARD_PAY_ACTIVATION_COST,
        });
    }

    fn activate_hazard_pay(&mut self) -> Result<(), HostError> {
        self.hazard_pay.activate(true);
        Ok(())
    }

    fn deactivate_hazard_pay(&mut self) -> Result<(), HostError> {
        self.hazard_pay.deactivate();
        Ok(())
    }

    fn sync_ui_toggle(&mut self, is_on: bool) {
        if self.toggle.is_on != is_on {
            self.toggle.is_on = is_on;
        }
    }
}

// =============================================================================
// Tower host
// =============================================================================

/// Host view handed to [`TowerController`].
#[derive(SystemParam)]
pub struct TowerHost<'w, 's> {
    pub settings: Res<'w, AutomationSettings>,
    pub invasion: Res<'w, Invasion>,
    pub towers: Query<'w, 's, (Entity, &'static mut Tower)>,
    pub feedback: EventWriter<'w, AutomationFeedback>,
}

impl TowerContext for TowerHost<'_, '_> {
    fn invasion_active(&self) -> bool {
        self.invasion.in_progress()
    }

    fn feature_enabled(&self) -> bool {
        self.settings.auto_towers
    }

    fn controlled_towers(&self) -> Vec<(Entity, bool)> {
        let mut towers: Vec<_> = self
            .towers
            .iter()
            .map(|(entity, tower)| (tower.kind, entity, tower.open))
            .collect();
        // Kind first (archers, ballistae, cauldrons, cannons), then entity id.
        towers.sort_by_key(|&(kind, entity, _)| (kind, entity));
        towers
            .into_iter()
            .map(|(_, entity, open)| (entity, open))
            .collect()
    }

    fn is_tower_open(&self, tower: Entity) -> Result<bool, HostError> {
        self.towers
            .get(tower)
            .map(|(_, t)| t.open)
            .map_err(|_| HostError::TowerMissing(tower))
    }

    fn set_tower_open(&mut self, tower: Entity, open: bool) -> Result<(), HostError> {
        let (_, mut t) = self
            .towers
            .get_mut(tower)
            .map_err(|_| HostError::TowerMissing(tower))?;
        t.open = open;
        Ok(())
    }

    fn show_feedback(&mut self, tower: Entity, open: bool) {
        self.feedback
            .send(AutomationFeedback::TowerToggled { tower, open });
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Clears both controllers when the host loads or starts a game.
pub fn reset_on_new_game(
    mut events: EventReader<NewGameEvent>,
    mut hazard_pay: ResMut<HazardPayController>,
    mut towers: ResMut<TowerController>,
) {
    if events.read().count() == 0 {
        return;
    }
    info!("New game: resetting invasion automation");
    hazard_pay.reset();
    towers.reset();
}

pub fn run_hazard_pay_automation(
    mut controller: ResMut<HazardPayController>,
    mut host: HazardPayHost,
) {
    controller.tick(&mut host);
}

pub fn run_tower_automation(mut controller: ResMut<TowerController>, mut host: TowerHost) {
    controller.tick(&mut host);
}

/// Applies open-all / close-all requests from the settings surface.
pub fn apply_tower_commands(
    mut commands: EventReader<TowerCommand>,
    controller: Res<TowerController>,
    mut host: TowerHost,
) {
    for command in commands.read() {
        match command {
            TowerCommand::OpenAll => controller.open_all(&mut host),
            TowerCommand::CloseAll => controller.close_all(&mut host),
        }
    }
}
