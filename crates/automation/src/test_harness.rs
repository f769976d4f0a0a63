//! # TestRealm: headless integration test harness
//!
//! Wraps a `bevy::app::App` running `MinimalPlugins` + `AutomationPlugin`
//! behind a fluent builder, so tests can set up host state, advance fixed
//! ticks and assert on both the host and the controllers.

use std::time::Duration;

use bevy::app::App;
use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use crate::bindings::TowerCommand;
use crate::hazard_pay::HazardPayController;
use crate::host::{
    AutomationFeedback, ChamberOfWar, HazardPay, HazardPayToggle, Invasion, NewGameEvent,
    RegionId, TaxRates, Tower, TowerKind, Treasury, HOST_TICK_MILLIS,
};
use crate::settings::{AutomationSettings, HigherTaxesCapability};
use crate::towers::TowerController;
use crate::AutomationPlugin;

/// A headless realm for integration tests.
///
/// Every [`TestRealm::tick`] advances time by exactly one host step, so each
/// call runs `FixedUpdate` (and therefore both controllers) exactly once.
pub struct TestRealm {
    app: App,
    feedback_cursor: EventCursor<AutomationFeedback>,
    feedback: Vec<AutomationFeedback>,
}

impl TestRealm {
    // -----------------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------------

    /// An empty realm: no gold, no regions, no towers, fully staffed chamber
    /// of war, no invasion.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(AutomationPlugin);
        app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(
            HOST_TICK_MILLIS,
        )));
        app.insert_resource(ChamberOfWar { staffing: 1.0 });

        // First update runs Startup; real time starts counting from here.
        app.update();

        Self {
            app,
            feedback_cursor: EventCursor::default(),
            feedback: Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Realm setup (builder pattern, consumes and returns Self)
    // -----------------------------------------------------------------------

    pub fn with_gold(mut self, gold: i64) -> Self {
        self.app.world_mut().resource_mut::<Treasury>().gold = gold;
        self
    }

    pub fn with_staffing(mut self, staffing: f32) -> Self {
        self.app.world_mut().resource_mut::<ChamberOfWar>().staffing = staffing;
        self
    }

    pub fn with_region(mut self, id: u32, rate: f32) -> Self {
        self.app
            .world_mut()
            .resource_mut::<TaxRates>()
            .claim(RegionId(id), rate);
        self
    }

    pub fn with_tax_cap(mut self, rate: f32) -> Self {
        self.app
            .world_mut()
            .resource_mut::<AutomationSettings>()
            .set_max_hazard_pay_tax_rate(rate);
        self
    }

    pub fn with_higher_taxes(mut self) -> Self {
        self.app
            .world_mut()
            .insert_resource(HigherTaxesCapability(true));
        self
    }

    pub fn with_hazard_pay_automation(mut self, enabled: bool) -> Self {
        self.set_hazard_pay_automation(enabled);
        self
    }

    pub fn with_tower_automation(mut self, enabled: bool) -> Self {
        self.set_tower_automation(enabled);
        self
    }

    // -----------------------------------------------------------------------
    // Host actions
    // -----------------------------------------------------------------------

    /// Build a tower and return its id.
    pub fn build_tower(&mut self, kind: TowerKind, open: bool) -> Entity {
        self.app.world_mut().spawn(Tower::new(kind, open)).id()
    }

    pub fn demolish_tower(&mut self, tower: Entity) {
        self.app.world_mut().despawn(tower);
    }

    pub fn set_tower_open(&mut self, tower: Entity, open: bool) {
        if let Some(mut t) = self.app.world_mut().get_mut::<Tower>(tower) {
            t.open = open;
        }
    }

    pub fn start_raid(&mut self) {
        self.app.world_mut().resource_mut::<Invasion>().raid_in_progress = true;
    }

    pub fn spawn_dragon(&mut self) {
        self.app.world_mut().resource_mut::<Invasion>().dragons += 1;
    }

    /// Kill every dragon and end every raid.
    pub fn end_invasion(&mut self) {
        let mut invasion = self.app.world_mut().resource_mut::<Invasion>();
        invasion.dragons = 0;
        invasion.raid_in_progress = false;
    }

    /// The player switches hazard pay on or off from the chamber of war.
    pub fn player_set_hazard_pay(&mut self, on: bool) {
        let world = self.app.world_mut();
        {
            let mut hazard_pay = world.resource_mut::<HazardPay>();
            if on {
                hazard_pay.activate(true);
            } else {
                hazard_pay.deactivate();
            }
        }
        world.resource_mut::<HazardPayToggle>().is_on = on;
    }

    pub fn set_region_rate(&mut self, id: u32, rate: f32) {
        let mut rates = self.app.world_mut().resource_mut::<TaxRates>();
        if rates.set(RegionId(id), rate).is_err() {
            rates.claim(RegionId(id), rate);
        }
    }

    pub fn lose_region(&mut self, id: u32) {
        self.app
            .world_mut()
            .resource_mut::<TaxRates>()
            .release(RegionId(id));
    }

    pub fn set_hazard_pay_automation(&mut self, enabled: bool) {
        self.app
            .world_mut()
            .resource_mut::<AutomationSettings>()
            .auto_hazard_pay = enabled;
    }

    pub fn set_tower_automation(&mut self, enabled: bool) {
        self.app
            .world_mut()
            .resource_mut::<AutomationSettings>()
            .auto_towers = enabled;
    }

    pub fn new_game(&mut self) {
        self.app.world_mut().send_event(NewGameEvent);
    }

    pub fn send_tower_command(&mut self, command: TowerCommand) {
        self.app.world_mut().send_event(command);
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N host ticks, collecting feedback events as they are produced.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.update();
            let events = self.app.world().resource::<Events<AutomationFeedback>>();
            self.feedback
                .extend(self.feedback_cursor.read(events).copied());
        }
    }

    /// Tick until the hazard-pay warm-up has finished.
    pub fn finish_warmup(&mut self) {
        let ticks = self.hazard_pay().warmup_ticks;
        self.tick(ticks);
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn gold(&self) -> i64 {
        self.resource::<Treasury>().gold
    }

    pub fn region_rate(&self, id: u32) -> f32 {
        self.resource::<TaxRates>()
            .get(RegionId(id))
            .expect("region should be owned")
    }

    pub fn hazard_pay(&self) -> &HazardPay {
        self.resource::<HazardPay>()
    }

    pub fn toggle_is_on(&self) -> bool {
        self.resource::<HazardPayToggle>().is_on
    }

    pub fn hazard_pay_controller(&self) -> &HazardPayController {
        self.resource::<HazardPayController>()
    }

    pub fn tower_controller(&self) -> &TowerController {
        self.resource::<TowerController>()
    }

    pub fn tower_is_open(&self, tower: Entity) -> bool {
        self.app
            .world()
            .get::<Tower>(tower)
            .map(|t| t.open)
            .unwrap_or(false)
    }

    /// Feedback events produced since the last call.
    pub fn take_feedback(&mut self) -> Vec<AutomationFeedback> {
        std::mem::take(&mut self.feedback)
    }
}

impl Default for TestRealm {
    fn default() -> Self {
        Self::new()
    }
}
