//! State of Emergency settings window.
//!
//! Exposes the two automation toggles, the hazard-pay tax cap slider and the
//! manual open-all / close-all tower buttons, plus a short status readout.
//! Toggled via F10.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use automation::bindings::TowerCommand;
use automation::hazard_pay::HazardPayController;
use automation::host::{HazardPay, Invasion};
use automation::settings::{AutomationSettings, HigherTaxesCapability, TAX_RATE_STEP};
use automation::towers::TowerController;

// =============================================================================
// Resources
// =============================================================================

/// Whether the automation window is visible.
#[derive(Resource)]
pub struct AutomationPanelVisible(pub bool);

impl Default for AutomationPanelVisible {
    fn default() -> Self {
        Self(true)
    }
}

/// Read-only state shown in the status section.
#[derive(bevy::ecs::system::SystemParam)]
pub struct AutomationStatus<'w> {
    pub hazard_pay_controller: Res<'w, HazardPayController>,
    pub tower_controller: Res<'w, TowerController>,
    pub hazard_pay: Res<'w, HazardPay>,
    pub invasion: Res<'w, Invasion>,
}

// =============================================================================
// Systems
// =============================================================================

pub fn automation_panel_keybind(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut visible: ResMut<AutomationPanelVisible>,
    mut contexts: EguiContexts,
) {
    if contexts.ctx_mut().wants_keyboard_input() {
        return;
    }
    if keyboard.just_pressed(KeyCode::F10) {
        visible.0 = !visible.0;
    }
}

pub fn automation_panel_ui(
    mut contexts: EguiContexts,
    mut visible: ResMut<AutomationPanelVisible>,
    mut settings: ResMut<AutomationSettings>,
    capability: Res<HigherTaxesCapability>,
    status: AutomationStatus,
    mut tower_commands: EventWriter<TowerCommand>,
) {
    if !visible.0 {
        return;
    }

    let mut open = true;
    egui::Window::new("State of Emergency")
        .open(&mut open)
        .resizable(false)
        .default_width(300.0)
        .show(contexts.ctx_mut(), |ui| {
            ui.spacing_mut().item_spacing.y = 8.0;

            // --- Hazard pay section ---
            ui.heading("Hazard Pay");
            ui.separator();

            // Write through only on change so the resource isn't flagged every frame.
            let mut auto_hazard_pay = settings.auto_hazard_pay;
            if ui
                .checkbox(&mut auto_hazard_pay, "Auto hazard pay during invasions")
                .changed()
            {
                settings.auto_hazard_pay = auto_hazard_pay;
            }

            ui.horizontal(|ui| {
                ui.label("Tax rate:");
                let ceiling_pct = capability.ceiling() * 100.0;
                let mut tax_pct = (settings.max_hazard_pay_tax_rate * 100.0).min(ceiling_pct);
                if ui
                    .add(
                        egui::Slider::new(&mut tax_pct, 0.0..=ceiling_pct)
                            .step_by(f64::from(TAX_RATE_STEP * 100.0))
                            .suffix("%"),
                    )
                    .changed()
                {
                    settings.set_max_hazard_pay_tax_rate(tax_pct / 100.0);
                }
            });
            if !capability.0 {
                ui.label(
                    egui::RichText::new("Rates above 30% need the Higher Taxes mod.")
                        .small()
                        .color(egui::Color32::from_gray(160)),
                );
            }

            ui.add_space(8.0);

            // --- Towers section ---
            ui.heading("Towers");
            ui.separator();

            let mut auto_towers = settings.auto_towers;
            if ui
                .checkbox(&mut auto_towers, "Auto open/close towers during invasions")
                .changed()
            {
                settings.auto_towers = auto_towers;
            }

            ui.horizontal(|ui| {
                if ui.button("Open all towers").clicked() {
                    tower_commands.send(TowerCommand::OpenAll);
                }
                if ui.button("Close all towers").clicked() {
                    tower_commands.send(TowerCommand::CloseAll);
                }
            });

            ui.add_space(8.0);

            // --- Status section ---
            ui.heading("Status");
            ui.separator();

            let invasion = if status.invasion.in_progress() {
                egui::RichText::new("Invasion in progress").color(egui::Color32::from_rgb(255, 60, 60))
            } else {
                egui::RichText::new("Peaceful").color(egui::Color32::from_rgb(80, 220, 80))
            };
            ui.label(invasion);

            let hazard_pay = if status.hazard_pay.is_warming_up() {
                "warming up"
            } else if status.hazard_pay.active {
                "on"
            } else {
                "off"
            };
            ui.label(format!(
                "Hazard pay: {hazard_pay} (automation: {})",
                status.hazard_pay_controller.phase().label()
            ));
            let overridden = status.hazard_pay_controller.saved_tax_rates().len();
            if overridden > 0 {
                ui.label(format!("Raised taxes in {overridden} region(s)"));
            }
            ui.label(format!(
                "Towers: {} (auto-opened: {})",
                status.tower_controller.phase().label(),
                status.tower_controller.opened_towers().len()
            ));
        });

    if !open {
        visible.0 = false;
    }
}

// =============================================================================
// Plugin
// =============================================================================

pub struct AutomationPanelPlugin;

impl Plugin for AutomationPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AutomationPanelVisible>()
            .add_systems(Update, (automation_panel_keybind, automation_panel_ui));
    }
}
