//! Short-lived popups for automation feedback.
//!
//! Collects `AutomationFeedback` events ("Open"/"Closed" on towers, the
//! hazard-pay purchase) and shows each one in a small stack near the bottom
//! of the screen for a few seconds.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use automation::host::{AutomationFeedback, Tower};

// =============================================================================
// Constants
// =============================================================================

/// Seconds each popup stays on screen.
pub const POPUP_LIFETIME_SECS: f32 = 3.0;

/// Oldest popups are dropped beyond this many.
pub const MAX_POPUPS: usize = 8;

// =============================================================================
// Resources
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    pub text: String,
    pub positive: bool,
    pub remaining_secs: f32,
}

#[derive(Resource, Debug, Default)]
pub struct FeedbackTicker {
    pub popups: Vec<Popup>,
}

impl FeedbackTicker {
    pub fn push(&mut self, text: String, positive: bool) {
        self.popups.push(Popup {
            text,
            positive,
            remaining_secs: POPUP_LIFETIME_SECS,
        });
        if self.popups.len() > MAX_POPUPS {
            let excess = self.popups.len() - MAX_POPUPS;
            self.popups.drain(..excess);
        }
    }

    /// Age every popup and drop the expired ones.
    pub fn age(&mut self, dt: f32) {
        for popup in &mut self.popups {
            popup.remaining_secs -= dt;
        }
        self.popups.retain(|p| p.remaining_secs > 0.0);
    }
}

// =============================================================================
// Systems
// =============================================================================

pub fn collect_feedback(
    mut events: EventReader<AutomationFeedback>,
    towers: Query<&Tower>,
    mut ticker: ResMut<FeedbackTicker>,
) {
    for event in events.read() {
        match *event {
            AutomationFeedback::HazardPayPurchased { cost } => {
                ticker.push(format!("Hazard pay purchased (-{cost} gold)"), true);
            }
            AutomationFeedback::TowerToggled { tower, open } => {
                let name = towers
                    .get(tower)
                    .map(|t| t.kind.label())
                    .unwrap_or("Tower");
                let state = if open { "Open" } else { "Closed" };
                ticker.push(format!("{name}: {state}"), open);
            }
        }
    }
}

pub fn feedback_ticker_ui(
    mut contexts: EguiContexts,
    mut ticker: ResMut<FeedbackTicker>,
    time: Res<Time>,
) {
    ticker.age(time.delta_secs());
    if ticker.popups.is_empty() {
        return;
    }

    egui::Area::new(egui::Id::new("automation_feedback"))
        .anchor(egui::Align2::LEFT_BOTTOM, egui::vec2(12.0, -12.0))
        .order(egui::Order::Foreground)
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::new()
                .fill(egui::Color32::from_rgba_premultiplied(20, 20, 30, 220))
                .inner_margin(egui::Margin::symmetric(8, 6))
                .show(ui, |ui| {
                    for popup in &ticker.popups {
                        let color = if popup.positive {
                            egui::Color32::from_rgb(80, 220, 80)
                        } else {
                            egui::Color32::from_rgb(255, 165, 0)
                        };
                        // Fade out over the last second.
                        let alpha = popup.remaining_secs.clamp(0.0, 1.0);
                        ui.label(egui::RichText::new(&popup.text).color(color.gamma_multiply(alpha)));
                    }
                });
        });
}

// =============================================================================
// Plugin
// =============================================================================

pub struct FeedbackTickerPlugin;

impl Plugin for FeedbackTickerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FeedbackTicker>()
            .add_systems(Update, (collect_feedback, feedback_ticker_ui).chain());
    }
}
