use bevy::prelude::*;
use bevy_egui::EguiPlugin;

pub mod automation_panel;
pub mod feedback_ticker;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin).add_plugins((
            automation_panel::AutomationPanelPlugin,
            feedback_ticker::FeedbackTickerPlugin,
        ));
    }
}
