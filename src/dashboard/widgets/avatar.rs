use super::{WidgetAction, WidgetContent, WidgetSettingsContext, WidgetSettingsUiResult};
use eframe::egui;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEED: &str = "felix";
pub const PLAYGROUND_URL: &str = "https://www.dicebear.com/playground/";
const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/notionists/svg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl Default for AvatarContent {
    fn default() -> Self {
        Self {
            seed: Some(DEFAULT_SEED.into()),
        }
    }
}

impl AvatarContent {
    pub fn effective_seed(&self) -> &str {
        self.seed
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_SEED)
    }

    pub fn avatar_url(&self) -> String {
        format!(
            "{AVATAR_BASE_URL}?seed={}",
            urlencoding::encode(self.effective_seed())
        )
    }
}

pub fn render(ui: &mut egui::Ui, content: &AvatarContent) -> Option<WidgetAction> {
    let mut action = None;
    ui.vertical_centered(|ui| {
        ui.heading(content.effective_seed());
        if ui
            .link("View avatar")
            .on_hover_text(content.avatar_url())
            .clicked()
        {
            action = Some(WidgetAction::OpenUrl(content.avatar_url()));
        }
        if ui
            .small_button("Edit in playground")
            .on_hover_text(PLAYGROUND_URL)
            .clicked()
        {
            action = Some(WidgetAction::OpenUrl(PLAYGROUND_URL.into()));
        }
    });
    action
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Avatar(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut seed = cfg.seed.clone().unwrap_or_default();
    let changed = ui
        .horizontal(|ui| {
            ui.label("Seed");
            ui.text_edit_singleline(&mut seed).changed()
        })
        .inner;
    if changed {
        cfg.seed = (!seed.trim().is_empty()).then_some(seed);
    }
    WidgetSettingsUiResult::changed(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_seed() {
        let content = AvatarContent {
            seed: Some("Jane Doe&co".into()),
        };
        assert_eq!(
            content.avatar_url(),
            "https://api.dicebear.com/7.x/notionists/svg?seed=Jane%20Doe%26co"
        );
    }

    #[test]
    fn blank_seed_falls_back_to_default() {
        let content = AvatarContent {
            seed: Some("  ".into()),
        };
        assert_eq!(content.effective_seed(), DEFAULT_SEED);
        assert_eq!(AvatarContent { seed: None }.effective_seed(), DEFAULT_SEED);
    }
}
