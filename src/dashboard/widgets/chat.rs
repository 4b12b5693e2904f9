use super::{
    DashboardContext, NoticeKind, WidgetAction, WidgetContent, WidgetSettingsContext,
    WidgetSettingsUiResult,
};
use crate::chat::{build_conversation, spawn_completion, ChatMessage, ChatRole, PendingRequest};
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Per-widget input and in-flight request. Never persisted.
#[derive(Clone, Default)]
struct ChatSession {
    input: String,
    pending: Option<PendingRequest>,
    /// History plus the user turn being sent.
    outgoing: Vec<ChatMessage>,
}

impl ChatSession {
    fn is_sending(&self) -> bool {
        self.pending.is_some()
    }
}

fn session_id(widget_id: &str) -> egui::Id {
    egui::Id::new(("chat_session", widget_id))
}

/// Check the in-flight request and turn its result into an action.
///
/// On success the user turn and the reply are written together. On failure
/// the persisted history is left alone and the input is restored.
fn poll_session(
    widget_id: &str,
    session: &mut ChatSession,
    content: &ChatContent,
) -> Option<WidgetAction> {
    let result = session.pending.as_ref()?.poll()?;
    session.pending = None;
    let outgoing = std::mem::take(&mut session.outgoing);
    match result {
        Ok(reply) => {
            let mut next = content.clone();
            next.messages = outgoing;
            next.messages.push(ChatMessage::assistant(reply));
            Some(WidgetAction::UpdateContent {
                widget_id: widget_id.to_string(),
                content: WidgetContent::Chat(next),
            })
        }
        Err(err) => {
            if let Some(last) = outgoing.last().filter(|m| m.role == ChatRole::User) {
                if session.input.is_empty() {
                    session.input = last.content.clone();
                }
            }
            Some(WidgetAction::Notify {
                kind: NoticeKind::Error,
                text: format!("Chat failed: {err}"),
            })
        }
    }
}

pub fn render(
    ui: &mut egui::Ui,
    widget_id: &str,
    content: &ChatContent,
    ctx: &DashboardContext<'_>,
) -> Option<WidgetAction> {
    if !ctx.settings.chat.is_configured() {
        let mut action = None;
        ui.vertical_centered(|ui| {
            ui.weak("Configure an API key in Settings to use the assistant");
            if ui.button("Open settings").clicked() {
                action = Some(WidgetAction::OpenSettings);
            }
        });
        return action;
    }

    let id = session_id(widget_id);
    let mut session = ui
        .ctx()
        .data(|d| d.get_temp::<ChatSession>(id))
        .unwrap_or_default();
    let action = poll_session(widget_id, &mut session, content);

    if let Some(desc) = content.description.as_deref().filter(|d| !d.is_empty()) {
        ui.weak(desc);
    }
    let input_height = ui.spacing().interact_size.y + 8.0;
    egui::ScrollArea::vertical()
        .max_height((ui.available_height() - input_height).max(0.0))
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            let shown = if session.is_sending() {
                &session.outgoing[..]
            } else {
                &content.messages[..]
            };
            for msg in shown {
                message_bubble(ui, msg);
            }
        });

    ui.horizontal(|ui| {
        let sending = session.is_sending();
        let resp = ui.add_enabled(
            !sending,
            egui::TextEdit::singleline(&mut session.input)
                .hint_text("Type a message...")
                .desired_width(ui.available_width() - 70.0),
        );
        let submitted = resp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let label = if sending { "Sending..." } else { "Send" };
        let clicked = ui.add_enabled(!sending, egui::Button::new(label)).clicked();
        if (submitted || clicked) && !sending && !session.input.trim().is_empty() {
            let text = std::mem::take(&mut session.input);
            let messages =
                build_conversation(content.system_prompt.as_deref(), &content.messages, &text);
            let mut outgoing = content.messages.clone();
            outgoing.push(ChatMessage::user(text));
            session.outgoing = outgoing;
            session.pending = Some(spawn_completion(ctx.settings.chat.clone(), messages));
            tracing::debug!(widget_id, "chat request started");
        }
    });

    if session.is_sending() {
        ui.ctx().request_repaint_after(Duration::from_millis(100));
    }
    if action.is_some() {
        ui.ctx().request_repaint();
    }
    ui.ctx().data_mut(|d| d.insert_temp(id, session));
    action
}

fn message_bubble(ui: &mut egui::Ui, msg: &ChatMessage) {
    let visuals = ui.visuals().clone();
    let (fill, align) = match msg.role {
        ChatRole::User => (visuals.selection.bg_fill, egui::Align::Max),
        ChatRole::Assistant => (visuals.faint_bg_color, egui::Align::Min),
        ChatRole::System => (visuals.extreme_bg_color, egui::Align::Min),
    };
    ui.with_layout(egui::Layout::top_down(align), |ui| {
        egui::Frame::none()
            .fill(fill)
            .rounding(6.0)
            .inner_margin(egui::Margin::symmetric(8.0, 4.0))
            .show(ui, |ui| {
                ui.set_max_width(ui.available_width() * 0.8);
                ui.label(&msg.content);
            });
    });
}

pub fn settings_ui(
    ui: &mut egui::Ui,
    content: &mut WidgetContent,
    _ctx: &WidgetSettingsContext<'_>,
) -> WidgetSettingsUiResult {
    let WidgetContent::Chat(cfg) = content else {
        return WidgetSettingsUiResult::default();
    };
    let mut changed = false;
    let mut prompt = cfg.system_prompt.clone().unwrap_or_default();
    ui.label("System prompt");
    if ui
        .add(egui::TextEdit::multiline(&mut prompt).desired_rows(3))
        .changed()
    {
        cfg.system_prompt = (!prompt.trim().is_empty()).then_some(prompt);
        changed = true;
    }
    ui.horizontal(|ui| {
        ui.label(format!("{} messages", cfg.messages.len()));
        if ui
            .add_enabled(!cfg.messages.is_empty(), egui::Button::new("Clear history"))
            .clicked()
        {
            cfg.messages.clear();
            changed = true;
        }
    });
    WidgetSettingsUiResult::changed(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use serde_json::json;

    fn sending(history: &[ChatMessage], text: &str, result: Result<String, String>) -> ChatSession {
        let mut outgoing = history.to_vec();
        outgoing.push(ChatMessage::user(text));
        ChatSession {
            input: String::new(),
            pending: Some(PendingRequest::ready(result)),
            outgoing,
        }
    }

    #[test]
    fn content_uses_camel_case_prompt() {
        let content: ChatContent = serde_json::from_value(json!({
            "systemPrompt": "be brief",
            "messages": [{ "role": "user", "content": "hi" }]
        }))
        .unwrap();
        assert_eq!(content.system_prompt.as_deref(), Some("be brief"));
        assert_eq!(content.messages, vec![ChatMessage::user("hi")]);
    }

    #[test]
    fn success_writes_user_and_reply_together() {
        let content = ChatContent {
            messages: vec![ChatMessage::user("a"), ChatMessage::assistant("b")],
            ..ChatContent::default()
        };
        let mut session = sending(&content.messages, "c", Ok("d".into()));
        let action = poll_session("w1", &mut session, &content);
        let Some(WidgetAction::UpdateContent { widget_id, content: WidgetContent::Chat(next) }) =
            action
        else {
            panic!("expected content update");
        };
        assert_eq!(widget_id, "w1");
        assert_eq!(
            next.messages,
            vec![
                ChatMessage::user("a"),
                ChatMessage::assistant("b"),
                ChatMessage::user("c"),
                ChatMessage::assistant("d"),
            ]
        );
        assert!(!session.is_sending());
    }

    #[test]
    fn failure_keeps_history_and_restores_input() {
        let content = ChatContent::default();
        let mut session = sending(&[], "hello", Err("timeout".into()));
        let action = poll_session("w1", &mut session, &content);
        assert_eq!(
            action,
            Some(WidgetAction::Notify {
                kind: NoticeKind::Error,
                text: "Chat failed: timeout".into(),
            })
        );
        assert_eq!(session.input, "hello");
        assert!(session.outgoing.is_empty());
    }

    #[test]
    fn nothing_pending_yields_no_action() {
        let mut session = ChatSession::default();
        assert!(poll_session("w1", &mut session, &ChatContent::default()).is_none());
    }

    #[test]
    fn unconfigured_widget_shows_hint() {
        let goals = Vec::new();
        let settings = Settings::default();
        let ctx = DashboardContext::new(&goals, &settings);
        let content = ChatContent::default();
        let mut action = None;
        egui::__run_test_ui(|ui| {
            action = render(ui, "w1", &content, &ctx);
        });
        assert!(action.is_none());
    }
}
