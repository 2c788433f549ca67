use chatkit_llm::Message;
use chatkit_types::ThreadItem;

/// Convert stored thread items, oldest first, into model messages.
///
/// Widgets are shown to the model by their copy text when they have one;
/// hidden context is passed through as user-side text.
pub fn to_agent_input(items: &[ThreadItem]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(items.len());

    for item in items {
        match item {
            ThreadItem::UserMessage(message) => {
                if let Some(quoted) = message.quoted_text.as_deref().filter(|q| !q.is_empty()) {
                    messages.push(Message::human(format!(
                        "The user is referring to this in particular:\n{}",
                        quoted
                    )));
                }
                messages.push(Message::human(message.text()));
            }
            ThreadItem::AssistantMessage(message) => {
                let text = message.text();
                if !text.is_empty() {
                    messages.push(Message::ai(text));
                }
            }
            ThreadItem::Widget(widget) => {
                if let Some(copy_text) = widget.copy_text.as_deref() {
                    messages.push(Message::human(format!(
                        "The following widget was shown to the user:\n{}",
                        copy_text
                    )));
                }
            }
            ThreadItem::HiddenContextItem(hidden) => {
                messages.push(Message::human(hidden.content.clone()));
            }
        }
    }

    messages
}
