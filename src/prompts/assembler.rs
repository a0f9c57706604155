//! Builds the ordered message sequence for a generation stage.
//!
//! Message order is fixed: system prompt, store context, data-source context,
//! styling reference, prior-stage artifact, capability note, instruction. The
//! instruction is always the last user message so that a reference image
//! attached afterwards lands next to it.

use std::sync::Arc;

use crate::core::GenerationContext;
use crate::llm::{ContentPart, Conversation, Message, MessageContent, Role};
use crate::prompts::{PromptError, TemplateStore, fragments};

/// Assembles stage conversations from templates and request context
#[derive(Clone)]
pub struct PromptAssembler {
    store: Arc<dyn TemplateStore>,
}

impl PromptAssembler {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Static prompt body for `name`
    pub async fn load_template(&self, name: &str) -> Result<String, PromptError> {
        self.store.read_template(name).await
    }

    /// Build the messages for one stage. `artifact` is the design plan or
    /// current HTML carried over from an earlier stage.
    pub async fn build_messages(
        &self,
        system_template: &str,
        context: &GenerationContext,
        artifact: Option<&str>,
        instruction: &str,
        capability_note: bool,
    ) -> Result<Conversation, PromptError> {
        let system = self.load_template(system_template).await?;

        let mut conversation = Conversation::new();
        conversation.push(Message::system(system));

        if !context.store_context.trim().is_empty() {
            conversation.push(Message::user(fragments::store_context(&context.store_context)));
        }
        if context.has_data_source_context() {
            conversation.push(Message::user(fragments::data_source_context(
                &context.data_source_context,
            )));
        }
        if let Some(styling) = &context.styling_reference {
            conversation.push(Message::user(fragments::styling_reference(styling)));
        }
        if let Some(artifact) = artifact.filter(|a| !a.trim().is_empty()) {
            conversation.push(Message::user(artifact));
        }
        maybe_add_capability_instruction(&mut conversation, capability_note);
        conversation.push(Message::user(instruction));

        Ok(conversation)
    }
}

/// Attach `image_url` to the conversation.
///
/// When the last message is from the user its content becomes a parts list
/// ending in the image. Otherwise a new user message holding a label and the
/// image is appended. Blank URLs are ignored.
pub fn attach_reference_image(conversation: &mut Conversation, image_url: Option<&str>) {
    let Some(url) = image_url.map(str::trim).filter(|u| !u.is_empty()) else {
        return;
    };

    match conversation.last() {
        Some(last) if last.role == Role::User => {
            let mut message = last.clone();
            let mut parts = match message.content.take() {
                Some(MessageContent::Text(text)) => vec![ContentPart::text(text)],
                Some(MessageContent::Parts(parts)) => parts,
                None => vec![ContentPart::text("(Previous content)")],
            };
            parts.push(ContentPart::image(url));
            message.content = Some(MessageContent::Parts(parts));
            conversation.replace_last(message);
            tracing::info!(url = %url, "Added reference image to last user message");
        }
        _ => {
            conversation.push(Message::user_parts(vec![
                ContentPart::text(fragments::REFERENCE_IMAGE_LABEL),
                ContentPart::image(url),
            ]));
            tracing::info!(url = %url, "Added reference image as a separate message");
        }
    }
}

/// Append the storefront API capability note when `enabled`
pub fn maybe_add_capability_instruction(conversation: &mut Conversation, enabled: bool) {
    if enabled {
        conversation.push(Message::user(fragments::CAPABILITY_NOTE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct MapStore(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl TemplateStore for MapStore {
        async fn read_template(&self, name: &str) -> Result<String, PromptError> {
            self.0
                .get(name)
                .map(|s| s.to_string())
                .ok_or_else(|| PromptError::unavailable(name, "not found"))
        }
    }

    fn assembler() -> PromptAssembler {
        PromptAssembler::new(Arc::new(MapStore(HashMap::from([("sys", "sys-body")]))))
    }

    fn texts(conversation: &Conversation) -> Vec<(Role, String)> {
        conversation
            .messages()
            .iter()
            .map(|m| (m.role, m.text().unwrap_or("<parts>").to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_build_messages_skips_empty_context() {
        let context = GenerationContext {
            store_context: "S".to_string(),
            data_source_context: String::new(),
            styling_reference: None,
        };
        let conversation = assembler()
            .build_messages("sys", &context, None, "DO X", false)
            .await
            .unwrap();

        assert_eq!(
            texts(&conversation),
            vec![
                (Role::System, "sys-body".to_string()),
                (Role::User, "Store Context:\nS".to_string()),
                (Role::User, "DO X".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_build_messages_full_order() {
        let context = GenerationContext {
            store_context: "S".to_string(),
            data_source_context: "D".to_string(),
            styling_reference: Some("cfg".to_string()),
        };
        let conversation = assembler()
            .build_messages(
                "sys",
                &context,
                Some("Technical Design Plan:\nPLAN"),
                "DO X",
                true,
            )
            .await
            .unwrap();

        let texts = texts(&conversation);
        assert_eq!(texts.len(), 7);
        assert_eq!(texts[1].1, "Store Context:\nS");
        assert_eq!(texts[2].1, "Data Source Context:\nD");
        assert!(texts[3].1.starts_with("Styling Reference (for reference only):"));
        assert_eq!(texts[4].1, "Technical Design Plan:\nPLAN");
        assert_eq!(texts[5].1, fragments::CAPABILITY_NOTE);
        assert_eq!(texts[6].1, "DO X");
    }

    #[tokio::test]
    async fn test_missing_template_fails() {
        let result = assembler()
            .build_messages("other", &GenerationContext::default(), None, "DO X", false)
            .await;
        assert!(matches!(result, Err(PromptError::TemplateUnavailable { .. })));
    }

    #[test]
    fn test_attach_image_to_last_user_text_message() {
        let mut conversation =
            Conversation::from_messages(vec![Message::system("sys"), Message::user("DO X")]);
        attach_reference_image(&mut conversation, Some(" https://img.example.com/a.png "));

        assert_eq!(conversation.len(), 2);
        assert_eq!(
            conversation.last().unwrap().content,
            Some(MessageContent::Parts(vec![
                ContentPart::text("DO X"),
                ContentPart::image("https://img.example.com/a.png"),
            ]))
        );
    }

    #[test]
    fn test_attach_image_to_multimodal_message() {
        let mut conversation = Conversation::from_messages(vec![Message::user_parts(vec![
            ContentPart::text("DO X"),
            ContentPart::image("https://img.example.com/first.png"),
        ])]);
        attach_reference_image(&mut conversation, Some("https://img.example.com/second.png"));

        match &conversation.last().unwrap().content {
            Some(MessageContent::Parts(parts)) => {
                assert_eq!(parts.len(), 3);
                assert_eq!(parts[2], ContentPart::image("https://img.example.com/second.png"));
            }
            other => panic!("Expected parts, got {other:?}"),
        }
    }

    #[test]
    fn test_attach_image_after_non_user_message() {
        let mut conversation = Conversation::from_messages(vec![Message::system("sys")]);
        attach_reference_image(&mut conversation, Some("https://img.example.com/a.png"));

        assert_eq!(conversation.len(), 2);
        let last = conversation.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert_eq!(
            last.content,
            Some(MessageContent::Parts(vec![
                ContentPart::text("Reference Image:"),
                ContentPart::image("https://img.example.com/a.png"),
            ]))
        );

        let mut empty = Conversation::new();
        attach_reference_image(&mut empty, Some("https://img.example.com/a.png"));
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn test_blank_image_url_is_ignored() {
        let mut conversation = Conversation::from_messages(vec![Message::user("DO X")]);
        attach_reference_image(&mut conversation, Some("   "));
        attach_reference_image(&mut conversation, None);
        assert_eq!(conversation.last().unwrap().text(), Some("DO X"));
    }

    #[test]
    fn test_capability_instruction_is_additive() {
        let mut conversation = Conversation::from_messages(vec![Message::user("DO X")]);
        maybe_add_capability_instruction(&mut conversation, false);
        assert_eq!(conversation.len(), 1);
        maybe_add_capability_instruction(&mut conversation, true);
        assert_eq!(conversation.len(), 2);
        assert!(conversation.last().unwrap().text().unwrap().contains("/graphql"));
    }
}
