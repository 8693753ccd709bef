//! Knowledge-grounded assistant responder.
//!
//! One turn = one completion request: a system instruction that embeds the
//! facility knowledge base, followed by the whole conversation so far.
//! Whatever happens, the caller gets exactly one assistant message back.

use std::sync::Arc;

use baymed_config::AppConfig;
use baymed_core::{Credentials, Message, Provider, ProviderRequest};
use tracing::{info, warn};

/// Reply used when no API key is configured. No request is made.
pub const MISSING_CONFIGURATION_REPLY: &str =
    "⚠️ AI 服务尚未配置（缺少 API Key），暂时无法回答。请在环境变量 BAYMED_API_KEY 或配置文件中设置后重试。";

const ROLE_STATEMENT: &str = "你是一名专业的跨境医疗助手，服务粤港澳大湾区用户，帮助他们了解医疗机构以及港澳药械通、长者医疗券等跨境医疗政策。";

const GROUNDING_RULE: &str = "【严格要求】只能根据下面【知识库】中的内容回答；知识库中没有的信息，请直接告知用户“知识库中暂无相关信息”，绝不编造医院、地址、政策或任何数据。";

/// Build the system instruction.
///
/// The knowledge base is cut to its first `max_chars` characters. The cut is
/// not record-aligned: a record straddling the limit is included partially.
pub fn build_system_prompt(knowledge_base: &str, max_chars: usize) -> String {
    format!(
        "{ROLE_STATEMENT}\n{GROUNDING_RULE}\n\n【知识库】\n{}",
        truncate_chars(knowledge_base, max_chars)
    )
}

/// Longest prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

#[derive(Debug, Clone)]
pub struct ResponderSettings {
    pub knowledge_max_chars: usize,
    pub error_excerpt_chars: usize,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl Default for ResponderSettings {
    fn default() -> Self {
        let config = AppConfig::default();
        Self::from_config(&config)
    }
}

impl ResponderSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            knowledge_max_chars: config.assistant.knowledge_max_chars,
            error_excerpt_chars: config.assistant.error_excerpt_chars,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

pub struct AssistantResponder {
    provider: Arc<dyn Provider>,
    settings: ResponderSettings,
}

impl AssistantResponder {
    pub fn new(provider: Arc<dyn Provider>, settings: ResponderSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &ResponderSettings {
        &self.settings
    }

    /// Produce the assistant's reply to `history`. Never fails.
    pub async fn respond(
        &self,
        history: &[Message],
        knowledge_base: &str,
        credentials: Option<&Credentials>,
    ) -> Message {
        let Some(credentials) = credentials else {
            warn!("No completion credentials configured; replying with setup notice");
            return Message::assistant(MISSING_CONFIGURATION_REPLY);
        };

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(build_system_prompt(
            knowledge_base,
            self.settings.knowledge_max_chars,
        )));
        messages.extend(history.iter().cloned());

        let request = ProviderRequest {
            credentials: credentials.clone(),
            messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        match self.provider.complete(request).await {
            Ok(response) => {
                info!(
                    provider = self.provider.name(),
                    model = %response.model,
                    reply_chars = response.message.content.chars().count(),
                    "Assistant reply generated"
                );
                Message::assistant(response.message.content)
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Completion request failed");
                let detail = e.to_string();
                Message::assistant(format!(
                    "抱歉，AI 服务暂时不可用：{}",
                    truncate_chars(&detail, self.settings.error_excerpt_chars)
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StubProvider;
    use baymed_core::{ProviderError, Role};

    fn responder(provider: Arc<StubProvider>) -> AssistantResponder {
        AssistantResponder::new(provider, ResponderSettings::default())
    }

    fn creds() -> Credentials {
        Credentials::new("sk-test", "deepseek-chat")
    }

    #[test]
    fn system_prompt_has_role_rule_and_knowledge() {
        let prompt = build_system_prompt("深圳市人民医院（公立三甲医院）", 1000);
        assert!(prompt.contains("跨境医疗助手"));
        assert!(prompt.contains("绝不编造"));
        assert!(prompt.ends_with("深圳市人民医院（公立三甲医院）"));
    }

    #[test]
    fn knowledge_is_cut_by_characters_not_records() {
        let kb = "甲医院地址一\n乙医院地址二";
        let prompt = build_system_prompt(kb, 8);
        // 8 characters: the second record is split mid-way.
        assert!(prompt.ends_with("甲医院地址一\n乙"));
    }

    #[test]
    fn truncate_is_utf8_safe() {
        assert_eq!(truncate_chars("港澳药械通", 2), "港澳");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn missing_credentials_make_no_call() {
        let stub = Arc::new(StubProvider::new(vec![]));
        let reply = responder(stub.clone())
            .respond(&[Message::user("附近的三甲医院")], "kb", None)
            .await;

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, MISSING_CONFIGURATION_REPLY);
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn sends_system_prompt_then_full_history() {
        let stub = Arc::new(StubProvider::single_text("推荐深圳市人民医院"));
        let history = vec![
            Message::user("你好"),
            Message::assistant("您好！"),
            Message::user("附近的三甲医院"),
        ];

        let reply = responder(stub.clone())
            .respond(&history, "深圳市人民医院（公立三甲医院）", Some(&creds()))
            .await;

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "推荐深圳市人民医院");
        assert_eq!(stub.call_count(), 1);

        let request = &stub.requests()[0];
        assert_eq!(request.credentials.model, "deepseek-chat");
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, Role::System);
        assert!(request.messages[0].content.contains("深圳市人民医院"));
        let roles: Vec<Role> = request.messages[1..].iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    }

    #[tokio::test]
    async fn provider_failure_becomes_one_truncated_reply() {
        let long_message = "x".repeat(1000);
        let stub = Arc::new(StubProvider::failing(ProviderError::ApiError {
            status_code: 500,
            message: long_message,
        }));
        let settings = ResponderSettings {
            error_excerpt_chars: 50,
            ..ResponderSettings::default()
        };

        let reply = AssistantResponder::new(stub.clone(), settings)
            .respond(&[Message::user("hi")], "", Some(&creds()))
            .await;

        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.starts_with("抱歉，AI 服务暂时不可用："));
        let excerpt = reply.content.trim_start_matches("抱歉，AI 服务暂时不可用：");
        assert_eq!(excerpt.chars().count(), 50);
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn network_error_is_surfaced_not_propagated() {
        let stub = Arc::new(StubProvider::failing(ProviderError::Network(
            "connection refused".into(),
        )));
        let reply = responder(stub).respond(&[], "", Some(&creds())).await;
        assert!(reply.content.contains("connection refused"));
    }
}
