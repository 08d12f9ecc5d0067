use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the visible conversation. Serialized exactly as the chat
/// endpoint expects it: `{"role": "user"|"assistant", "content": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(Message::user("Halo")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "Halo"}));
    }

    #[test]
    fn test_system_role_is_not_a_widget_role() {
        let parsed = serde_json::from_value::<Message>(json!({"role": "system", "content": "x"}));
        assert!(parsed.is_err());
    }
}
