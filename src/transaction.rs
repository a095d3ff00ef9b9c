use crate::locator::MatchPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;

fn default_match_case() -> bool {
    true
}

/// The mutation a change instruction requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    Replace,
    InsertBefore,
    InsertAfter,
    Delete,
    InsertParagraph,
    DeleteParagraph,
}

impl Operation {
    /// Operations that write new text must carry `payload.new_text`.
    pub fn requires_new_text(&self) -> bool {
        matches!(
            self,
            Operation::Replace
                | Operation::InsertBefore
                | Operation::InsertAfter
                | Operation::InsertParagraph
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Replace => "REPLACE",
            Operation::InsertBefore => "INSERT_BEFORE",
            Operation::InsertAfter => "INSERT_AFTER",
            Operation::Delete => "DELETE",
            Operation::InsertParagraph => "INSERT_PARAGRAPH",
            Operation::DeleteParagraph => "DELETE_PARAGRAPH",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Payload {
    #[serde(default)]
    pub new_text: Option<String>,
}

/// One structured change record, consumed read-only by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeInstruction {
    pub change_id: String,
    pub operation: Operation,
    pub target_text: String,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub description: String,
    /// `None` selects the default exact-then-normalized matching chain.
    #[serde(default)]
    pub match_policy: Option<MatchPolicy>,
    #[serde(default = "default_match_case")]
    pub match_case: bool,
    /// Rewrite every occurrence instead of the first. REPLACE and DELETE
    /// only.
    #[serde(default)]
    pub replace_all: bool,
}

impl Default for ChangeInstruction {
    fn default() -> Self {
        Self {
            change_id: String::new(),
            operation: Operation::Replace,
            target_text: String::new(),
            payload: Payload::default(),
            description: String::new(),
            match_policy: None,
            match_case: true,
            replace_all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_instructions_example() {
        let data = r#"
        [
            {
                "change_id": "CHG-001",
                "operation": "REPLACE",
                "target_text": "Chapter 1. DEFINITIONS",
                "payload": { "new_text": "Chapter 1. TERMS" },
                "description": "Rename the definitions chapter"
            },
            {
                "change_id": "CHG-002",
                "operation": "INSERT_AFTER",
                "target_text": "TERMS",
                "payload": { "new_text": " AND INTERPRETATION" }
            },
            {
                "change_id": "CHG-003",
                "operation": "DELETE",
                "target_text": "obsolete clause",
                "replace_all": true,
                "match_case": false
            }
        ]
        "#;

        let instructions: Vec<ChangeInstruction> = serde_json::from_str(data).unwrap();
        assert_eq!(instructions.len(), 3);

        let first = &instructions[0];
        assert_eq!(first.change_id, "CHG-001");
        assert_eq!(first.operation, Operation::Replace);
        assert_eq!(first.payload.new_text.as_deref(), Some("Chapter 1. TERMS"));
        assert!(first.match_case);
        assert!(!first.replace_all);
        assert!(first.match_policy.is_none());

        let second = &instructions[1];
        assert_eq!(second.operation, Operation::InsertAfter);
        assert_eq!(second.description, "");

        let third = &instructions[2];
        assert_eq!(third.operation, Operation::Delete);
        assert!(third.replace_all);
        assert!(!third.match_case);
        assert!(third.payload.new_text.is_none());
    }

    #[test]
    fn instructions_parse_from_yaml_as_well() {
        let data = r#"
- change_id: CHG-010
  operation: DELETE
  target_text: "the removed words"
  match_policy: normalize_whitespace
"#;

        let instructions: Vec<ChangeInstruction> = serde_yaml::from_str(data).unwrap();
        assert_eq!(instructions.len(), 1);
        assert_eq!(
            instructions[0].match_policy,
            Some(MatchPolicy::NormalizeWhitespace)
        );
    }

    #[test]
    fn unknown_operations_are_rejected() {
        let data = r#"[{ "change_id": "CHG-001", "operation": "TRANSMOGRIFY", "target_text": "x" }]"#;
        let result: Result<Vec<ChangeInstruction>, _> = serde_json::from_str(data);
        assert!(result.is_err());
    }

    #[test]
    fn new_text_requirement_follows_the_operation() {
        assert!(Operation::Replace.requires_new_text());
        assert!(Operation::InsertBefore.requires_new_text());
        assert!(Operation::InsertAfter.requires_new_text());
        assert!(Operation::InsertParagraph.requires_new_text());
        assert!(!Operation::Delete.requires_new_text());
        assert!(!Operation::DeleteParagraph.requires_new_text());
    }
}
