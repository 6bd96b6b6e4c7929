//! Permission mode decision table (spec §4.10).
//!
//! Prompting UX and enforcement both live in the external orchestrator; this
//! module only provides the pure decision function it consults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    Default,
    AcceptEdits,
    DontAsk,
    Delegate,
    BypassPermissions,
    Plan,
}

impl PermissionMode {
    /// Parse a mode from a config/CLI string (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Some(Self::Default),
            "acceptedits" | "accept_edits" => Some(Self::AcceptEdits),
            "dontask" | "dont_ask" => Some(Self::DontAsk),
            "delegate" => Some(Self::Delegate),
            "bypasspermissions" | "bypass_permissions" => Some(Self::BypassPermissions),
            "plan" => Some(Self::Plan),
            _ => None,
        }
    }

    /// Whether the orchestrator should prompt the user before running `tool_name`.
    pub fn should_prompt(self, tool_name: &str) -> bool {
        match self {
            Self::BypassPermissions | Self::DontAsk | Self::Plan => false,
            Self::AcceptEdits => tool_name == "Bash",
            Self::Default | Self::Delegate => tool_name == "Bash" || tool_name == "Edit",
        }
    }

    /// Whether tool execution is allowed at all. Only `Plan` disables it.
    pub fn allows_tool(self) -> bool {
        self != Self::Plan
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bypass_never_prompts() {
        for tool in ["Bash", "Edit", "Read", "Write"] {
            assert!(!PermissionMode::BypassPermissions.should_prompt(tool));
            assert!(!PermissionMode::DontAsk.should_prompt(tool));
            assert!(!PermissionMode::Plan.should_prompt(tool));
        }
    }

    #[test]
    fn accept_edits_only_prompts_bash() {
        assert!(PermissionMode::AcceptEdits.should_prompt("Bash"));
        assert!(!PermissionMode::AcceptEdits.should_prompt("Edit"));
        assert!(!PermissionMode::AcceptEdits.should_prompt("Read"));
    }

    #[test]
    fn default_and_delegate_prompt_bash_and_edit() {
        for mode in [PermissionMode::Default, PermissionMode::Delegate] {
            assert!(mode.should_prompt("Bash"));
            assert!(mode.should_prompt("Edit"));
            assert!(!mode.should_prompt("Read"));
            assert!(!mode.should_prompt("Write"));
        }
    }

    #[test]
    fn only_plan_disallows_tools() {
        assert!(!PermissionMode::Plan.allows_tool());
        for mode in [
            PermissionMode::Default,
            PermissionMode::AcceptEdits,
            PermissionMode::DontAsk,
            PermissionMode::Delegate,
            PermissionMode::BypassPermissions,
        ] {
            assert!(mode.allows_tool());
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(PermissionMode::parse("BYPASSPERMISSIONS"), Some(PermissionMode::BypassPermissions));
        assert_eq!(PermissionMode::parse("bogus"), None);
    }
}
