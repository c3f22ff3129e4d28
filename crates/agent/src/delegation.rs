//! Delegation marker parsing.
//!
//! Delegation-capable agents hand work to a sub-agent by emitting a line of
//! the form `DELEGATE_TO:<sub_agent_id>:<task>`. The id match is lazy, so the
//! first colon after the id splits the two fields and the task may itself
//! contain colons.

use regex::Regex;
use std::sync::LazyLock;

/// A parsed `DELEGATE_TO` marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DelegationInstruction {
    pub sub_agent_id: String,
    pub task: String,
}

/// Parse the first delegation marker in a response, if any.
pub(crate) fn parse_delegation(output: &str) -> Option<DelegationInstruction> {
    static MARKER: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^\s*DELEGATE_TO:\s*(.+?)\s*:\s*(.+)").unwrap());

    let caps = MARKER.captures(output)?;
    Some(DelegationInstruction {
        sub_agent_id: caps[1].trim().to_string(),
        task: caps[2].trim().to_string(),
    })
}
