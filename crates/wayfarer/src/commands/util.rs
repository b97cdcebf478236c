//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use serde::Deserialize;

use wayfarer_core::Action;
use wayfarer_core::models::Acknowledgement;

use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so the caller must pass `--yes`.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Turn a `success: false` acknowledgement into an error.
pub fn require_ack(ack: &Acknowledgement, action: &str) -> Result<(), CliError> {
    if ack.success {
        return Ok(());
    }
    Err(CliError::NotAcknowledged {
        action: action.into(),
        message: ack
            .message
            .clone()
            .unwrap_or_else(|| "no reason given".into()),
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ActionsFile {
    Bare(Vec<Action>),
    Wrapped { actions: Vec<Action> },
}

/// Read an ordered action batch for `trips customize --from-file`.
///
/// Accepts a bare JSON array or an object with an `actions` array.
pub fn read_actions_file(path: &Path) -> Result<Vec<Action>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    parse_actions(&contents)
}

fn parse_actions(contents: &str) -> Result<Vec<Action>, CliError> {
    let file: ActionsFile = serde_json::from_str(contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid action batch: {e}"),
    })?;
    Ok(match file {
        ActionsFile::Bare(actions) | ActionsFile::Wrapped { actions } => actions,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn actions_bare_or_wrapped() {
        let bare = r#"[
            {"op": "swap", "item_type": "hotel", "item_id": "ht_1", "alternative_id": "ht_2", "reason": null},
            {"op": "remove", "item_type": "activity", "item_id": "act_9", "reason": "too far"}
        ]"#;
        let actions = parse_actions(bare).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].op(), "swap");
        assert_eq!(actions[1].op(), "remove");

        let wrapped = r#"{"actions": [
            {"op": "add", "item_type": "restaurant", "alternative_id": "rs_4", "reason": null}
        ]}"#;
        assert_eq!(parse_actions(wrapped).unwrap()[0].op(), "add");
    }

    #[test]
    fn unknown_op_is_a_validation_error() {
        let err = parse_actions(r#"[{"op": "teleport", "item_type": "hotel"}]"#).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "from-file"));
    }

    #[test]
    fn unacknowledged_cancel_is_an_error() {
        let ack = Acknowledgement {
            success: false,
            message: Some("already released".into()),
        };
        let err = require_ack(&ack, "release").unwrap_err();
        assert_eq!(err.to_string(), "Server did not confirm release: already released");
        assert!(require_ack(&Acknowledgement { success: true, message: None }, "release").is_ok());
    }

    #[test]
    fn confirm_short_circuits_on_yes() {
        assert!(confirm("Cancel booking?", "cancel booking", true).unwrap());
    }
}
