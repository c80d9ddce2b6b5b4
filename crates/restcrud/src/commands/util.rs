//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;

use restcrud_core::ItemDraft;

use crate::cli::ItemFormArgs;
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, the action is refused rather than assumed.
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

/// Read and parse a JSON file for `--from-file` flags.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "from-file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Build an item draft from flags or `--from-file`.
///
/// Missing flags become empty fields so the form rules can report them.
pub fn draft_from_args(args: &ItemFormArgs) -> Result<ItemDraft, CliError> {
    if let Some(ref path) = args.from_file {
        let value = read_json_file(path)?;
        return serde_json::from_value(value).map_err(|e| CliError::Validation {
            field: "from-file".into(),
            reason: format!("not an item: {e}"),
        });
    }

    Ok(ItemDraft {
        title: args.title.clone().unwrap_or_default(),
        body: args.body.clone().unwrap_or_default(),
        user_id: args.user_id,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args() -> ItemFormArgs {
        ItemFormArgs {
            title: None,
            body: None,
            user_id: None,
            from_file: None,
        }
    }

    #[test]
    fn flags_fill_the_draft() {
        let draft = draft_from_args(&ItemFormArgs {
            title: Some("Groceries".into()),
            user_id: Some(7),
            ..args()
        })
        .unwrap();
        assert_eq!(draft.title, "Groceries");
        assert_eq!(draft.body, "");
        assert_eq!(draft.user_id, Some(7));
    }

    #[test]
    fn file_is_parsed_as_an_item() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"title": "Groceries", "body": "milk, eggs, bread", "userId": 3}}"#).unwrap();

        let draft = draft_from_args(&ItemFormArgs {
            from_file: Some(file.path().to_path_buf()),
            ..args()
        })
        .unwrap();
        assert_eq!(draft, ItemDraft::new("Groceries", "milk, eggs, bread").user_id(3));
    }

    #[test]
    fn bad_json_is_a_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = read_json_file(file.path()).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "from-file"));
    }

    #[test]
    fn yes_flag_skips_the_prompt() {
        assert!(confirm("Delete?", "items delete", true).unwrap());
    }
}
