//! `restcrud validate`: run the item form rules without a backend.

use restcrud_core::item_form_rules;

use crate::cli::{GlobalOpts, ItemFormArgs};
use crate::error::{CliError, format_field_errors};
use crate::output;

use super::util;

pub fn handle(args: &ItemFormArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let draft = util::draft_from_args(args)?;
    let rules = item_form_rules();
    let form = draft.to_form();

    let errors = rules.validate(&form);
    tracing::debug!(
        fields = rules.fields().count(),
        invalid = errors.len(),
        "checked item form"
    );
    if !errors.is_empty() {
        return Err(CliError::InvalidItem {
            details: format_field_errors(&errors),
        });
    }

    if !global.quiet {
        eprintln!("{}", output::success("✓ Item is valid", &global.color));
    }
    Ok(())
}
