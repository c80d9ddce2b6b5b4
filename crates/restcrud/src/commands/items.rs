//! Items command handlers.

use std::fmt::Write as _;

use tabled::Tabled;

use restcrud_api::ResourceId;
use restcrud_core::{
    Item, ItemPatch, ItemService, SortOrder, filter_by_search, sort_by_field, truncate_text,
};

use crate::cli::{GlobalOpts, ItemsArgs, ItemsCommand, ListArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Body")]
    body: String,
    #[tabled(rename = "User")]
    user: String,
}

fn item_row(item: &Item, width: usize) -> ItemRow {
    ItemRow {
        id: item_id(item),
        title: item.title.clone(),
        body: truncate_text(&item.body.replace('\n', " "), width),
        user: item.user_id.map(|id| id.to_string()).unwrap_or_default(),
    }
}

fn item_id(item: &Item) -> String {
    item.id.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn detail(item: &Item) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "ID:      {}", item_id(item));
    let _ = writeln!(out, "Title:   {}", item.title);
    if let Some(user_id) = item.user_id {
        let _ = writeln!(out, "User:    {user_id}");
    }
    let _ = write!(out, "Body:\n{}", item.body);
    out
}

fn print_list(items: &[Item], width: usize, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(&global.output, items, |i| item_row(i, width), item_id)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

fn print_item(item: &Item, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(&global.output, item, detail, item_id)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

/// Print the echoed record, or just confirm when the backend sent none.
fn print_written(
    item: Option<Item>,
    id: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match item {
        Some(item) => print_item(&item, global),
        None => {
            if !global.quiet {
                let msg = format!("✓ Updated item {id}");
                eprintln!("{}", output::success(&msg, &global.color));
            }
            Ok(())
        }
    }
}

fn list_locally(mut items: Vec<Item>, args: &ListArgs) -> Vec<Item> {
    if let Some(ref query) = args.filter {
        items = filter_by_search(&items, query, &[]);
    }
    if let Some(ref field) = args.sort {
        let order = if args.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        };
        sort_by_field(&mut items, field, order);
    }
    items
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    args: ItemsArgs,
    service: &ItemService,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ItemsCommand::List(list) => {
            let spinner = output::spinner("Fetching items", global.quiet);
            let items = service.list().await;
            spinner.finish_and_clear();
            let items = list_locally(items?, &list);
            print_list(&items, list.width, global)
        }

        ItemsCommand::Get { id } => {
            let item = service.get(&ResourceId::from(id.as_str())).await?;
            print_item(&item, global)
        }

        ItemsCommand::Create(fields) => {
            let draft = util::draft_from_args(&fields)?;
            let item = service.create(&draft).await?;
            tracing::info!(id = %item_id(&item), "item created");
            print_item(&item, global)
        }

        ItemsCommand::Update { id, fields } => {
            let draft = util::draft_from_args(&fields)?;
            let item = service
                .update(&ResourceId::from(id.as_str()), &draft)
                .await?;
            print_written(item, &id, global)
        }

        ItemsCommand::Patch {
            id,
            title,
            body,
            user_id,
        } => {
            let patch = ItemPatch {
                title,
                body,
                user_id,
            };
            if patch.is_empty() {
                return Err(CliError::Validation {
                    field: "patch".into(),
                    reason: "give at least one of --title, --body or --user-id".into(),
                });
            }
            let item = service.patch(&ResourceId::from(id.as_str()), &patch).await?;
            print_written(item, &id, global)
        }

        ItemsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete item {id}?"), "items delete", global.yes)? {
                return Ok(());
            }
            service.delete(&ResourceId::from(id.as_str())).await?;
            if !global.quiet {
                let msg = format!("✓ Deleted item {id}");
                eprintln!("{}", output::success(&msg, &global.color));
            }
            Ok(())
        }

        ItemsCommand::Search { query } => {
            let spinner = output::spinner("Searching", global.quiet);
            let items = service.search(&query).await;
            spinner.finish_and_clear();
            print_list(&items?, restcrud_core::listing::DEFAULT_TRUNCATE, global)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, title: &str, body: &str) -> Item {
        Item {
            id: Some(ResourceId::Number(id)),
            title: title.into(),
            body: body.into(),
            user_id: Some(1),
        }
    }

    fn list_args() -> ListArgs {
        ListArgs {
            filter: None,
            sort: None,
            desc: false,
            width: 60,
        }
    }

    #[test]
    fn filter_then_sort() {
        let items = vec![
            item(1, "beta notes", "x"),
            item(2, "gamma", "nothing here"),
            item(3, "alpha notes", "y"),
        ];
        let args = ListArgs {
            filter: Some("NOTES".into()),
            sort: Some("title".into()),
            desc: true,
            ..list_args()
        };

        let titles: Vec<_> = list_locally(items, &args)
            .into_iter()
            .map(|i| i.title)
            .collect();
        assert_eq!(titles, ["beta notes", "alpha notes"]);
    }

    #[test]
    fn rows_truncate_long_bodies() {
        let row = item_row(&item(9, "t", &"word ".repeat(40)), 10);
        assert_eq!(row.id, "9");
        assert_eq!(row.body, "word word...");
    }

    #[test]
    fn detail_lists_every_field() {
        let text = detail(&item(4, "Groceries", "milk"));
        assert!(text.contains("ID:      4"));
        assert!(text.contains("User:    1"));
        assert!(text.ends_with("milk"));
    }
}
