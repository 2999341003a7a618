//! Terminal demo driving the users list screen against in-memory data.
//!
//! Commands are read from stdin, one per line:
//! `search <text>`, `filter <name> [values...]`, `clear`, `page <n>`,
//! `size <n>`, `block <id>`, `yes`, `no`, `show`, `url`.

use std::env;
use std::io::{self, BufRead};
use std::rc::Rc;
use std::time::Instant;

use dotenvy::dotenv;
use serde::Serialize;
use serde_json::{Value, json};

use pushkind_console::domain::filter::{FilterDescriptor, FilterOption};
use pushkind_console::domain::row_action::{ActionId, ConfirmPrompt, ListRow, RowActionDescriptor};
use pushkind_console::domain::types::{EntityName, PageSize, TypeConstraintError};
use pushkind_console::forms::list::ListOptionsForm;
use pushkind_console::models::config::ConsoleConfig;
use pushkind_console::repository::errors::RemoteError;
use pushkind_console::repository::memory::{FnMutation, InMemoryQuery};
use pushkind_console::services::list_controller::ListController;
use pushkind_console::services::list_screen::ListScreen;
use pushkind_console::services::surfaces::{ConfirmRequest, ConfirmationSurface, LogFeedback};

#[derive(Clone, Debug, Serialize)]
struct User {
    id: u32,
    name: String,
    email: String,
    status: String,
}

impl ListRow for User {
    type Key = u32;

    fn row_key(&self) -> u32 {
        self.id
    }
}

/// Confirmation dialog rendered as log lines.
struct LogConfirmation;

impl ConfirmationSurface for LogConfirmation {
    fn open(&self, request: ConfirmRequest) {
        log::info!(
            "{}: {} [{} = yes / {} = no]",
            request.title,
            request.content,
            request.confirm_label,
            request.cancel_label
        );
    }

    fn show_error(&self, message: &str) {
        log::warn!("Dialog error: {message}");
    }

    fn close(&self) {
        log::info!("Dialog closed");
    }
}

fn seed_users() -> Vec<User> {
    ["Alice", "Bob", "Carol", "Dave", "Erin", "Frank", "Grace", "Heidi", "Ivan", "Judy", "Mallory", "Niaj"]
        .iter()
        .zip(1..)
        .map(|(name, id)| User {
            id,
            name: name.to_string(),
            email: format!("{}@example.org", name.to_lowercase()),
            status: if id % 5 == 0 { "BLOCKED" } else { "ACTIVE" }.to_string(),
        })
        .collect()
}

fn status_filter() -> Result<FilterDescriptor, TypeConstraintError> {
    FilterDescriptor::multi(
        "status",
        "Status",
        vec![
            FilterOption::new("ACTIVE", "Active"),
            FilterOption::new("BLOCKED", "Blocked"),
        ],
    )
}

fn block_action(users: Rc<InMemoryQuery<User>>) -> RowActionDescriptor<User> {
    let mutation = FnMutation::new(move |variables: Value| {
        let id = variables["id"]
            .as_u64()
            .ok_or_else(|| RemoteError::ValidationError("missing id".to_string()))?;
        users.update_rows(|rows| {
            for row in rows.iter_mut().filter(|row| u64::from(row.id) == id) {
                row.status = "BLOCKED".to_string();
            }
        });
        Ok(())
    });
    RowActionDescriptor::mutation("Block", "lock", mutation, |row: &User| {
        json!({"id": row.id, "status": "BLOCKED"})
    })
    .color("danger")
    .confirm(ConfirmPrompt::new("Block user", "The user will lose access.").labels("Block", "Keep"))
    .visible_when(|row: &User| row.status != "BLOCKED")
    .success_message("User {{ row.name }} was blocked")
    .error_message("Could not block {{ row.name }}")
}

fn print_view(screen: &ListScreen<Rc<InMemoryQuery<User>>>) {
    match serde_json::to_string_pretty(&screen.view()) {
        Ok(view) => println!("{view}"),
        Err(err) => log::error!("Failed to render the list: {err}"),
    }
}

fn main() {
    dotenv().ok(); // Load .env file
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select config profile (defaults to `local`).
    let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".into());

    let config = match ConsoleConfig::load(&app_env) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading console config: {err}");
            std::process::exit(1);
        }
    };
    let settings = config.lists;

    let filters = match status_filter() {
        Ok(filter) => vec![filter],
        Err(err) => {
            log::error!("Invalid filter declaration: {err}");
            std::process::exit(1);
        }
    };

    let initial = env::args().nth(1).unwrap_or_default();
    let options = match ListOptionsForm::parse(&initial, &settings.search_key).and_then(|form| {
        let default_size = PageSize::new(settings.default_page_size)?;
        form.into_options(&filters, default_size)
    }) {
        Ok(options) => options,
        Err(err) => {
            log::error!("Invalid list options {initial:?}: {err}");
            std::process::exit(1);
        }
    };

    let users = Rc::new(
        InMemoryQuery::new(
            seed_users(),
            |row: &User, term: &str| {
                row.name.to_lowercase().contains(term) || row.email.contains(term)
            },
            |row: &User, field: &str| match field {
                "status" => Some(row.status.clone()),
                _ => None,
            },
        )
        .search_key(settings.search_key.clone()),
    );

    let entity = match EntityName::new("users") {
        Ok(entity) => entity,
        Err(err) => {
            log::error!("Invalid entity name: {err}");
            std::process::exit(1);
        }
    };
    let controller = match ListController::builder(entity, users.clone())
        .filters(filters)
        .settings(settings)
        .options(options)
        .build()
    {
        Ok(controller) => controller,
        Err(err) => {
            log::error!("Failed to build the users list: {err}");
            std::process::exit(1);
        }
    };

    let mut screen = ListScreen::new(
        controller,
        vec![block_action(users.clone())],
        Rc::new(LogFeedback),
        Rc::new(LogConfirmation),
    );

    log::info!("Users list ready");
    print_view(&screen);

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                log::error!("Failed to read command: {err}");
                break;
            }
        };
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();
        let controller = screen.controller_mut();

        match command {
            "search" => {
                controller.set_search(rest.join(" "), Instant::now());
                controller.flush_search();
            }
            "filter" => {
                let Some((name, values)) = rest.split_first() else {
                    log::warn!("Usage: filter <name> [values...]");
                    continue;
                };
                if let Err(err) = controller.set_filter_value(name, values.to_vec()) {
                    log::warn!("{err}");
                }
            }
            "clear" => controller.clear_filters(),
            "page" => match rest.first().map(|page| page.parse::<i64>()) {
                Some(Ok(page)) => controller.set_page(page),
                _ => log::warn!("Usage: page <n>"),
            },
            "size" => match rest.first().map(|size| size.parse::<usize>()) {
                Some(Ok(size)) => {
                    if let Err(err) = controller.set_size(size) {
                        log::warn!("{err}");
                    }
                }
                _ => log::warn!("Usage: size <n>"),
            },
            "block" => match rest.first().map(|id| id.parse::<u32>()) {
                Some(Ok(id)) => {
                    let outcome = screen.invoke(&id, ActionId(0));
                    log::info!("Block {id}: {outcome:?}");
                }
                _ => log::warn!("Usage: block <id>"),
            },
            "yes" => {
                let outcome = screen.confirm();
                log::info!("Confirmed: {outcome:?}");
            }
            "no" => {
                let outcome = screen.cancel();
                log::info!("Cancelled: {outcome:?}");
            }
            "url" => match screen.query_string() {
                Ok(query) => println!("?{query}"),
                Err(err) => log::error!("{err}"),
            },
            "show" | "" => {}
            other => {
                log::warn!("Unknown command {other:?}");
                continue;
            }
        }
        print_view(&screen);
    }
}
