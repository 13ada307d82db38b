use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::warn;
use std::io::{self, BufRead};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskdesk_cli::cli::{Cli, Command, expand_alias, split_command_line};
use taskdesk_core::config::{self, Config, Palette};
use taskdesk_core::error::TaskError;
use taskdesk_core::model::{StatusFilter, Task};
use taskdesk_core::storage::json_store;
use taskdesk_core::store::TaskStore;

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Completed")]
    completed: String,
}

fn task_row(task: &Task, palette: &Palette) -> TaskRow {
    let title = if task.completed {
        palette.mutedize(&task.title)
    } else {
        task.title.clone()
    };
    let description = if task.description.is_empty() {
        "-".to_string()
    } else {
        task.description.clone()
    };

    TaskRow {
        id: task.id,
        done: if task.completed { "x" } else { "" },
        title,
        description,
        priority: palette.paint_priority(task.priority, &task.priority.to_string()),
        created: task.created_date.clone(),
        completed: task.completed_date.clone().unwrap_or_else(|| "-".to_string()),
    }
}

fn print_task_table(tasks: &[Task], palette: &Palette) {
    if tasks.is_empty() {
        println!("No tasks found");
        return;
    }

    let rows: Vec<TaskRow> = tasks.iter().map(|task| task_row(task, palette)).collect();
    let mut table = Table::new(rows);
    table.with(Style::psql());
    println!("{table}");
}

fn task_json(task: &Task) -> serde_json::Value {
    serde_json::json!({
        "id": task.id,
        "title": task.title,
        "description": task.description,
        "priority": task.priority,
        "completed": task.completed,
        "created_date": task.created_date,
        "completed_date": task.completed_date,
    })
}

fn print_tasks_json(tasks: &[Task]) {
    let payload: Vec<serde_json::Value> = tasks.iter().map(task_json).collect();
    println!("{}", serde_json::Value::Array(payload));
}

fn normalize_parse_error(err: clap::Error) -> TaskError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    TaskError::invalid_input(message)
}

fn print_help() {
    let mut cmd = Cli::command();
    let help = cmd.render_help();
    println!("{help}");
}

fn run_command(cli: Cli, store: &mut TaskStore, palette: &Palette) -> Result<(), TaskError> {
    match cli.command {
        Command::Add {
            title,
            description,
            priority,
        } => {
            // The store takes titles as given; blank input stops here.
            let title = match title.as_deref().map(str::trim) {
                Some(value) if !value.is_empty() => value.to_string(),
                _ => return Err(TaskError::invalid_input("title is required")),
            };
            let description = description.as_deref().map(str::trim).unwrap_or_default();

            let task = store.add(&title, description, priority.into())?;
            if cli.json {
                println!("{}", task_json(&task));
            } else {
                println!("Added task: {} (id {})", task.title, task.id);
            }
        }
        Command::Toggle { id } => match store.toggle(id)? {
            Some(task) => {
                if cli.json {
                    println!("{}", task_json(&task));
                } else if task.completed {
                    println!("Completed task: {} (id {})", task.title, task.id);
                } else {
                    println!("Reopened task: {} (id {})", task.title, task.id);
                }
            }
            None => {
                if cli.json {
                    println!("null");
                } else {
                    println!("No task with id {id}");
                }
            }
        },
        Command::Delete { id } => {
            let removed = store.delete(id)?;
            if cli.json {
                println!("{}", serde_json::json!({ "id": id, "deleted": removed }));
            } else if removed == 0 {
                println!("No task with id {id}");
            } else {
                println!("Deleted {removed} task(s) with id {id}");
            }
        }
        Command::List { filter } => {
            let filter = StatusFilter::parse(filter.as_deref().unwrap_or("all"));
            let mut tasks = store.query(filter);
            // Display order only; the store keeps insertion order.
            tasks.sort_by(|a, b| b.created_date.cmp(&a.created_date));

            if cli.json {
                print_tasks_json(&tasks);
            } else {
                print_task_table(&tasks, palette);
            }
        }
        Command::Stats => {
            // Derived view: three queries and their lengths, no dedicated
            // counter in the store.
            let total = store.query(StatusFilter::All).len();
            let completed = store.query(StatusFilter::Completed).len();
            let pending = store.query(StatusFilter::Pending).len();

            if cli.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "total": total,
                        "completed": completed,
                        "pending": pending,
                    })
                );
            } else {
                println!("Total: {total} | Completed: {completed} | Pending: {pending}");
            }
        }
    }

    Ok(())
}

fn run_interactive(
    store: &mut TaskStore,
    config: &Config,
    palette: &Palette,
) -> Result<(), TaskError> {
    let mut input = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();

    loop {
        input.clear();
        let bytes = stdin_lock
            .read_line(&mut input)
            .map_err(|err| TaskError::io(err.to_string()))?;

        if bytes == 0 {
            break;
        }

        let line = input.trim();
        if line.is_empty() {
            continue;
        }

        if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
            break;
        }

        if line == "help" || line == "?" {
            print_help();
            continue;
        }

        let args = match split_command_line(line).and_then(|args| expand_alias(args, &config.aliases))
        {
            Ok(args) => args,
            Err(err) => {
                eprintln!("ERROR: {}", err);
                continue;
            }
        };

        if args.is_empty() {
            continue;
        }

        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("taskdesk".to_string());
        argv.extend(args);

        let cli = match Cli::try_parse_from(argv) {
            Ok(cli) => cli,
            Err(err) => {
                eprintln!("ERROR: {}", normalize_parse_error(err));
                continue;
            }
        };

        // Storage failures are printed and the session keeps going; the
        // in-memory list may run ahead of the file until a save succeeds.
        if let Err(err) = run_command(cli, store, palette) {
            eprintln!("ERROR: {}", err);
        }
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let config_load = config::load_config_with_fallback();
    if let Some(err) = &config_load.error {
        warn!("ignoring configuration: {err}");
    }

    let store_load = TaskStore::open_with_fallback(json_store::store_path());
    if let Some(err) = &store_load.error {
        warn!("task file unreadable, starting with an empty list: {err}");
    }
    let mut store = store_load.store;

    let mut args = std::env::args_os();
    args.next();
    if args.next().is_none() {
        let palette = config::palette_for_theme(config_load.config.theme.as_deref());
        if let Err(err) = run_interactive(&mut store, &config_load.config, &palette) {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
        return;
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print().ok();
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    let overrides = match config::parse_overrides(&cli.config_override) {
        Ok(overrides) => overrides,
        Err(err) => {
            eprintln!("ERROR: {}", err);
            std::process::exit(1);
        }
    };
    let merged = config::merge_overrides(&config_load.config, &overrides);
    let palette = config::palette_for_theme(merged.theme.as_deref());

    if let Err(err) = run_command(cli, &mut store, &palette) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
