use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashMap;
use taskdesk_core::error::TaskError;
use taskdesk_core::model::Priority;

#[derive(Parser, Debug)]
#[command(name = "taskdesk", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskdesk add "Buy milk" "2% from the corner store" --priority high
    Add {
        title: Option<String>,
        description: Option<String>,
        #[arg(long, value_enum, default_value_t)]
        priority: PriorityArg,
    },
    /// Toggle a task between pending and completed
    ///
    /// Example: taskdesk toggle 1
    Toggle {
        id: u64,
    },
    /// Delete a task
    ///
    /// Example: taskdesk delete 1
    Delete {
        id: u64,
    },
    /// List tasks, newest first
    ///
    /// Example: taskdesk list pending
    List {
        /// all, pending or completed; anything else lists everything
        filter: Option<String>,
    },
    /// Show task counts by status
    ///
    /// Example: taskdesk stats
    Stats,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityArg {
    High,
    #[default]
    Medium,
    Low,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::High => Priority::High,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::Low => Priority::Low,
        }
    }
}

/// Splits an interactive line into arguments, honoring double quotes and
/// backslash escapes inside them.
pub fn split_command_line(line: &str) -> Result<Vec<String>, TaskError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() {
                args.push(current.clone());
                current.clear();
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err(TaskError::invalid_input("unterminated quote in command"));
    }

    if !current.is_empty() {
        args.push(current);
    }

    Ok(args)
}

/// Replaces a leading alias token with its configured expansion. The
/// expansion is split like a command line, so an alias can carry arguments.
pub fn expand_alias(
    args: Vec<String>,
    aliases: &HashMap<String, String>,
) -> Result<Vec<String>, TaskError> {
    let Some(first) = args.first() else {
        return Ok(args);
    };
    let Some(replacement) = aliases.get(first) else {
        return Ok(args);
    };

    let mut expanded = split_command_line(replacement)?;
    expanded.extend(args.into_iter().skip(1));
    Ok(expanded)
}
