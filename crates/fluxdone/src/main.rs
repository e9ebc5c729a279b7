//! CLI entry point for FluxDone.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use fluxdone_app::{FluxConfig, MemoryGateway, TaskMediator};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// To-do lists kept on a FluxDone backend.
#[derive(Parser, Debug)]
#[command(
    name = "fluxdone",
    version,
    about = "fluxdone: manage to-do lists stored behind the FluxDone REST API"
)]
struct Cli {
    /// Directory holding `.fluxdone/config.toml` (defaults to current).
    #[arg(long)]
    dir: Option<String>,

    /// Use built-in sample tasks instead of the REST API.
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks in a category.
    Ls {
        /// `inbox`, `today`, `next7days` or a list name.
        #[arg(short = 'c', long)]
        category: Option<String>,
        /// `custom`, `priority`, `due-date` or `title`.
        #[arg(short = 's', long)]
        sort: Option<String>,
        #[arg(long, value_enum, default_value_t = LsFormat::Table)]
        format: LsFormat,
    },

    /// Add a task.
    Add {
        #[arg(long)]
        title: String,
        /// 1-4 or high/medium/low/none.
        #[arg(short = 'p', long)]
        priority: Option<String>,
        /// Target list; computed categories fall back to the default list.
        #[arg(short = 'l', long)]
        list: Option<String>,
        /// `YYYY-MM-DD` or RFC3339.
        #[arg(long)]
        due: Option<String>,
    },

    /// Toggle a task's completion.
    Done {
        #[arg(long)]
        task: String,
        /// Category to load the task from.
        #[arg(short = 'c', long)]
        category: Option<String>,
    },

    /// Delete a task.
    Rm {
        #[arg(long)]
        task: String,
        /// Category to load the task from.
        #[arg(short = 'c', long)]
        category: Option<String>,
    },

    /// Show incomplete-task counts for inbox, today and the next seven days.
    Counts,
}

/// Output format for `ls`.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum LsFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { dir, demo, cmd } = Cli::parse();
    install_tracing();

    let dir = dir.unwrap_or_else(|| ".".to_owned());
    let config = FluxConfig::load(&dir)?;
    let runtime = tokio::runtime::Runtime::new()?;

    if demo {
        debug!("using in-memory demo gateway");
        let gateway = MemoryGateway::with_demo_data(config.clock().now());
        let mediator = TaskMediator::from_config(gateway, &config);
        runtime.block_on(commands::run(cmd, &mediator, &config))
    } else {
        let store = config.http_store()?;
        debug!(base_url = store.base_url(), "using REST gateway");
        let mediator = TaskMediator::from_config(store, &config);
        runtime.block_on(commands::run(cmd, &mediator, &config))
    }
}

fn install_tracing() {
    // RUST_LOG is honored; INFO by default.
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .compact()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_add_command() {
        let cli = Cli::parse_from([
            "fluxdone",
            "--dir",
            "/tmp",
            "add",
            "--title",
            "Buy milk",
            "--priority",
            "high",
            "--list",
            "shopping",
        ]);

        assert_eq!(cli.dir.as_deref(), Some("/tmp"));
        match cli.cmd {
            Command::Add {
                title,
                priority,
                list,
                due,
            } => {
                assert_eq!(title, "Buy milk");
                assert_eq!(priority.as_deref(), Some("high"));
                assert_eq!(list.as_deref(), Some("shopping"));
                assert!(due.is_none());
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn parse_ls_command_with_defaults() {
        let cli = Cli::parse_from(["fluxdone", "--demo", "ls", "-c", "today"]);
        assert!(cli.demo);
        match cli.cmd {
            Command::Ls {
                category,
                sort,
                format,
            } => {
                assert_eq!(category.as_deref(), Some("today"));
                assert!(sort.is_none());
                assert_eq!(format, LsFormat::Table);
            }
            _ => panic!("expected ls command"),
        }
    }

    #[test]
    fn parse_done_and_rm_commands() {
        let cli = Cli::parse_from(["fluxdone", "done", "--task", "abc"]);
        assert!(matches!(cli.cmd, Command::Done { ref task, category: None } if task == "abc"));

        let cli = Cli::parse_from(["fluxdone", "rm", "--task", "abc", "--category", "work"]);
        match cli.cmd {
            Command::Rm { task, category } => {
                assert_eq!(task, "abc");
                assert_eq!(category.as_deref(), Some("work"));
            }
            _ => panic!("expected rm command"),
        }
    }

    #[test]
    fn parse_counts_command() {
        let cli = Cli::parse_from(["fluxdone", "counts"]);
        assert!(matches!(cli.cmd, Command::Counts));
    }

    #[test]
    fn add_requires_title() {
        assert!(Cli::try_parse_from(["fluxdone", "add"]).is_err());
    }
}
