use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tokio::sync::mpsc;

use jokers::app::App;
use jokers::config::{Config, URL_ENV};
use jokers::page::markup_text;
use jokers::tui::{self, EventHandler};
use jokers::{handler, logging, ui};
use jokers::{JokeAction, JokeClient, JokeError, JokeWidget, Person, Reply};

#[derive(Parser)]
#[command(name = "jokers")]
#[command(version, about = "Random, personal and custom jokes from a jokers server")]
struct Cli {
    /// Server base URL (overrides JOKERS_URL and the config file)
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds (requests wait indefinitely by default)
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive joke page (default)
    Tui,
    /// Fetch a random joke
    Random {
        /// Print the markup as received
        #[arg(long)]
        raw: bool,
    },
    /// Fetch a joke about the signed-in user
    Personal {
        #[arg(long)]
        raw: bool,
    },
    /// Fetch a joke about someone else
    Custom {
        /// First name
        #[arg(short, long, default_value = "")]
        first: String,
        /// Last name
        #[arg(short, long, default_value = "")]
        last: String,
        #[arg(long)]
        raw: bool,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective values (including --url/--timeout) to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()
        .unwrap_or_else(|e| {
            eprintln!("{}: {}", "Ignoring unreadable config".yellow(), e);
            Config::new()
        })
        .resolve(cli.url, std::env::var(URL_ENV).ok(), cli.timeout);

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_tui(&config).await,
        Commands::Random { raw } => {
            logging::init_stderr()?;
            let client = client_for(&config);
            print_reply(JokeAction::Random, client.random_joke().await, raw)
        }
        Commands::Personal { raw } => {
            logging::init_stderr()?;
            let client = client_for(&config);
            print_reply(JokeAction::Personal, client.personal_joke().await, raw)
        }
        Commands::Custom { first, last, raw } => {
            logging::init_stderr()?;
            let client = client_for(&config);
            let person = Person::new(first, last);
            print_reply(JokeAction::Custom, client.custom_joke(&person).await, raw)
        }
        Commands::Config { save } => show_config(&config, save),
    }
}

fn client_for(config: &Config) -> JokeClient {
    JokeClient::with_timeout(&config.base_url, config.timeout())
}

async fn run_tui(config: &Config) -> Result<()> {
    let log_path = config.log_path()?;
    logging::init_file(&log_path)?;
    tracing::info!(base_url = %config.base_url, "starting joke page");

    let (tx, rx) = mpsc::unbounded_channel();
    let mut app = App::new(JokeWidget::new(client_for(config), tx));
    let mut events = EventHandler::new(rx);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event),
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    tracing::info!(jokes_shown = app.jokes_shown, "joke page closed");
    result
}

fn print_reply(action: JokeAction, outcome: Result<Reply, JokeError>, raw: bool) -> Result<()> {
    let reply = outcome?;

    if !reply.is_ok() {
        println!(
            "{} {} answered {}",
            "✗".red(),
            action.display_name().bold(),
            reply.status.to_string().red()
        );
        return Err(anyhow!(
            "{} joke request returned status {}",
            action.display_name(),
            reply.status
        ));
    }

    if raw {
        println!("{}", reply.body);
        return Ok(());
    }

    println!("{}", format!("{} joke", action.display_name()).bold().cyan());
    let lines = markup_text(&reply.body)
        .map_err(|e| anyhow!("could not render {} joke markup: {e}", action.display_name()))?;
    for line in lines {
        println!("  {}", line);
    }
    Ok(())
}

fn show_config(config: &Config, save: bool) -> Result<()> {
    if save {
        config.save()?;
        println!("{} {}", "✓".green(), "Configuration saved".bold());
    }

    println!("\n{}", "Jokers configuration".bold().blue());
    println!("{}", "=".repeat(30).dimmed());
    println!("  file:     {}", Config::get_config_path()?.display().to_string().dimmed());
    println!("  base_url: {}", config.base_url.green());
    match config.timeout() {
        Some(t) => println!("  timeout:  {}s", t.as_secs()),
        None => println!("  timeout:  {}", "none".dimmed()),
    }
    println!("  log_file: {}", config.log_path()?.display().to_string().dimmed());
    Ok(())
}
