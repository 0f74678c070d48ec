mod app;
mod error;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::App;
use crate::error::AppError;

#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather by city, with favorites")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show current weather for one or more cities
    Weather {
        #[arg(required = true)]
        cities: Vec<String>,
    },
    /// Manage favorite cities
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

#[derive(Debug, Subcommand)]
enum FavoritesCommand {
    /// List favorites with their indices
    List,
    /// Append a city to the favorites
    Add { city: String },
    /// Remove the favorite at INDEX (as shown by `list`)
    Remove { index: usize },
    /// Show current weather for every favorite
    Weather,
}

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let cli = Cli::parse();
    let (config, _) = skycast_core::Config::load_validated()?;
    let mut app = App::new(&config)?;

    tracing::info!("SkyCast started");

    if let Err(e) = run(&mut app, cli.command).await {
        tracing::error!("{}", e);
        eprintln!("{}", e.user_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run(app: &mut App, command: Command) -> Result<(), AppError> {
    match command {
        Command::Weather { cities } => {
            let mut failed = None;
            for city in &cities {
                match app.weather(city).await {
                    Ok(record) => println!("{}", record),
                    Err(e) => {
                        eprintln!("{}: {}", city, e.user_message());
                        failed = Some(e);
                    }
                }
            }
            tracing::debug!(state = ?app.current(), "latest weather state");
            failed.map_or(Ok(()), Err)
        }
        Command::Favorites(FavoritesCommand::List) => {
            if app.favorites().is_empty() {
                println!("No favorites yet.");
            }
            for (index, city) in app.favorites().iter().enumerate() {
                println!("{:>3}  {}", index, city);
            }
            Ok(())
        }
        Command::Favorites(FavoritesCommand::Add { city }) => {
            app.add_favorite(&city)?;
            println!("Added {}", city);
            Ok(())
        }
        Command::Favorites(FavoritesCommand::Remove { index }) => {
            let removed = app.remove_favorite(index)?;
            println!("Removed {}", removed);
            Ok(())
        }
        Command::Favorites(FavoritesCommand::Weather) => {
            for (city, result) in app.favorites_weather().await {
                match result {
                    Ok(record) => println!("{}", record),
                    Err(e) => eprintln!("{}: {}", city, e.user_message()),
                }
            }
            Ok(())
        }
    }
}
