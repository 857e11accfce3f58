mod cache;
mod config;
mod error;
mod logging;
mod marvel;
mod store;
#[cfg(test)]
mod testing;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;

use marvel::types::{Comic, ComicId, Series, SeriesId};
use marvel::{ComicService, MarvelClient, SeriesService};
use store::{FollowStore, UserId};

#[derive(Parser, Debug)]
#[command(name = "comicshelf")]
#[command(about = "Browse weekly Marvel releases and keep track of followed series")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/comicshelf/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List the comics released in the week of a date
  Weekly {
    /// Defaults to today
    #[arg(short, long)]
    date: Option<NaiveDate>,
  },
  /// Show a single comic
  Comic { id: ComicId },
  /// Show a series with all of its comics
  Series {
    id: SeriesId,
    #[arg(short, long, default_value_t = 1)]
    user: UserId,
  },
  /// List the comics of a series in a single request
  SeriesComics { id: SeriesId },
  /// Follow a series
  Follow {
    series_id: SeriesId,
    #[arg(short, long, default_value_t = 1)]
    user: UserId,
  },
  /// Stop following a series
  Unfollow {
    series_id: SeriesId,
    #[arg(short, long, default_value_t = 1)]
    user: UserId,
  },
  /// List followed series
  Following {
    #[arg(short, long, default_value_t = 1)]
    user: UserId,
  },
}

impl Command {
  fn needs_catalog(&self) -> bool {
    matches!(
      self,
      Command::Weekly { .. }
        | Command::Comic { .. }
        | Command::Series { .. }
        | Command::SeriesComics { .. }
    )
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;
  let _log_guard = logging::init(&config.logging)?;

  let catalog = if args.command.needs_catalog() {
    Some(MarvelClient::new(
      &config.marvel,
      config::Config::get_credentials()?,
    )?)
  } else {
    None
  };

  let store = FollowStore::open(&config.store.filename, config.store.flush_interval())?;
  let outcome = run(args.command, catalog.as_ref(), &store).await;

  // Flush even when the command failed
  let closed = store.shutdown().await;
  outcome?;
  closed?;

  Ok(())
}

async fn run<C>(command: Command, catalog: Option<&C>, store: &FollowStore) -> Result<()>
where
  C: ComicService + SeriesService,
{
  let client = || catalog.ok_or_else(|| eyre!("catalog client not configured"));

  match command {
    Command::Weekly { date } => {
      let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
      let page = client()?.weekly_comics(date).await?;
      println!("{} of {} comics for the week of {}", page.count, page.total, date);
      for comic in &page.results {
        print_comic(comic);
      }
    }
    Command::Comic { id } => {
      let comic = client()?.get_comic(id).await?;
      print_comic(&comic);
      println!("  {}", comic.attribution);
    }
    Command::Series { id, user } => {
      let series = client()?.get_series(id).await?;
      print_series(&series, store.is_following(user, id));
    }
    Command::SeriesComics { id } => {
      let comics = client()?.comics_within_series(id).await?;
      for comic in &comics {
        print_comic(comic);
      }
    }
    Command::Follow { series_id, user } => {
      store.follow(user, series_id);
      println!("user {} now follows series {}", user, series_id);
    }
    Command::Unfollow { series_id, user } => {
      store.unfollow(user, series_id);
      println!("user {} no longer follows series {}", user, series_id);
    }
    Command::Following { user } => {
      let followed = store.list_followed(user)?;
      if followed.is_empty() {
        println!("user {} follows no series", user);
      }
      for series_id in followed {
        println!("{}", series_id);
      }
    }
  }

  Ok(())
}

fn print_comic(comic: &Comic) {
  println!(
    "{:>8}  {} #{} [{}] {}",
    comic.id, comic.title, comic.issue_number, comic.format, comic.on_sale_date
  );
}

fn print_series(series: &Series, following: bool) {
  let marker = if following { " (following)" } else { "" };
  println!("{:>8}  {}{}", series.id, series.title, marker);
  if !series.thumbnail_url.is_empty() {
    println!("  {}", series.thumbnail_url);
  }
  for comic in &series.comics {
    print_comic(comic);
  }
  println!("  {}", series.attribution);
}
