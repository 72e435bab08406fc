#[macro_use]
extern crate log;

use std::env::current_dir;
use std::error::Error;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::process::exit;

use clap::{
    crate_authors, crate_description, crate_version, value_parser, Arg, ArgAction, ArgMatches,
    Command,
};
use tracing_subscriber::EnvFilter;

use writerbuddy::config::Config;
use writerbuddy::state::CursorStore;
use writerbuddy::writer::Writer;
use writerbuddy::Error as WError;

macro_rules! unwrap {
    ($e: expr, $error: expr) => {
        match $e {
            Some(e) => e,
            None => return Err(Box::new($error)),
        }
    };
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        error!("{}", e);
        exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let matches = Command::new("writerbuddy")
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .subcommand_required(true)
        .subcommand(
            Command::new("init")
                .about("Creates a new default writerbuddy project")
                .arg(Arg::new("TITLE").required(false)),
        )
        .subcommand(
            Command::new("write")
                .about("Writes text below what was previously written")
                .arg(
                    Arg::new("TEXT")
                        .help("The texts to write, read line by line from stdin if absent")
                        .num_args(1..)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Where to save the svg document")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("max-words")
                        .long("max-words")
                        .help("Splits texts into chunks of at most this many words")
                        .value_parser(value_parser!(usize)),
                ),
        )
        .subcommand(Command::new("reset").about("Moves the cursor back to the top of the page"))
        .subcommand(Command::new("status").about("Shows where the next line will be written"))
        .get_matches();

    match matches.subcommand() {
        Some(("init", init)) => self::init(init),
        Some(("write", write)) => self::write(write),
        Some(("reset", _)) => reset(),
        Some(("status", _)) => status(),
        _ => Ok(()),
    }
}

fn project_config() -> Result<Config, Box<dyn Error>> {
    let current_dir = unwrap!(current_dir().ok(), WError::CannotReadCurrentDir);
    let path = Config::find(current_dir)?;
    Ok(Config::from_file(path)?)
}

fn init(init: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut current_dir = unwrap!(current_dir().ok(), WError::CannotReadCurrentDir);
    let current_dir_name = current_dir.clone();
    let current_dir_name = unwrap!(current_dir_name.file_name(), WError::CannotReadCurrentDir);
    let current_dir_name = unwrap!(current_dir_name.to_str(), WError::CannotReadCurrentDir);

    let title = match init.get_one::<String>("TITLE") {
        // If a title was given, we will create a directory for the project
        Some(title) => {
            current_dir.push(title);
            title.as_str()
        }

        // If no title was given, use current_dir_name
        None => current_dir_name,
    };

    if Config::init(&current_dir, title)? {
        info!("created project \"{}\"", title);
    }
    Ok(())
}

fn write(write: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let mut config = project_config()?;

    if let Some(max_words) = write.get_one::<usize>("max-words") {
        config.max_words = *max_words;
    }

    let output = match write.get_one::<PathBuf>("output") {
        Some(output) => output.clone(),
        None => config.output_path(),
    };

    let texts: Vec<String> = match write.get_many::<String>("TEXT") {
        Some(texts) => texts.cloned().collect(),
        None => io::stdin().lock().lines().collect::<io::Result<_>>()?,
    };

    let writer = Writer::new(&config)?;
    let mut store = config.cursor_store();
    let report = writer.write(&texts, &output, &mut store)?;

    info!(
        "wrote {} lines ({} glyphs), next line at {:?}",
        report.lines, report.placements, report.cursor
    );
    if report.dropped_lines > 0 {
        warn!("{} lines did not fit on the page", report.dropped_lines);
    }

    Ok(())
}

fn reset() -> Result<(), Box<dyn Error>> {
    let config = project_config()?;
    let mut store = config.cursor_store();
    store.reset()?;

    info!("cursor is back at {:?}", store.load());
    Ok(())
}

fn status() -> Result<(), Box<dyn Error>> {
    let config = project_config()?;
    let store = config.cursor_store();
    let page = &config.page;
    let cursor = store.load();

    // The next write starts over at the top when the cursor is off the page.
    let next = if cursor < page.start_y() || cursor > page.bottom() {
        page.start_y()
    } else {
        cursor
    };
    let remaining = ((page.bottom() - next).0 / page.line_height().0).floor() as usize + 1;

    println!("project:    {}", config.title);
    println!("state:      {}", store.path().display());
    println!("cursor:     {:?}", cursor);
    println!("page:       {:?} x {:?}", page.width, page.height);
    println!("lines left: {}", remaining);
    Ok(())
}
