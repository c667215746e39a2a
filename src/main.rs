use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use log::debug;
use std::path::PathBuf;

mod cli;
mod libquiz;

use crate::libquiz::cache::FileCache;
use crate::libquiz::fetch::{self, HttpSource};
use crate::libquiz::session::Controller;

/// What the player typed at the answer prompt: a numbered option, quit, or
/// anything else (recorded verbatim, never scores).
#[derive(Debug, PartialEq)]
enum Choice {
    Option(usize),
    Other(String),
    Quit,
}

impl Choice {
    fn from_str(choices_count: usize, input: &str) -> Choice {
        match input {
            "q" => Choice::Quit,
            input => match input.parse::<usize>() {
                Ok(num) if (1..=choices_count).contains(&num) => Choice::Option(num - 1),
                Ok(_) => {
                    println!(
                        "{}",
                        format!("There are only {} options available!", choices_count)
                            .bright_red()
                    );
                    Choice::Other(input.to_string())
                }
                Err(_) => Choice::Other(input.to_string()),
            },
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "QuizGame")]
#[command(version, about, long_about = None)]
struct Args {
    /// Where the fetched question batch is cached between runs.
    #[arg(short = 'f', long, value_name = "FILE", default_value = "questions.json")]
    cache: PathBuf,
    #[arg(short, long, default_value_t = fetch::DEFAULT_AMOUNT)]
    amount: u32,
    #[arg(long, default_value_t = fetch::DEFAULT_CATEGORY)]
    category: u32,
    #[arg(short, long, default_value = fetch::DEFAULT_DIFFICULTY)]
    difficulty: String,
    #[arg(short, long, default_value = "error")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let cache = FileCache::new(args.cache);
    let source = HttpSource::new(args.amount, args.category, &args.difficulty);
    let mut controller = Controller::new(cache, source);

    println!("{}", "Loading questions...".cyan());
    controller.init().await;
    debug!(
        "[Setup] Init finished in phase {:?}.",
        controller.session().phase()
    );

    cli::run(&mut controller).await;
}
