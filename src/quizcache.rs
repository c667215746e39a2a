use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

mod libquiz;

use crate::libquiz::cache::{FileCache, QuestionCache};
use crate::libquiz::fetch::{self, HttpSource, QuestionSource};
use crate::libquiz::question::decode_entities;

#[derive(Parser, Debug)]
#[command(name = "quizcache")]
#[command(version, about = "Inspect and seed the QuizGame question cache.", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, default_value = "info")]
    log_level: String,
    #[arg(short, long, value_name = "FILE", default_value = "questions.json")]
    cache: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a fresh batch from the trivia API and seed the cache with it.
    Fetch {
        #[arg(short, long, default_value_t = fetch::DEFAULT_AMOUNT)]
        amount: u32,
        #[arg(long, default_value_t = fetch::DEFAULT_CATEGORY)]
        category: u32,
        #[arg(short, long, default_value = fetch::DEFAULT_DIFFICULTY)]
        difficulty: String,
    },
    /// Print the cached batch, correct answers first.
    Show,
    /// Delete the cached batch.
    Clear,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(args.log_level)).init();

    let cache = FileCache::new(args.cache.clone());
    match args.command {
        Commands::Fetch {
            amount,
            category,
            difficulty,
        } => {
            info!("{}", format!("Fetching {} questions...", amount).cyan());
            let source = HttpSource::new(amount, category, &difficulty);
            match source.fetch().await {
                Ok(questions) => {
                    cache.save(&questions);
                    info!(
                        "{}",
                        format!("Cached {} questions at {:?}.", questions.len(), args.cache)
                            .green()
                    );
                }
                Err(err) => {
                    error!("{}", format!("Unable to fetch questions: {}!", err).red());
                    std::process::exit(1);
                }
            }
        }
        Commands::Show => match cache.load() {
            Some(questions) => {
                for (idx, question) in questions.iter().enumerate() {
                    println!(
                        "{} {}",
                        format!("{}.", idx + 1).cyan(),
                        decode_entities(&question.text)
                    );
                    println!("   {}", decode_entities(&question.correct_answer).green());
                    for wrong in &question.incorrect_answers {
                        println!("   {}", decode_entities(wrong).red());
                    }
                }
            }
            None => {
                error!("{}", format!("No cached questions at {:?}!", args.cache).red());
                std::process::exit(1);
            }
        },
        Commands::Clear => {
            cache.clear();
            info!("{}", format!("Cleared cache at {:?}.", args.cache).green());
        }
    }
}
