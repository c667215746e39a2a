use colored::Colorize;
use log::debug;
use text_io::read;

use crate::libquiz::cache::QuestionCache;
use crate::libquiz::fetch::{FetchError, QuestionSource};
use crate::libquiz::question::decode_entities;
use crate::libquiz::session::{Controller, Phase};
use crate::Choice;

const BAR_WIDTH: usize = 40;

/// Drives the whole game from the terminal: question panels while the
/// session is in progress, the error panel with a manual retry, and the
/// completion panel with a restart. Returns when the player quits.
pub async fn run<C: QuestionCache, S: QuestionSource>(controller: &mut Controller<C, S>) {
    loop {
        match controller.session().phase() {
            Phase::InProgress => {
                if !question_round(controller) {
                    return;
                }
            }
            Phase::Completed => {
                if !completion_panel(controller).await {
                    return;
                }
            }
            Phase::Error => {
                if !error_panel(controller).await {
                    return;
                }
            }
            Phase::Loading => return,
        }
    }
}

// One full round: render, take an answer, reveal, advance. False on quit.
fn question_round<C: QuestionCache, S: QuestionSource>(controller: &mut Controller<C, S>) -> bool {
    let (number, total, percent, text, options, correct_answer) = {
        let session = controller.session();
        let Some(question) = session.current_question() else {
            return false;
        };
        (
            session.current_index() + 1,
            session.len(),
            session.progress_percent(),
            question.display_text(),
            session.options().to_vec(),
            question.correct_answer.clone(),
        )
    };

    if number == 1 {
        println!(
            "{}",
            format!("==========> QuizGame ({} questions) <==========", total).cyan()
        );
    }
    print_progress(percent);

    let leading = format!("{}/{}. ", number, total);
    println!("{}{}", leading.cyan(), text.black().bold().on_white());
    let indent = " ".repeat(leading.len());
    for (i, option) in options.iter().enumerate() {
        println!(
            "{}{}. {}",
            indent,
            format!("{}", i + 1).bold(),
            decode_entities(option)
        );
    }

    print!(
        "{} ",
        format!("Answer (1-{}, q to quit prematurely):", options.len()).cyan()
    );
    let choice_string: String = read!("{}\n");
    let choice = Choice::from_str(options.len(), choice_string.as_str());
    debug!("choice: {:?}", choice);

    let answer = match choice {
        Choice::Option(num) => options[num].clone(),
        Choice::Other(raw) => raw,
        Choice::Quit => {
            println!("{}", "Quitting Early!".cyan());
            return false;
        }
    };

    match controller.submit_answer(&answer) {
        Some(true) => {
            let score = controller.session().score();
            println!(
                "{}",
                format!("Correct!: {} -> {}", score - 1, score).bright_green()
            );
        }
        Some(false) => {
            println!("{}", "Incorrect!".bright_red());
            println!(
                "{}",
                format!(
                    "The correct answer was {:?}.",
                    decode_entities(&correct_answer)
                )
                .green()
            );
        }
        None => {}
    }

    controller.advance();
    true
}

async fn error_panel<C: QuestionCache, S: QuestionSource>(
    controller: &mut Controller<C, S>,
) -> bool {
    println!("{}", "No questions available.".bright_red().bold());
    match controller.last_error() {
        Some(FetchError::RateLimited) => println!(
            "{}",
            "The quiz server might be busy (429). Please try again in a minute.".yellow()
        ),
        Some(err) => println!("{}", format!("Fetching questions failed: {}.", err).yellow()),
        None => {}
    }

    print!("{} ", "Retry? (r to retry, anything else quits):".cyan());
    let input: String = read!("{}\n");
    if input.trim() == "r" {
        println!("{}", "Loading questions...".cyan());
        controller.reload().await;
        true
    } else {
        false
    }
}

// Restarting throws the cached batch away, so the next round is freshly
// fetched.
async fn completion_panel<C: QuestionCache, S: QuestionSource>(
    controller: &mut Controller<C, S>,
) -> bool {
    let session = controller.session();
    println!(
        "{}",
        "==========> Quiz Completed! <==========".bright_green().bold()
    );
    println!(
        "You scored {} out of {}.",
        session.score().to_string().bold(),
        session.len()
    );

    print!(
        "{} ",
        "Play again? (r for a fresh batch, anything else quits):".cyan()
    );
    let input: String = read!("{}\n");
    if input.trim() == "r" {
        println!("{}", "Loading questions...".cyan());
        controller.restart().await;
        true
    } else {
        false
    }
}

fn print_progress(percent: u32) {
    let filled = BAR_WIDTH * percent as usize / 100;
    println!(
        "{}{} {}%",
        "█".repeat(filled).green(),
        "░".repeat(BAR_WIDTH - filled).bright_black(),
        percent
    );
}
