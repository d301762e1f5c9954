use std::io::Write;
use std::sync::Arc;

use quiz_core::model::{GameSummary, Level};
use services::{Cue, CueError, CuePlayer, GameEngine, GameOutcome, GameSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type Input = Lines<BufReader<Stdin>>;

/// Prints answer feedback in place of sound effects.
pub struct TerminalCues;

impl CuePlayer for TerminalCues {
    fn play(&self, cue: Cue) -> Result<(), CueError> {
        let line = match cue {
            Cue::Correct => "  Correct!",
            Cue::Incorrect => "  Incorrect.",
        };
        let mut out = std::io::stdout().lock();
        writeln!(out, "{line}").map_err(|err| CueError::Playback(err.to_string()))
    }
}

/// Read one trimmed line. `None` on end of input.
async fn read_line(input: &mut Input) -> std::io::Result<Option<String>> {
    Ok(input.next_line().await?.map(|line| line.trim().to_owned()))
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

async fn choose_level(input: &mut Input) -> std::io::Result<Option<Level>> {
    println!("Select Level");
    for level in [Level::Untimed, Level::Timed20, Level::Timed10] {
        println!("  [{}] {}", level.index(), level.label());
    }
    loop {
        prompt("> ");
        let Some(line) = read_line(input).await? else {
            return Ok(None);
        };
        match line.parse::<u8>().ok().and_then(|v| Level::try_from(v).ok()) {
            Some(level) => return Ok(Some(level)),
            None => println!("Please enter 0, 1 or 2."),
        }
    }
}

fn render_question(snapshot: &GameSnapshot) {
    let Some(question) = snapshot.current_question else {
        return;
    };
    println!();
    if let Some(progress) = snapshot.progress_label() {
        println!("{progress}");
    }
    if let Some(secs) = snapshot.time_remaining {
        println!("Time: {secs}s");
    }
    prompt(&format!("{question} "));
}

fn render_results(summary: &GameSummary) {
    let taken = summary.time_taken().num_seconds().max(0);
    println!();
    println!("Results");
    println!("  Your score: {}/{}", summary.score(), summary.total());
    println!("  {}% ({})", summary.percentage(), summary.band().label());
    println!("  Time taken: {}:{:02} mins", taken / 60, taken % 60);
    if summary.level().is_timed() {
        println!("  Time on the clock: {}s", summary.countdown_elapsed_secs());
    }
}

/// Drive one game to completion. Returns `false` if input ended mid-game.
async fn play_one(engine: &GameEngine, input: &mut Input) -> std::io::Result<bool> {
    let mut updates = engine.subscribe();
    let mut shown = updates.borrow_and_update().clone();
    render_question(&shown);

    loop {
        tokio::select! {
            line = read_line(input) => {
                let Some(line) = line? else {
                    engine.quit();
                    return Ok(false);
                };
                // Anything that is not a whole number counts as a wrong answer.
                match engine.submit_answer(line.parse::<i64>().ok()) {
                    GameOutcome::Finished { summary, .. } => {
                        render_results(&summary);
                        return Ok(true);
                    }
                    GameOutcome::Next { .. } | GameOutcome::Ignored => {
                        shown = updates.borrow_and_update().clone();
                        render_question(&shown);
                    }
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(false);
                }
                let current = updates.borrow_and_update().clone();
                if current.questions_answered != shown.questions_answered {
                    println!();
                    println!("  Time's up!");
                    if let Some(summary) = current.summary.as_ref() {
                        render_results(summary);
                        return Ok(true);
                    }
                    render_question(&current);
                } else if let Some(secs @ 1..=3) = current.time_remaining {
                    prompt(&format!("({secs}s) "));
                }
                shown = current;
            }
        }
    }
}

/// Greeting, level choice, and play-again loop.
pub async fn run_games(
    engine: Arc<GameEngine>,
    user_name: &str,
    level: Option<Level>,
) -> std::io::Result<()> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("Hey {user_name},");
    match engine.streak_count() {
        1 => println!("Day 1 of your streak. Come back tomorrow!"),
        n => println!("You're on a {n}-day streak!"),
    }
    println!();

    let level = match level {
        Some(level) => level,
        None => match choose_level(&mut input).await? {
            Some(level) => level,
            None => return Ok(()),
        },
    };

    engine.start(level);
    loop {
        if !play_one(&engine, &mut input).await? {
            return Ok(());
        }

        println!();
        prompt("Play again? [y/N] ");
        match read_line(&mut input).await?.as_deref() {
            Some("y" | "Y" | "yes") => engine.restart(),
            _ => return Ok(()),
        }
    }
}
