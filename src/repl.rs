//! Interactive loop: one stdin line per submission until EOF or `quit`.

use std::future::Future;
use std::io::{IsTerminal, Write};

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::app::{SmartSearch, Submission};
use crate::gemini::CompletionClient;
use crate::render::{OutputFormat, render};

const GREETING: &str = "Describe your ideal company in plain English, \
e.g. \"Seed-stage AI healthcare companies in Boston\". Type `quit` to exit.";

pub async fn run_repl_loop<C: CompletionClient>(
    app: &SmartSearch<C>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let interactive = std::io::stdin().is_terminal();
    if interactive {
        println!("{GREETING}");
    }
    let mut reader = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if interactive {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(line) = reader.next_line().await? else {
            break;
        };
        if is_quit_command(&line) {
            break;
        }

        match with_thinking_indicator(app.submit(&line)).await {
            Submission::Idle => continue,
            Submission::Completed(report) => println!("{}", render(&report, format)?),
        }
    }

    Ok(())
}

/// Shows "AI is thinking..." on an interactive stderr while `work` runs.
pub async fn with_thinking_indicator<F: Future>(work: F) -> F::Output {
    let show = std::io::stderr().is_terminal();
    if show {
        eprint!("AI is thinking...");
    }
    let output = work.await;
    if show {
        eprint!("\r\x1b[2K");
    }
    output
}

fn is_quit_command(line: &str) -> bool {
    matches!(line.trim(), "quit" | "exit" | "/quit")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_quit_commands() {
        for line in ["quit", "exit", "/quit", "  quit  "] {
            assert!(is_quit_command(line), "{line:?}");
        }
    }

    #[test]
    fn queries_are_not_quit_commands() {
        for line in ["", "quit smoking apps", "exit strategy consultants"] {
            assert!(!is_quit_command(line), "{line:?}");
        }
    }

    #[tokio::test]
    async fn indicator_passes_output_through() {
        assert_eq!(with_thinking_indicator(async { 42 }).await, 42);
    }
}
