//! Console front end: generate a tutorial for one expression and either
//! play it on a console-rendered rule or dump the step list as JSON.

use std::io::Write;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;
use slipstick_engine::{generate_tutorial, Player, TutorialError};
use slipstick_model::{RuleProfile, Step};

mod console;

use console::ConsoleInstrument;

#[derive(Clone, Debug, ValueEnum)]
enum ProfileChoice {
    /// Hemmi Versalog II: A/K squares pair, reciprocal log-log bands.
    VersalogIi,
    /// First-generation Versalog: R1/R2 root scales, up bands only.
    Versalog,
}

impl ProfileChoice {
    fn profile(&self) -> RuleProfile {
        match self {
            ProfileChoice::VersalogIi => RuleProfile::versalog_ii(),
            ProfileChoice::Versalog => RuleProfile::versalog(),
        }
    }
}

#[derive(Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "slipstick")]
#[command(about = "Turn an arithmetic expression into a narrated slide rule tutorial.")]
struct Args {
    /// Expression to work through, e.g. `12*34/5.6`, `sin(30)`, `1.5^3`.
    expression: String,

    /// Rule model to generate steps for.
    #[arg(long, value_enum, default_value_t = ProfileChoice::VersalogIi)]
    profile: ProfileChoice,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Print every cursor and slide motion beneath its narration.
    #[arg(long)]
    motions: bool,
}

#[derive(Debug, Serialize)]
struct JsonTutorial<'a> {
    expression: &'a str,
    profile: &'a str,
    value: f64,
    steps: &'a [Step],
}

fn main() -> Result<()> {
    let args = Args::parse();
    let profile = args.profile.profile();

    let tutorial = match generate_tutorial(&args.expression, &profile) {
        Ok(tutorial) => tutorial,
        Err(error) => {
            eprint!("{}", render_diagnostic(args.expression.trim(), &error));
            std::process::exit(1);
        }
    };

    match args.format {
        OutputFormat::Json => {
            let report = JsonTutorial {
                expression: &tutorial.display,
                profile: profile.name,
                value: tutorial.value,
                steps: &tutorial.steps,
            };
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            serde_json::to_writer(&mut out, &report)?;
            out.write_all(b"\n")?;
        }
        OutputFormat::Text => {
            println!("{} on the {}", tutorial.display, profile.name);
            println!();
            let console = ConsoleInstrument::new(profile.clone(), args.motions);
            let mut player = Player::new(&tutorial.steps, console);
            player.play_all();
            if player.check_passed() == Some(false) {
                eprintln!("warning: the simulated rule missed the expected reading");
                std::process::exit(1);
            }
        }
    }
    Ok(())
}

/// Caret diagnostic against the trimmed input, which is what the error
/// spans index into.
fn render_diagnostic(display: &str, error: &TutorialError) -> String {
    let span = error.span();
    let start = span.start.min(display.len());
    let end = span.end.clamp(start, display.len());
    let lead = display.get(..start).map_or(start, |s| s.chars().count());
    let width = display
        .get(start..end)
        .map_or(end.saturating_sub(start), |s| s.chars().count())
        .max(1);
    format!(
        "error: {}\n  {}\n  {}{}\n",
        error.message(),
        display,
        " ".repeat(lead),
        "^".repeat(width)
    )
}
