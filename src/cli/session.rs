use super::{dashboard, ui};
use crate::controller::{Update, ViewController};
use crate::core::currency::CurrencyCode;
use anyhow::{Result, anyhow};
use std::io;
use std::str::FromStr;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

const HELP: &str = "Commands: amount <n> | from <code> | to <code> | swap | refresh | reload | currencies | help | quit";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionCommand {
    Amount(f64),
    From(CurrencyCode),
    To(CurrencyCode),
    Swap,
    /// New market insight for the current pair.
    Refresh,
    /// Refetch rates for the current base.
    Reload,
    Currencies,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let command = words
            .next()
            .ok_or_else(|| anyhow!("Empty command"))?
            .to_lowercase();
        let argument = words.next();

        let needs_argument = |what: &str| {
            argument.ok_or_else(|| anyhow!("'{command}' expects {what}"))
        };

        match command.as_str() {
            "amount" | "a" => {
                let value = needs_argument("a number")?;
                value
                    .replace(',', "")
                    .parse::<f64>()
                    .map(SessionCommand::Amount)
                    .map_err(|_| anyhow!("Invalid amount: {value}"))
            }
            "from" | "base" => Ok(SessionCommand::From(needs_argument("a currency code")?.parse()?)),
            "to" | "target" => Ok(SessionCommand::To(needs_argument("a currency code")?.parse()?)),
            "swap" | "s" => Ok(SessionCommand::Swap),
            "refresh" | "r" => Ok(SessionCommand::Refresh),
            "reload" => Ok(SessionCommand::Reload),
            "currencies" | "list" => Ok(SessionCommand::Currencies),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            other => Err(anyhow!("Unknown command: {other}")),
        }
    }
}

/// One read from the terminal.
#[derive(Debug, PartialEq)]
enum Input {
    Line(String),
    /// Bytes that were not valid UTF-8; the line is skipped.
    Unreadable(String),
    Closed,
}

fn classify(read: io::Result<Option<String>>) -> Result<Input> {
    match read {
        Ok(Some(line)) => Ok(Input::Line(line)),
        Ok(None) => Ok(Input::Closed),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => Ok(Input::Unreadable(e.to_string())),
        Err(e) => Err(e.into()),
    }
}

fn redraw(controller: &ViewController) {
    let _ = console::Term::stdout().clear_screen();
    println!("{}", dashboard::render(&controller.view()));
    println!("{}", ui::separator());
    println!("{}", ui::style_text(HELP, ui::StyleType::Subtle));
}

fn print_currencies() {
    for code in CurrencyCode::ALL {
        println!("  {}", code.label());
    }
}

/// Applies a command; returns whether the dashboard changed.
fn apply(controller: &mut ViewController, command: SessionCommand) -> bool {
    match command {
        SessionCommand::Amount(amount) => controller.set_amount(amount),
        SessionCommand::From(code) => controller.select_base(code),
        SessionCommand::To(code) => controller.select_target(code),
        SessionCommand::Swap => controller.swap(),
        SessionCommand::Refresh => controller.refresh_insight(),
        SessionCommand::Reload => controller.reload_rates(),
        SessionCommand::Currencies => {
            print_currencies();
            return false;
        }
        SessionCommand::Help => {
            println!("{HELP}");
            return false;
        }
        SessionCommand::Quit => return false,
    }
    true
}

/// Interactive dashboard: reads commands from stdin while responses arrive
/// in the background, redrawing after every change.
pub async fn run(mut controller: ViewController) -> Result<()> {
    controller.mount();
    redraw(&controller);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match classify(line)? {
                    Input::Line(line) => line,
                    Input::Unreadable(reason) => {
                        warn!(%reason, "Skipping unreadable input line");
                        println!(
                            "{}",
                            ui::style_text("Input was not valid UTF-8", ui::StyleType::Error)
                        );
                        continue;
                    }
                    Input::Closed => {
                        debug!("stdin closed, ending session");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(SessionCommand::Quit) => break,
                    Ok(command) => {
                        if apply(&mut controller, command) {
                            redraw(&controller);
                        }
                    }
                    Err(e) => println!("{}", ui::style_text(&e.to_string(), ui::StyleType::Error)),
                }
            }
            Some(update) = controller.next_completion(), if controller.has_pending() => {
                if update != Update::Stale {
                    redraw(&controller);
                }
            }
        }
    }
    Ok(())
}
