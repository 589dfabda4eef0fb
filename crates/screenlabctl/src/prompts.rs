//! Interactive stdin prompts.
//!
//! Line-oriented: print a prompt, read a line, re-ask on anything
//! unparseable. Used only by the `run` flow.

use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};

/// Yes/no acknowledgement. Re-asks until the answer is recognizable.
pub fn ask_yes_no(prompt: &str) -> io::Result<bool> {
    loop {
        print!("   {} {} ", prompt, "[y/n]:".bright_magenta());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;

        match input.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("   {}", "Please answer y or n.".dimmed()),
        }
    }
}

/// Numbered menu choice in `1..=max`.
pub fn ask_choice(prompt: &str, max: usize) -> io::Result<usize> {
    loop {
        print!("   {} ", format!("{}:", prompt).bright_magenta());
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().lock().read_line(&mut input)?;

        match input.trim().parse::<usize>() {
            Ok(n) if (1..=max).contains(&n) => return Ok(n),
            _ => println!("   {}", format!("Enter a number from 1 to {}.", max).dimmed()),
        }
    }
}

/// The trial decision: clear the bag or report a threat.
/// Returns true when the participant rejects (reports a threat).
pub fn ask_decision() -> io::Result<bool> {
    println!("   {}  CLEAR BAG", "[1]".cyan());
    println!("   {}  REPORT THREAT", "[2]".cyan());
    Ok(ask_choice("Your decision", 2)? == 2)
}

/// Free-text line with a default shown in the prompt.
pub fn ask_line(prompt: &str, default: &str) -> io::Result<String> {
    print!("   {} {} ", prompt, format!("[{}]:", default).dimmed());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let input = input.trim();

    Ok(if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    })
}
