//! Interactive export-resolution prompt.

use anyhow::Result;
use std::io::{self, Write};

/// Fixed menu of supported export resolutions.
pub const DPI_CHOICES: [f64; 3] = [50.0, 72.0, 96.0];

/// Prompt for an export resolution on stderr and read the answer from
/// stdin. Returns `None` when the user cancels: on EOF, `q`, or anything
/// that is not one of the choices.
pub fn pick_dpi(default: f64) -> Result<Option<f64>> {
    eprint!("Export resolution [50/72/96] (enter = {default}, q = cancel): ");
    io::stderr().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(match_choice(&input, default))
}

fn match_choice(input: &str, default: f64) -> Option<f64> {
    let input = input.trim();
    if input.is_empty() {
        return Some(default);
    }
    DPI_CHOICES
        .iter()
        .copied()
        .find(|dpi| input == format!("{dpi}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_matching() {
        assert_eq!(match_choice("72\n", 96.0), Some(72.0));
        assert_eq!(match_choice("  50  ", 96.0), Some(50.0));
        assert_eq!(match_choice("\n", 96.0), Some(96.0));
        assert_eq!(match_choice("", 50.0), Some(50.0));
        assert_eq!(match_choice("q\n", 96.0), None);
        assert_eq!(match_choice("300", 96.0), None);
        assert_eq!(match_choice("72.0", 96.0), None);
    }
}
