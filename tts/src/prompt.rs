//! Interactive prompts, generic over the reader and writer.

use std::io::{self, BufRead, Write};

/// Ask whether to go ahead with a run that will create `count` files.
///
/// Only `y` (any case) continues; anything else, including EOF, declines.
pub fn confirm_file_count<R: BufRead, W: Write>(
    count: usize,
    mut input: R,
    mut output: W,
) -> io::Result<bool> {
    write!(
        output,
        "This will create {} files. Are you sure you wish to continue? (y/n): ",
        count
    )?;
    output.flush()?;

    let mut response = String::new();
    input.read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

/// Prompt for an API key and return it trimmed.
pub fn read_api_key<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<String> {
    write!(output, "Please enter your OpenAI API Key: ")?;
    output.flush()?;

    let mut key = String::new();
    input.read_line(&mut key)?;
    Ok(key.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirm(answer: &str) -> (bool, String) {
        let mut output = Vec::new();
        let accepted = confirm_file_count(3, answer.as_bytes(), &mut output).unwrap();
        (accepted, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_confirm_accepts_y() {
        let (accepted, prompt) = confirm("y\n");
        assert!(accepted);
        assert!(prompt.contains("This will create 3 files"));
        assert!(confirm("Y\n").0);
        assert!(confirm("  y  \n").0);
    }

    #[test]
    fn test_confirm_declines_everything_else() {
        assert!(!confirm("n\n").0);
        assert!(!confirm("yes\n").0);
        assert!(!confirm("\n").0);
        assert!(!confirm("").0);
    }

    #[test]
    fn test_read_api_key_trims() {
        let mut output = Vec::new();
        let key = read_api_key("  sk-test-key \n".as_bytes(), &mut output).unwrap();
        assert_eq!(key, "sk-test-key");
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "Please enter your OpenAI API Key: "
        );
    }
}
