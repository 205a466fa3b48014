//! Interactive yes/no confirmation.

use std::io::{self, BufRead, Write};

/// Whether `answer` is an affirmative reply (`y` or `yes`, any case).
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Ask `label` on `output` and read one line from `input`.
/// End of input counts as "no".
pub fn confirm<R: BufRead, W: Write>(label: &str, mut input: R, mut output: W) -> io::Result<bool> {
    write!(output, "{label} [y/N]: ")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(false);
    }
    Ok(is_affirmative(&line))
}

/// Confirm on the process's stdin and stderr.
pub fn confirm_stdin(label: &str) -> io::Result<bool> {
    confirm(label, io::stdin().lock(), io::stderr())
}
