use std::io::{self, BufRead, Write};

/// Ask `question` until the operator answers yes or no.
///
/// Answers are trimmed and case-insensitive: `y`/`yes` or `n`/`no`. Anything
/// else asks again. End of input counts as no.
pub fn confirm_yes_no<R, W>(input: &mut R, output: &mut W, question: &str) -> io::Result<bool>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let mut line = String::new();
    loop {
        write!(output, "{question} [y/n] ")?;
        output.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(false);
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}
