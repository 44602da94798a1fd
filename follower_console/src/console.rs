use std::io::{self, BufRead, Write};

use follower_core::ControlParams;

use crate::command::{TuningCommand, TuningError, apply, parse};

pub const MENU: &str = "\
0: stop/start robot
k=[number]: set a new gain value
s=[number]: set a new base speed value
min=[number]: set a new minimum speed value
max=[number]: set a new maximum speed value
status: show current values
q: quit
Choose one: ";

/// Why the console stopped reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleExit {
    Quit,
    EndOfInput,
    /// Shutdown was requested elsewhere (signal, control-loop failure).
    Shutdown,
}

/// Serve tuning commands until quit, end of input, or shutdown.
///
/// Quit and end of input both request shutdown on `params`.
pub fn run_console<R, W>(input: &mut R, output: &mut W, params: &ControlParams) -> io::Result<ConsoleExit>
where
    R: BufRead + ?Sized,
    W: Write + ?Sized,
{
    let mut line = String::new();
    loop {
        if params.is_shutdown() {
            return Ok(ConsoleExit::Shutdown);
        }
        output.write_all(MENU.as_bytes())?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            params.request_shutdown();
            tracing::info!("console input closed, shutdown requested");
            return Ok(ConsoleExit::EndOfInput);
        }

        let result = parse(&line).and_then(|cmd| {
            let done = apply(cmd, params)?;
            Ok((cmd, done))
        });
        match result {
            Ok((_, true)) => return Ok(ConsoleExit::Quit),
            Ok((TuningCommand::Status, _)) => {
                let s = params.snapshot();
                writeln!(
                    output,
                    "engaged={} gain={} base={} min={} max={}",
                    s.engaged, s.gain, s.base_speed, s.min_speed, s.max_speed
                )?;
            }
            Ok(_) => {}
            Err(e @ TuningError::InvalidValue { .. }) => {
                tracing::debug!(error = ?e, "rejected console value");
                writeln!(output, "{e}")?;
            }
            // The menu is printed again on the next pass.
            Err(TuningError::Unknown(cmd)) => {
                tracing::debug!(%cmd, "unknown console command");
            }
        }
    }
}
