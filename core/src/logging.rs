//! # Terminal Logging
//!
//! A [`WriteExplorationLog`] implementation writing (optionally colored) progress lines to the
//! terminal or any other [`WriteColor`] sink.

use std::{fmt, time::Duration};

use anyhow::Context;
use cpu_time::ProcessTime;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::{oracle::OracleResult, OutcomeKind, Phase, WriteExplorationLog};

/// What a [`TermLogger`] writes
#[derive(Clone, Debug, Default)]
pub struct LoggerConfig {
    pub log_oracle_calls: bool,
    pub log_outcomes: bool,
    pub log_phases: bool,
    /// Routines up to this nesting depth are logged
    pub log_routines: usize,
    pub log_messages: bool,
}

impl LoggerConfig {
    /// A configuration logging everything
    pub fn verbose() -> Self {
        LoggerConfig {
            log_oracle_calls: true,
            log_outcomes: true,
            log_phases: true,
            log_routines: usize::MAX,
            log_messages: true,
        }
    }
}

pub struct TermLogger<W> {
    out: W,
    config: LoggerConfig,
    routine_stack: Vec<(&'static str, ProcessTime)>,
}

impl TermLogger<StandardStream> {
    /// Creates a logger writing to stdout. Colors are only used with [`ColorChoice::Auto`] if
    /// stdout is a terminal.
    pub fn stdout(config: LoggerConfig, color: ColorChoice) -> Self {
        let color = match color {
            ColorChoice::Auto => {
                if atty::is(atty::Stream::Stdout) {
                    ColorChoice::Auto
                } else {
                    ColorChoice::Never
                }
            }
            other => other,
        };
        TermLogger::new(StandardStream::stdout(color), config)
    }
}

impl<W: WriteColor> TermLogger<W> {
    pub fn new(out: W, config: LoggerConfig) -> Self {
        TermLogger {
            out,
            config,
            routine_stack: vec![],
        }
    }

    /// Gets the underlying writer back
    pub fn into_inner(self) -> W {
        self.out
    }

    fn tag(&mut self, tag: &str, color: Color) -> std::io::Result<()> {
        self.out.set_color(ColorSpec::new().set_fg(Some(color)))?;
        write!(self.out, "{tag}")?;
        self.out.reset()
    }
}

impl<W: WriteColor> WriteExplorationLog for TermLogger<W> {
    fn log_oracle_call(&mut self, result: &OracleResult) -> anyhow::Result<()> {
        if self.config.log_oracle_calls {
            self.tag("oracle call", Color::Magenta)?;
            writeln!(
                self.out,
                ": result: {}; cpu-time: {}",
                result,
                DurPrinter::new(ProcessTime::now().as_duration()),
            )?;
        }
        Ok(())
    }

    fn log_outcome(&mut self, kind: OutcomeKind, outcome: &[f64]) -> anyhow::Result<()> {
        if self.config.log_outcomes {
            self.tag(&format!("{kind} outcome"), Color::Cyan)?;
            writeln!(
                self.out,
                ": {}; cpu-time: {}",
                VecPrinter::new(outcome),
                DurPrinter::new(ProcessTime::now().as_duration()),
            )?;
        }
        Ok(())
    }

    fn log_phase(&mut self, phase: Phase) -> anyhow::Result<()> {
        if self.config.log_phases {
            self.out
                .set_color(ColorSpec::new().set_bold(true).set_fg(Some(Color::Blue)))?;
            write!(self.out, "phase")?;
            self.out.reset()?;
            writeln!(self.out, ": {phase}")?;
        }
        Ok(())
    }

    fn log_routine_start(&mut self, desc: &'static str) -> anyhow::Result<()> {
        self.routine_stack.push((desc, ProcessTime::now()));

        if self.config.log_routines >= self.routine_stack.len() {
            self.tag(">>> routine start", Color::Green)?;
            writeln!(self.out, ": {desc}")?;
        }
        Ok(())
    }

    fn log_routine_end(&mut self) -> anyhow::Result<()> {
        let (desc, start) = self
            .routine_stack
            .pop()
            .context("routine stack out of sync")?;

        if self.config.log_routines > self.routine_stack.len() {
            let duration = ProcessTime::now().duration_since(start);
            self.tag("<<< routine end", Color::Red)?;
            writeln!(self.out, ": {desc}; duration: {}", DurPrinter::new(duration))?;
        }
        Ok(())
    }

    fn log_end_explore(&mut self) -> anyhow::Result<()> {
        while !self.routine_stack.is_empty() {
            self.log_routine_end()?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn log_message(&mut self, msg: &str) -> anyhow::Result<()> {
        if self.config.log_messages {
            self.tag("message", Color::Yellow)?;
            writeln!(self.out, ": {msg}")?;
        }
        Ok(())
    }
}

struct VecPrinter<'a, C> {
    vals: &'a [C],
}

impl<'a, C> VecPrinter<'a, C> {
    fn new(vals: &'a [C]) -> Self {
        VecPrinter { vals }
    }
}

impl<C: fmt::Display> fmt::Display for VecPrinter<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (idx, val) in self.vals.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{val}")?;
        }
        write!(f, ")")
    }
}

struct DurPrinter {
    dur: Duration,
}

impl DurPrinter {
    fn new(dur: Duration) -> Self {
        Self { dur }
    }
}

impl fmt::Display for DurPrinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.dur)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Seek};

    use termcolor::NoColor;

    use super::{LoggerConfig, TermLogger, VecPrinter};
    use crate::{
        oracle::Explicit, ExplorationConfig, Explorer, Limits, OutcomeKind, Phase,
        WriteExplorationLog,
    };

    #[test]
    fn vec_printer() {
        assert_eq!(format!("{}", VecPrinter::new(&[1., 2.5])), "(1, 2.5)");
        assert_eq!(format!("{}", VecPrinter::<f64>::new(&[])), "()");
    }

    #[test]
    fn filtered_lines() {
        let config = LoggerConfig {
            log_outcomes: true,
            log_routines: 1,
            ..Default::default()
        };
        let mut logger = TermLogger::new(NoColor::new(vec![]), config);
        logger.log_phase(Phase::LexOpt).unwrap();
        logger.log_routine_start("outer").unwrap();
        logger.log_routine_start("inner").unwrap();
        logger.log_outcome(OutcomeKind::Bounded, &[0., 4.]).unwrap();
        logger.log_message("hidden").unwrap();
        logger.log_end_explore().unwrap();
        let text = String::from_utf8(logger.into_inner().into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], ">>> routine start: outer");
        assert!(lines[1].starts_with("bounded outcome: (0, 4); cpu-time: "));
        assert!(lines[2].starts_with("<<< routine end: outer; duration: "));
    }

    #[test]
    fn unbalanced_routine_end() {
        let mut logger = TermLogger::new(NoColor::new(vec![]), LoggerConfig::default());
        assert!(logger.log_routine_end().is_err());
    }

    #[test]
    fn explorer_log_to_file() {
        let file = tempfile::NamedTempFile::new().expect("failed to create temporary file");
        let writer = file.reopen().unwrap();
        let logger = TermLogger::new(NoColor::new(writer), LoggerConfig::verbose());
        let oracle = Explicit::from_outcomes(2, [vec![0., 4.], vec![2., 2.], vec![4., 0.]]);
        let mut explorer = Explorer::new(oracle, ExplorationConfig::default()).unwrap();
        explorer.attach_logger(logger);
        explorer.explore(Limits::none()).unwrap();
        drop(explorer.detach_logger());

        let mut reader = file.reopen().unwrap();
        reader.rewind().unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(text.matches("bounded outcome: ").count(), 2);
        assert_eq!(text.matches("unsupported outcome: ").count(), 1);
        assert!(text.contains("phase: lex-opt"));
        assert!(text.contains("phase: two-proj"));
        assert_eq!(
            text.matches(">>> routine start").count(),
            text.matches("<<< routine end").count()
        );
    }
}
