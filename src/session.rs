use crate::config::Config;
use crate::demo;
use crate::math::model::{ArityError, DivisionByZero, Fraction, Model, ModelKind};
use crate::math::parsefmt::{self, CoefficientPolicy, InputError};
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::{debug, info, trace};

const MENU: &str = "\
choose a mode:
1 - simple fraction 1/(a*x)
2 - continued fraction 1/(a1*x + 1/(a2*x + 1/(a3*x)))
3 - demo evaluations
q - exit
";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("io: {0}")]
    Io(#[from] io::Error),
    #[error("input closed")]
    InputClosed,
    // coefficient count read from the menu disagrees with the model
    #[error(transparent)]
    Coefficients(#[from] ArityError),
}

/// How the session behaves, resolved from the config file and command line.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub decimal_places: Option<u32>,
    pub policy: CoefficientPolicy,
    pub color: bool,
    pub once: bool,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            decimal_places: config.decimal_places,
            policy: CoefficientPolicy::from_reject_zero(config.reject_zero_coefficients),
            color: config.color,
            once: false,
        }
    }
}

// console dialogue over any line source and sink
pub struct Session<R, W> {
    input: R,
    output: W,
    pub settings: Settings,
    pub exiting: bool,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, settings: Settings) -> Self {
        Self { input, output, settings, exiting: false }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn run(&mut self) -> Result<(), SessionError> {
        writeln!(self.output, "fractions: 1/(a*x) and 1/(a1*x + 1/(a2*x + 1/(a3*x)))")?;
        while !self.exiting {
            self.prompt(MENU)?;
            self.prompt("your choice: ")?;
            let line = match self.read_line()? {
                Some(line) => line,
                None => break,
            };
            self.execute_selection(line.trim())?;
            if self.settings.once {
                self.exiting = true;
            }
        }
        Ok(())
    }

    pub fn execute_selection(&mut self, selection: &str) -> Result<(), SessionError> {
        debug!(selection, "menu selection");
        match selection {
            "1" | "s" | "simple" => self.run_model(ModelKind::Simple)?,
            "2" | "c" | "continued" => self.run_model(ModelKind::Continued)?,
            "3" | "d" | "demo" => self.run_demo()?,
            "0" | "q" | "quit" | "exit" => self.exiting = true,
            "" => {
                // a one-shot run has nothing left to do
                if self.settings.once {
                    self.print_error("no mode selected")?;
                    self.exiting = true;
                }
            },
            _ => {
                self.print_error(&format!("unknown selection `{selection}`"))?;
                if self.settings.once {
                    self.exiting = true;
                }
            },
        }
        Ok(())
    }

    /// Reads coefficients for `kind`, then evaluates at points until an empty
    /// line (or a single point in one-shot mode).
    pub fn run_model(&mut self, kind: ModelKind) -> Result<(), SessionError> {
        let model = self.configure(kind)?;
        writeln!(self.output, "{}", model.describe())?;
        loop {
            let x = match self.read_point()? {
                Some(x) => x,
                None => break,
            };
            let result = model.evaluate(x);
            self.report(&model, x, result)?;
            if self.settings.once {
                break;
            }
        }
        Ok(())
    }

    pub fn configure(&mut self, kind: ModelKind) -> Result<Model, SessionError> {
        let policy = self.settings.policy;
        let header = match policy {
            CoefficientPolicy::Eager => "enter the coefficients (none may be zero):",
            CoefficientPolicy::Deferred => "enter the coefficients:",
        };
        writeln!(self.output, "{header}")?;
        let mut coefficients = Vec::with_capacity(kind.coefficient_names().len());
        for name in kind.coefficient_names() {
            let value = self.read_with(&format!("{name} = "), |s| parsefmt::parse_coefficient(s, policy))?;
            coefficients.push(value);
        }
        let mut model = Model::default_for(kind);
        model.initialize(&coefficients)?;
        info!(%model, "model configured");
        Ok(model)
    }

    pub fn run_demo(&mut self) -> Result<(), SessionError> {
        for case in demo::battery() {
            let result = case.model.evaluate(case.x);
            write!(self.output, "{}: ", case.model)?;
            self.report(&case.model, case.x, result)?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn report(&mut self, model: &Model, x: f64, result: Result<f64, DivisionByZero>) -> Result<(), SessionError> {
        let x = parsefmt::fmt_value(x, None);
        match result {
            Ok(value) => {
                trace!(%model, x = %x, value, "evaluated");
                let value = parsefmt::fmt_value(value, self.settings.decimal_places);
                writeln!(self.output, "value at x = {x}: {value}")?;
            },
            Err(e) => {
                debug!(%model, x = %x, stage = ?e.stage, "division by zero");
                self.print_error(&format!("at x = {x}: {e}"))?;
            },
        }
        Ok(())
    }

    // None means the user left the evaluation loop
    fn read_point(&mut self) -> Result<Option<f64>, SessionError> {
        let once = self.settings.once;
        let prompt = if once {
            "x = "
        } else {
            "x (empty line to go back) = "
        };
        self.read_with(prompt, |s| match parsefmt::parse_real(s) {
            Err(InputError::Empty) if !once => Ok(None),
            r => r.map(Some),
        })
    }

    fn read_with<T>(&mut self, prompt: &str, parse: impl Fn(&str) -> Result<T, InputError>) -> Result<T, SessionError> {
        loop {
            self.prompt(prompt)?;
            let line = self.read_line()?.ok_or(SessionError::InputClosed)?;
            match parse(&line) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    trace!(line = %line.trim(), error = %e, "rejected input");
                    self.print_error(&format!("invalid value: {e}, try again"))?;
                },
            }
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, SessionError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn prompt(&mut self, text: &str) -> Result<(), SessionError> {
        write!(self.output, "{text}")?;
        self.output.flush()?;
        Ok(())
    }

    fn print_error(&mut self, message: &str) -> Result<(), SessionError> {
        if self.settings.color {
            queue!(
                self.output,
                SetForegroundColor(Color::Red),
                Print(format!("error: {message}")),
                ResetColor,
                Print("\n"),
            )?;
        } else {
            writeln!(self.output, "error: {message}")?;
        }
        self.output.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn settings(once: bool) -> Settings {
        Settings {
            decimal_places: None,
            policy: CoefficientPolicy::Eager,
            color: false,
            once,
        }
    }

    fn run_script(script: &str, settings: Settings) -> (Result<(), SessionError>, String) {
        let mut session = Session::new(Cursor::new(script.as_bytes()), Vec::new(), settings);
        let result = session.run();
        let output = String::from_utf8(session.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn one_shot_simple_fraction() {
        let (result, output) = run_script("1\n2\n4\n", settings(true));
        assert!(result.is_ok());
        assert!(output.contains("fraction: 1/(a*x), a = 2"));
        assert!(output.contains("value at x = 4: 0.125"));
    }

    #[test]
    fn interactive_continued_fraction_recovers_from_zero_denominator() {
        let mut s = settings(false);
        s.decimal_places = Some(4);
        let (result, output) = run_script("2\n1\n2\n3\n1\n0\n\nq\n", s);
        assert!(result.is_ok());
        assert!(output.contains("a1 = 1, a2 = 2, a3 = 3"));
        assert!(output.contains("value at x = 1: 0.7000"));
        assert!(output.contains("error: at x = 0: innermost denominator a3*x is zero"));
        // menu shown again after the empty line
        assert_eq!(output.matches("your choice: ").count(), 2);
    }

    #[test]
    fn bad_coefficients_are_prompted_again() {
        let (result, output) = run_script("1\nabc\n0\n2,0\n4\n", settings(true));
        assert!(result.is_ok());
        assert!(output.contains("`abc` is not a number"));
        assert!(output.contains("value must not be zero"));
        assert!(output.contains("value at x = 4: 0.125"));
        assert_eq!(output.matches("a = ").count(), 4);
    }

    #[test]
    fn deferred_policy_leaves_zero_to_evaluation() {
        let mut s = settings(true);
        s.policy = CoefficientPolicy::Deferred;
        let (result, output) = run_script("1\n0\n5\n", s);
        assert!(result.is_ok());
        assert!(output.contains("error: at x = 5: single-level denominator a*x is zero"));
    }

    #[test]
    fn one_shot_point_is_prompted_again() {
        let mut s = settings(true);
        s.decimal_places = Some(6);
        let (result, output) = run_script("1\n1\n\nx\n0,001\n", s);
        assert!(result.is_ok());
        assert!(output.contains("no value entered"));
        assert!(output.contains("`x` is not a number"));
        assert!(output.contains("value at x = 0.001: 1000.000000"));
    }

    #[test]
    fn closed_input_ends_session_with_error() {
        let (result, _) = run_script("2\n1\n", settings(false));
        assert!(matches!(result, Err(SessionError::InputClosed)));
    }

    #[test]
    fn closed_input_at_menu_is_a_clean_exit() {
        let (result, _) = run_script("", settings(false));
        assert!(result.is_ok());
    }

    #[test]
    fn unknown_selection() {
        let (result, output) = run_script("7\n", settings(true));
        assert!(result.is_ok());
        assert!(output.contains("unknown selection `7`"));

        let (result, output) = run_script("7\nquit\n", settings(false));
        assert!(result.is_ok());
        assert_eq!(output.matches("your choice: ").count(), 2);
    }

    #[test]
    fn empty_selection() {
        let (result, output) = run_script("\n1\n2\n4\n", settings(true));
        assert!(result.is_ok());
        assert!(output.contains("error: no mode selected"));
        assert!(!output.contains("value at x"));

        let (result, output) = run_script("  \n1\n2\n4\n\nq\n", settings(false));
        assert!(result.is_ok());
        assert!(!output.contains("no mode selected"));
        assert!(output.contains("value at x = 4: 0.125"));
    }

    #[test]
    fn arity_errors_surface_unchanged() {
        let mut model = Model::default_for(ModelKind::Continued);
        let e = SessionError::from(model.initialize(&[1.0]).unwrap_err());
        assert!(matches!(e, SessionError::Coefficients(ArityError { expected: 3, got: 1 })));
        assert_eq!(e.to_string(), "expected 3 coefficients, got 1");
    }

    #[test]
    fn demo_lists_every_case() {
        let (result, output) = run_script("3\nq\n", settings(false));
        assert!(result.is_ok());
        assert!(output.contains("SimpleFraction(2): value at x = 0.5: 1"));
        assert!(output.contains("ContinuedFraction(1, 2, 3): error: at x = 0: innermost denominator"));
        assert!(output.contains("middle denominator"));
        assert!(output.contains("outer denominator"));
        assert_eq!(output.lines().filter(|l| l.contains("at x = ")).count(), demo::battery().len());
    }

    #[test]
    fn colored_errors_carry_escape_codes() {
        let mut s = settings(true);
        s.color = true;
        let (_, output) = run_script("9\n", s);
        assert!(output.contains("\u{1b}["));
        assert!(output.contains("error: unknown selection `9`"));
    }
}
