use crossterm::tty::IsTty;
use crate::config::Config;
use crate::session::{Session, SessionError, Settings};
use crate::math::parsefmt::CoefficientPolicy;
use crate::Args;
use std::io::{stdin, stdout};
use tracing::debug;

pub fn settings(args: &Args, config: &Config) -> Settings {
    let mut settings = Settings::from_config(config);
    if args.places.is_some() {
        settings.decimal_places = args.places;
    }
    if args.defer_zero {
        settings.policy = CoefficientPolicy::Deferred;
    }
    // escape codes only make sense on a terminal
    settings.color = settings.color && !args.no_color && stdout().is_tty();
    settings.once = args.once;
    settings
}

pub fn crossterm_main(args: Args) -> Result<(), SessionError> {
    let config = Config::load();
    let settings = settings(&args, &config);
    debug!(?settings, "starting session");

    let mut session = Session::new(stdin().lock(), stdout().lock(), settings);
    if args.demo {
        session.run_demo()
    } else {
        session.run()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn flags_override_config() {
        let config = Config {
            decimal_places: Some(2),
            reject_zero_coefficients: true,
            color: true,
        };
        let args = Args::parse_from(["contfrac", "--places", "5", "--defer-zero", "--no-color", "--once"]);
        let settings = settings(&args, &config);
        assert_eq!(settings.decimal_places, Some(5));
        assert_eq!(settings.policy, CoefficientPolicy::Deferred);
        assert!(!settings.color);
        assert!(settings.once);
    }

    #[test]
    fn config_applies_without_flags() {
        let config = Config {
            decimal_places: Some(2),
            reject_zero_coefficients: true,
            color: false,
        };
        let args = Args::parse_from(["contfrac"]);
        let settings = settings(&args, &config);
        assert_eq!(settings.decimal_places, Some(2));
        assert_eq!(settings.policy, CoefficientPolicy::Eager);
        assert!(!settings.once);
    }

    #[test]
    fn places_beyond_the_cap_are_rejected() {
        assert!(Args::try_parse_from(["contfrac", "--places", "70000"]).is_err());
        assert!(Args::try_parse_from(["contfrac", "--places", "4294967295"]).is_err());
        let args = Args::try_parse_from(["contfrac", "-p", "64"]).unwrap();
        assert_eq!(args.places, Some(64));
    }
}
