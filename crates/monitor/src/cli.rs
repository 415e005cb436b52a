use std::ffi::OsString;

use clap::{Arg, ArgAction, ArgMatches, Command, Error};
use itertools::Itertools;

use crate::{
    config::{Config, check_poll_interval},
    utils::version,
};

/// What to do once the configuration is known.
#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    pub config: Config,
    pub list_only: bool,
}

fn poll_interval(value: &str) -> Result<f64, String> {
    check_poll_interval(value.parse::<f64>().map_err(|e| e.to_string())?)
}

fn command(config: &Config) -> Command {
    Command::new(clap::crate_name!())
        .author(clap::crate_authors!())
        .version(version())
        .about(clap::crate_description!())
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .action(ArgAction::SetTrue)
                .help("Print the available input devices and exit"),
        )
        .arg(
            Arg::new("device")
                .short('d')
                .long("device")
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Connect inputs whose name contains NAME, can be repeated"),
        )
        .arg(
            Arg::new("all")
                .short('a')
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Connect every input device"),
        )
        .arg(
            Arg::new("poll")
                .value_parser(poll_interval)
                .short('p')
                .long("poll")
                .value_name("SECONDS")
                .help("Interval between two device scans")
                .default_value(config.poll_interval.to_string()),
        )
}

fn apply(mut config: Config, matches: &ArgMatches) -> Options {
    if let Some(devices) = matches.get_many::<String>("device") {
        config.midi.devices = devices.cloned().collect_vec();
    }
    config.midi.connect_all |= matches.get_flag("all");
    if let Some(poll_interval) = matches.get_one::<f64>("poll") {
        config.poll_interval = *poll_interval;
    }
    Options { config, list_only: matches.get_flag("list") }
}

pub fn update_config(config: Config) -> Result<Options, Error> {
    let matches = command(&config).try_get_matches()?;
    Ok(apply(config, &matches))
}

pub fn update_config_from<I, T>(config: Config, args: I) -> Result<Options, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command(&config).try_get_matches_from(args)?;
    Ok(apply(config, &matches))
}
