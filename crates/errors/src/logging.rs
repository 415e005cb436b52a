use crate::{Report, Result};
use build::{LOG_ENV, LOG_FILE, get_data_dir};

use env_logger::Builder;
use log::{LevelFilter, debug, error, info};
use std::{fmt::Debug, fs::File, io::Write, panic::Location, sync::LazyLock};
use sync::Mutex;

pub static WORKSPACE_CRATES: &str = env!("_WORKSPACE_CRATES");

// SAFETY: this only protects against accidental parallel calls to initialize_logging.
// if set_env is called from another thread for any other reason ( 3rd party etc. ), a data race
// may still occur
static ENV_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

fn default_filter() -> String {
    WORKSPACE_CRATES
        .split(',')
        .filter(|crate_name| !crate_name.is_empty())
        .map(|crate_name| format!("{}=info", crate_name.replace('-', "_")))
        .collect::<Vec<String>>()
        .join(",")
}

/// Routes `log` records to `<data dir>/MIDI_MAP.log`.
///
/// The filter comes from `RUST_LOG`, then `MIDI_MAP_LOGLEVEL`, and otherwise enables `info` for every workspace
/// crate. Each record is also attached to the current `minitrace` span, if any.
pub fn initialize_logging() -> Result<()> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory)?;
    let log_path = directory.join(LOG_FILE.as_str());

    let log_file: &'static Mutex<File> = Box::leak(Box::new(Mutex::new(File::create(&log_path)?)));

    let _guard = ENV_MUTEX.lock();

    let rust_log =
        std::env::var("RUST_LOG").or_else(|_| std::env::var(LOG_ENV.as_str())).unwrap_or_else(|_| default_filter());

    unsafe {
        std::env::set_var("RUST_LOG", rust_log);
    }

    Builder::from_default_env()
        .filter(None, LevelFilter::Warn)
        .format(|buf, record| {
            let timestamp = buf.timestamp_micros();

            minitrace::Event::add_to_local_parent(record.level().as_str(), || {
                [("message".into(), record.args().to_string().into())]
            });
            writeln!(
                log_file.lock(),
                "{} {} {}:{}: {}",
                timestamp,
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init()?;

    info!("logging to {}", log_path.display());
    Ok(())
}

pub trait LogErrorExt<T> {
    #[must_use]
    fn log_error(self) -> Self;
    #[must_use]
    fn log_info(self) -> Self;
    #[must_use]
    fn log_debug(self) -> Self;
}

pub trait LogErrorWithExt<T> {
    #[must_use]
    fn log_error_msg(self, message: &str) -> Self;
    #[must_use]
    fn log_info_msg(self, message: &str) -> Self;
    #[must_use]
    fn log_debug_msg(self, message: &str) -> Self;
}

pub trait LogOptionWithExt<T> {
    #[must_use]
    fn log_error_msg(self, message: &str) -> Self;
    #[must_use]
    fn log_debug_msg(self, message: &str) -> Self;

    fn report_msg(self, message: &'static str) -> Result<T, Report>;
}

pub trait MakeReportExt<T, E> {
    fn report(self) -> Result<T, Report>;
    fn report_msg(self, message: &str) -> Result<T, Report>;
}

impl<T, E> MakeReportExt<T, E> for Result<T, E>
where
    E: Debug,
{
    fn report(self) -> Result<T, Report> {
        self.map_err(|e| Report::msg(format!("{e:?}")))
    }

    fn report_msg(self, message: &str) -> Result<T, Report> {
        self.map_err(|e| Report::msg(format!("{message} {e:?}")))
    }
}

impl<T, E> LogErrorExt<T> for Result<T, E>
where
    E: Debug,
{
    #[track_caller]
    fn log_error(self) -> Self {
        if let Err(ref e) = self {
            let location = Location::caller();
            error!("{e:?} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }

    #[track_caller]
    fn log_info(self) -> Self {
        if let Err(ref e) = self {
            let location = Location::caller();
            info!("{e:?} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }

    #[track_caller]
    fn log_debug(self) -> Self {
        if let Err(ref e) = self {
            let location = Location::caller();
            debug!("{e:?} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }
}

impl<T, E> LogErrorWithExt<T> for Result<T, E>
where
    E: Debug,
{
    #[track_caller]
    fn log_error_msg(self, message: &str) -> Self {
        if let Err(ref e) = self {
            let location = Location::caller();
            error!("{message}: {e:?} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }

    #[track_caller]
    fn log_info_msg(self, message: &str) -> Self {
        if let Err(ref e) = self {
            let location = Location::caller();
            info!("{message}: {e:?} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }

    #[track_caller]
    fn log_debug_msg(self, message: &str) -> Self {
        if let Err(ref e) = self {
            let location = Location::caller();
            debug!("{message}: {e:?} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }
}

impl<T> LogOptionWithExt<T> for Option<T> {
    #[track_caller]
    fn log_error_msg(self, message: &str) -> Self {
        if self.is_none() {
            let location = Location::caller();
            error!("{message} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }

    #[track_caller]
    fn log_debug_msg(self, message: &str) -> Self {
        if self.is_none() {
            let location = Location::caller();
            debug!("{message} (called from {}:{}:{})", location.file(), location.line(), location.column());
        }
        self
    }

    fn report_msg(self, message: &'static str) -> Result<T, Report> {
        self.ok_or_else(|| Report::msg(message))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn report_msg_prefixes_the_debug_output() {
        let result: Result<(), &str> = Err("port vanished");
        let report = MakeReportExt::report_msg(result, "cannot connect").unwrap_err();
        assert_eq!(report.to_string(), "cannot connect \"port vanished\"");
    }

    #[test]
    fn option_report_msg() {
        assert_eq!(LogOptionWithExt::report_msg(Some(3), "missing").unwrap(), 3);
        assert_eq!(LogOptionWithExt::report_msg(None::<u8>, "missing").unwrap_err().to_string(), "missing");
    }

    #[test]
    fn logging_passes_values_through() {
        let ok: Result<u8, String> = Ok(1);
        assert_eq!(ok.log_error().log_info_msg("unused"), Ok(1));
        assert_eq!(Some(2).log_debug_msg("unused"), Some(2));
    }

    #[test]
    fn default_filter_covers_workspace_crates() {
        let filter = default_filter();
        assert!(
            filter.split(',').filter(|directive| !directive.is_empty()).all(|directive| directive.ends_with("=info"))
        );
        assert!(!filter.contains('-'));
    }
}
