use std::thread::{self, JoinHandle};

use errors::Result;
use log::{error, info};
use signal_hook::{
    consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM},
    iterator::Signals,
};

pub fn spawn_signal_thread<F>(callback: F) -> Result<JoinHandle<()>>
where
    F: Fn() -> Result<()> + Send + Sync + 'static,
{
    let mut signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    Ok(thread::Builder::new().name("signals".to_string()).spawn(move || {
        info!("spawn signal handling thread");
        for signal in signals.forever() {
            match signal {
                SIGHUP | SIGTERM | SIGINT | SIGQUIT => {
                    info!("Received signal {signal}, shutting down");
                    if callback().is_err() {
                        error!("Failed to signal quit event");
                        break;
                    }
                }
                _ => {
                    error!("Received unexpected signal {signal}");
                }
            }
        }
    })?)
}
