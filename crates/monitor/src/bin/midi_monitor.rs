use errors::{Result, initialize_logging, initialize_panic_handler};
use log::info;
use mimalloc::MiMalloc;
use monitor::{
    app::{list_devices, run},
    cli::update_config,
    config::Config,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> Result<()> {
    initialize_logging()?;
    initialize_panic_handler(|| Ok(()))?;
    let config = Config::new()?;
    let options = match update_config(config) {
        Ok(options) => options,
        Err(e) => {
            e.print()?;
            return Ok(());
        }
    };

    if options.list_only {
        return list_devices(&options.config);
    }

    info!("starting with {:?}", options.config.midi);
    run(&options.config)
}
