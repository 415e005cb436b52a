use crate::Result;
use log::error;

/// Installs the `color-eyre` report hooks and a panic hook.
///
/// `reset` runs first so that a caller which altered the terminal or a device can restore it before the report is
/// printed. Debug builds print a full `better-panic` trace, release builds write a `human-panic` dump.
pub fn initialize_panic_handler<F>(reset: F) -> Result<()>
where
    F: Fn() -> Result<()> + Send + Sync + 'static,
{
    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default()
        .panic_section(format!("This is a bug. Consider reporting it at {}", env!("CARGO_PKG_NAME")))
        .display_location_section(true)
        .display_env_section(false)
        .into_hooks();
    eyre_hook.install()?;

    std::panic::set_hook(Box::new(move |panic_info| {
        if let Err(e) = reset() {
            error!("Unable to reset before reporting the panic: {e:?}");
        }

        let report = panic_hook.panic_report(panic_info).to_string();
        error!("Error: {}", strip_ansi_escapes::strip_str(&report));

        #[cfg(not(debug_assertions))]
        {
            use human_panic::{Metadata, handle_dump, print_msg};

            eprintln!("{report}");
            let metadata = Metadata::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            let file_path = handle_dump(&metadata, panic_info);
            if print_msg(file_path, &metadata).is_err() {
                eprintln!("human-panic: printing error message to console failed");
            }
        }

        #[cfg(debug_assertions)]
        {
            better_panic::Settings::auto()
                .most_recent_first(false)
                .lineno_suffix(true)
                .verbosity(better_panic::Verbosity::Full)
                .create_panic_handler()(panic_info);
        }

        std::process::exit(1);
    }));
    Ok(())
}
