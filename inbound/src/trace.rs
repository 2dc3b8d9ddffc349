use log::LevelFilter;
use tracing::{info, subscriber, Level};
use tracing_subscriber::FmtSubscriber;

pub fn init_tracing(level: LevelFilter, structured: bool) -> anyhow::Result<()> {
    let level = match level {
        LevelFilter::Off => return Ok(()),
        LevelFilter::Error => Level::ERROR,
        LevelFilter::Warn => Level::WARN,
        LevelFilter::Info => Level::INFO,
        LevelFilter::Debug => Level::DEBUG,
        LevelFilter::Trace => Level::TRACE,
    };

    // Artifacts go to stdout, keep it clean.
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr);

    if structured {
        subscriber::set_global_default(builder.json().finish())?;
    } else {
        subscriber::set_global_default(builder.finish())?;
    }
    info!("Initialized tracing with level: {}", level);

    Ok(())
}
