use sekisho::logger::*;

fn main() -> anyhow::Result<()> {
    let logger = Logger::new_bootstrap();
    trace!("bootstrap trace log");
    debug!("bootstrap debug log");
    info!("bootstrap info log");

    // same reload the server performs once its settings are parsed
    let config = LogConfig {
        filter: "sekisho=trace,debug".to_string(),
    };
    logger.reload_from_config(&config)?;
    trace!("application trace log");
    debug!("application debug log");
    info!("application info log");

    let broken = LogConfig {
        filter: "not a filter ((".to_string(),
    };
    info!(
        "reload with a broken filter errors: {}",
        logger.reload_from_config(&broken).is_err()
    );

    Ok(())
}
