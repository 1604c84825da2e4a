use clap::Parser;
use igd_primitives::configuration::{Args, Config};
use igd_primitives::flow::{Flow, FlowRunner};
use igd_primitives::gateway::SimulatedGateway;
use igd_primitives::primitives::Dispatcher;
use log::{error, info, warn, LevelFilter};

fn main() {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
    .and_then(|mut config| {
        if let Some(level) = &args.log_level {
            config.log_level = level.clone();
            config.validate()?;
        }
        Ok(config)
    });

    // RUST_LOG still wins over the configured level
    // https://docs.rs/env_logger/latest/env_logger/
    let level = config
        .as_ref()
        .ok()
        .and_then(|c| c.level_filter().ok())
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();

    let config = config.unwrap_or_else(|e| {
        error!("Unable to import configuration: {}", e);
        std::process::exit(1);
    });
    info!("Configuration imported successfully");

    let flow = Flow::from_file(&args.flow_file).unwrap_or_else(|e| {
        error!(
            "Unable to load flow from {}: {}",
            args.flow_file.display(),
            e
        );
        std::process::exit(1);
    });

    let dispatcher = if args.simulate {
        warn!("Running against a simulated gateway, no network traffic will be sent");
        Dispatcher::simulated(SimulatedGateway::new(), config.mapping.clone())
    } else {
        Dispatcher::from_config(&config)
    };

    let report = FlowRunner::new(dispatcher).run(flow);

    match report.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            error!("Unable to serialize flow report: {}", e);
            std::process::exit(1);
        }
    }
}
