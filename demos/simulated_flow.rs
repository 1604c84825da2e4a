use igd_primitives::configuration::MappingConfig;
use igd_primitives::context::{ExecutionContext, Value, VariableStore};
use igd_primitives::gateway::{Protocol, SimulatedGateway};
use igd_primitives::primitives::{Dispatcher, Primitive};
use log::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("Starting simulated gateway demo");

    // Port 8443 is refused by the device, so the second bulk entry fails
    let gateway = SimulatedGateway::new().reject_port(8443, Protocol::TCP);
    let dispatcher = Dispatcher::simulated(gateway.clone(), MappingConfig::default());
    let mut vars = VariableStore::new()
        .with("http", 80i64)
        .with("https", 443i64)
        .with("https_ext", 8443i64)
        .with("tcp", "TCP");

    dispatcher.invoke(Primitive::Discover, &[] as &[&str], &["gw", "lan", "ext"], &mut vars);
    if vars.get_variable("gw").is_unset() {
        warn!("No gateway found, stopping");
        return Ok(());
    }

    let outcome = dispatcher.invoke(
        Primitive::AddMultiplePortMappings,
        &["gw", "lan", "http", "tcp", "https", "https_ext", "tcp"],
        &["results"],
        &mut vars,
    );
    info!("Bulk mapping outcome: {:?}", outcome);

    dispatcher.invoke(Primitive::ListPortMappings, &["gw"], &["mappings"], &mut vars);
    println!("{}", serde_json::to_string_pretty(&vars)?);

    // A missing handle leaves the output unset without touching the device
    let before = gateway.calls();
    dispatcher.invoke(Primitive::GetPresentationUrl, &["nothing"], &["url"], &mut vars);
    info!(
        "url = {:?}, device calls made: {}",
        vars.get_variable("url"),
        gateway.calls() - before
    );
    assert_eq!(vars.get_variable("url"), Value::Unset);

    Ok(())
}
