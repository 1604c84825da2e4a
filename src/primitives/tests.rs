use super::*;
use crate::configuration::MappingConfig;
use crate::context::{ExecutionContext, Value, VariableStore};
use crate::error_handling::types::{GatewayError, PrimitiveError};
use crate::gateway::{GatewayHandle, PortMapping, Protocol, SimulatedGateway};

// Dispatcher plus a store whose `gw` variable holds a handle on `gateway`.
fn setup(gateway: &SimulatedGateway) -> (Dispatcher, VariableStore) {
    let dispatcher = Dispatcher::simulated(gateway.clone(), MappingConfig::default());
    let handle = GatewayHandle::new(Box::new(gateway.clone().selected()));
    let vars = VariableStore::new().with("gw", handle);
    (dispatcher, vars)
}

fn mapping(port: u16, protocol: Protocol) -> PortMapping {
    PortMapping {
        external_port: port,
        protocol,
        internal_ip: "192.168.1.10".to_string(),
        internal_port: port,
        description: format!("svc-{}", port),
        lease_duration: 0,
        enabled: true,
        remote_host: String::new(),
    }
}

fn run(
    dispatcher: &Dispatcher,
    vars: &mut VariableStore,
    primitive: Primitive,
    inputs: &[&str],
    outputs: &[&str],
) -> Outcome {
    dispatcher.invoke(primitive, inputs, outputs, vars)
}

#[test]
fn missing_handle_leaves_every_output_unset_without_device_calls() {
    let gateway = SimulatedGateway::new().selected();
    let dispatcher = Dispatcher::simulated(gateway.clone(), MappingConfig::default());

    for primitive in Primitive::ALL.iter().filter(|p| p.needs_handle()) {
        let signature = primitive.signature();
        let input_count = match signature.inputs {
            Arity::Fixed(n) => n,
            Arity::Dynamic { prefix } => prefix + 2,
        };
        let inputs: Vec<String> = (0..input_count).map(|i| format!("in{}", i)).collect();
        let outputs: Vec<String> = (0..signature.outputs).map(|i| format!("out{}", i)).collect();

        let mut vars = VariableStore::new()
            .with("in1", "192.168.1.10")
            .with("in2", 80i64)
            .with("in3", "TCP");
        for name in &outputs {
            vars.set_variable(name, Value::from("stale"));
        }

        let outcome = dispatcher.invoke(*primitive, &inputs, &outputs, &mut vars);

        assert_eq!(
            outcome,
            Outcome::Failed(PrimitiveError::NoDeviceSelected),
            "{}",
            primitive
        );
        for name in &outputs {
            assert_eq!(vars.get_variable(name), Value::Unset, "{} {}", primitive, name);
        }
    }
    assert_eq!(gateway.calls(), 0);
}

#[test]
fn discover_without_devices_leaves_outputs_unset() {
    let gateway = SimulatedGateway::new().with_devices(0);
    let dispatcher = Dispatcher::simulated(gateway, MappingConfig::default());
    let mut vars = VariableStore::new();

    let outcome = run(&dispatcher, &mut vars, Primitive::Discover, &[], &["gw", "lan", "ext"]);

    assert_eq!(
        outcome,
        Outcome::Failed(PrimitiveError::device("discover gateways", GatewayError::NoDevice))
    );
    for name in ["gw", "lan", "ext"] {
        assert_eq!(vars.get_variable(name), Value::Unset);
    }
}

#[test]
fn discover_selects_device() {
    let gateway = SimulatedGateway::new().with_external_ip("198.51.100.20");
    let dispatcher = Dispatcher::simulated(gateway, MappingConfig::default());
    let mut vars = VariableStore::new();

    let outcome = run(&dispatcher, &mut vars, Primitive::Discover, &[], &["gw", "lan", "ext"]);

    assert!(outcome.is_completed());
    assert!(vars.get_variable("gw").as_handle().is_some());
    assert_eq!(vars.get_variable("lan"), Value::from("192.168.1.10"));
    assert_eq!(vars.get_variable("ext"), Value::from("198.51.100.20"));
}

#[test]
fn discovered_handle_drives_later_primitives() {
    let gateway = SimulatedGateway::new();
    let dispatcher = Dispatcher::simulated(gateway.clone(), MappingConfig::default());
    let mut vars = VariableStore::new()
        .with("ext_port", 8080i64)
        .with("int_port", 80i64)
        .with("proto", "TCP");

    run(&dispatcher, &mut vars, Primitive::Discover, &[], &["gw", "lan", "ext"]);
    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddPortMapping,
        &["gw", "lan", "ext", "ext_port", "int_port", "proto"],
        &["mapped_ip", "mapped_port"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("mapped_ip"), Value::from("203.0.113.7"));
    assert_eq!(vars.get_variable("mapped_port"), Value::Int(8080));
    let mappings = gateway.mappings();
    assert_eq!(mappings.len(), 1);
    assert_eq!(mappings[0].internal_ip, "192.168.1.10");
    assert_eq!(mappings[0].description, MappingConfig::default().description);
}

#[test]
fn add_then_delete_mapping_reports_success() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("lan", Value::from("192.168.1.10"));
    vars.set_variable("ext", Value::from("203.0.113.7"));
    vars.set_variable("port", Value::from(5060i64));
    vars.set_variable("proto", Value::from("UDP"));

    let added = run(
        &dispatcher,
        &mut vars,
        Primitive::AddPortMapping,
        &["gw", "lan", "ext", "port", "port", "proto"],
        &["out_ip", "out_port"],
    );
    let deleted = run(
        &dispatcher,
        &mut vars,
        Primitive::DeletePortMapping,
        &["gw", "port", "proto"],
        &["ok"],
    );

    assert!(added.is_completed());
    assert!(deleted.is_completed());
    assert_eq!(vars.get_variable("ok"), Value::Bool(true));
    assert!(gateway.mappings().is_empty());
}

#[test]
fn rejected_add_leaves_outputs_unset() {
    let gateway = SimulatedGateway::new().reject_port(443, Protocol::TCP);
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("lan", Value::from("192.168.1.10"));
    vars.set_variable("ext", Value::from("203.0.113.7"));
    vars.set_variable("port", Value::from(443i64));
    vars.set_variable("proto", Value::from("tcp"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddPortMapping,
        &["gw", "lan", "ext", "port", "port", "proto"],
        &["out_ip", "out_port"],
    );

    assert!(matches!(
        outcome,
        Outcome::Failed(PrimitiveError::DeviceOperationFailed { operation: "add port mapping", .. })
    ));
    assert_eq!(vars.get_variable("out_ip"), Value::Unset);
    assert_eq!(vars.get_variable("out_port"), Value::Unset);
}

#[test]
fn deleting_unknown_mapping_reports_false() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("port", Value::from(9999i64));
    vars.set_variable("proto", Value::from("TCP"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::DeletePortMapping,
        &["gw", "port", "proto"],
        &["ok"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("ok"), Value::Bool(false));
}

#[test]
fn invalid_protocol_fails_before_device_call() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("port", Value::from(80i64));
    vars.set_variable("proto", Value::from("ICMP"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::DeletePortMapping,
        &["gw", "port", "proto"],
        &["ok"],
    );

    assert!(matches!(
        outcome,
        Outcome::Failed(PrimitiveError::InvalidArgument { ref slot, .. }) if slot == "proto"
    ));
    assert_eq!(gateway.calls(), 0);
}

#[test]
fn batch_mapping_follows_integer_lookahead() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ip", Value::from("192.168.1.20"));
    vars.set_variable("p80", Value::from(80i64));
    vars.set_variable("p443", Value::from(443i64));
    vars.set_variable("p8443", Value::from(8443i64));
    vars.set_variable("tcp", Value::from("TCP"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddMultiplePortMappings,
        &["gw", "ip", "p80", "tcp", "p443", "p8443", "tcp"],
        &["results"],
    );

    assert!(outcome.is_completed());
    let expected = Value::from(vec![
        MappingResult {
            internal_port: 80,
            external_port: 80,
            protocol: Protocol::TCP,
            success: true,
        },
        MappingResult {
            internal_port: 443,
            external_port: 8443,
            protocol: Protocol::TCP,
            success: true,
        },
    ]);
    assert_eq!(vars.get_variable("results"), expected);
    let ports: Vec<(u16, u16)> = gateway
        .mappings()
        .iter()
        .map(|m| (m.external_port, m.internal_port))
        .collect();
    assert_eq!(ports, vec![(80, 80), (8443, 443)]);
}

#[test]
fn batch_mapping_keeps_going_after_failed_item() {
    let gateway = SimulatedGateway::new().reject_port(53, Protocol::UDP);
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ip", Value::from("192.168.1.20"));
    vars.set_variable("dns", Value::from(53i64));
    vars.set_variable("ssh", Value::from(22i64));
    vars.set_variable("ssh_ext", Value::from(2222i64));
    vars.set_variable("udp", Value::from("UDP"));
    vars.set_variable("tcp", Value::from("TCP"));

    run(
        &dispatcher,
        &mut vars,
        Primitive::AddMultiplePortMappings,
        &["gw", "ip", "dns", "udp", "ssh", "ssh_ext", "tcp"],
        &["results"],
    );

    let results = vars.get_variable("results");
    let flags: Vec<Value> = results
        .as_list()
        .unwrap()
        .iter()
        .map(|r| r.as_record().unwrap()["success"].clone())
        .collect();
    assert_eq!(flags, vec![Value::Bool(false), Value::Bool(true)]);
}

#[test]
fn malformed_batch_makes_no_attempt() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ip", Value::from("192.168.1.20"));
    vars.set_variable("p80", Value::from(80i64));
    vars.set_variable("p22", Value::from(22i64));
    vars.set_variable("tcp", Value::from("TCP"));
    vars.set_variable("results", Value::from("stale"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddMultiplePortMappings,
        &["gw", "ip", "p80", "tcp", "p22"],
        &["results"],
    );

    assert!(matches!(
        outcome,
        Outcome::Failed(PrimitiveError::MalformedBatchRequest(_))
    ));
    assert_eq!(vars.get_variable("results"), Value::Unset);
    assert_eq!(gateway.calls(), 0);
    assert!(gateway.mappings().is_empty());
}

#[test]
fn empty_batch_yields_empty_results() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ip", Value::from("192.168.1.20"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddMultiplePortMappings,
        &["gw", "ip"],
        &["results"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("results"), Value::List(Vec::new()));
}

#[test]
fn delete_port_range_preserves_partial_success() {
    let gateway = SimulatedGateway::new()
        .with_mapping(mapping(5000, Protocol::UDP))
        .with_mapping(mapping(5001, Protocol::UDP))
        .with_mapping(mapping(5002, Protocol::UDP))
        .reject_port(5001, Protocol::UDP);
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("start", Value::from(5000i64));
    vars.set_variable("end", Value::from(5002i64));
    vars.set_variable("proto", Value::from("UDP"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::DeletePortRange,
        &["gw", "start", "end", "proto"],
        &["deleted"],
    );

    assert!(outcome.is_completed());
    assert_eq!(
        vars.get_variable("deleted"),
        Value::from(vec![5000u16, 5002u16])
    );
    assert_eq!(gateway.mappings().len(), 1);
}

#[test]
fn delete_port_range_survives_transport_errors() {
    let gateway = SimulatedGateway::new()
        .with_mapping(mapping(7000, Protocol::TCP))
        .with_mapping(mapping(7001, Protocol::TCP))
        .fail_port(7000, Protocol::TCP);
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("start", Value::from("7000"));
    vars.set_variable("end", Value::from("7001"));
    vars.set_variable("proto", Value::from("TCP"));

    run(
        &dispatcher,
        &mut vars,
        Primitive::DeletePortRange,
        &["gw", "start", "end", "proto"],
        &["deleted"],
    );

    assert_eq!(vars.get_variable("deleted"), Value::from(vec![7001u16]));
}

#[test]
fn list_port_mappings_stops_at_first_absent_index() {
    let gateway = SimulatedGateway::new()
        .with_mapping(mapping(21, Protocol::TCP))
        .with_mapping(mapping(22, Protocol::TCP))
        .with_mapping(mapping(53, Protocol::UDP));
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = run(&dispatcher, &mut vars, Primitive::ListPortMappings, &["gw"], &["list"]);

    assert!(outcome.is_completed());
    let list = vars.get_variable("list");
    let ports: Vec<i64> = list
        .as_list()
        .unwrap()
        .iter()
        .map(|m| m.as_record().unwrap()["external_port"].as_int().unwrap())
        .collect();
    assert_eq!(ports, vec![21, 22, 53]);
    // indices 0..=3 probed
    assert_eq!(gateway.calls(), 4);
}

#[test]
fn list_port_mappings_treats_device_error_as_end() {
    let gateway = SimulatedGateway::new()
        .with_mapping(mapping(21, Protocol::TCP))
        .with_mapping(mapping(22, Protocol::TCP))
        .with_mapping(mapping(23, Protocol::TCP))
        .fail_enumeration_at(2);
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = run(&dispatcher, &mut vars, Primitive::ListPortMappings, &["gw"], &["list"]);

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("list").as_list().map(|l| l.len()), Some(2));
}

#[test]
fn list_port_mappings_on_empty_table() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);

    run(&dispatcher, &mut vars, Primitive::ListPortMappings, &["gw"], &["list"]);

    assert_eq!(vars.get_variable("list"), Value::List(Vec::new()));
}

#[test]
fn list_port_mappings_igd2_returns_records_in_order() {
    let gateway = SimulatedGateway::new()
        .with_mapping(mapping(1000, Protocol::TCP))
        .with_mapping(mapping(1001, Protocol::UDP));
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::ListPortMappingsIgd2,
        &["gw"],
        &["list"],
    );

    assert!(outcome.is_completed());
    let list = vars.get_variable("list");
    let records = list.as_list().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].as_record().unwrap()["protocol"], Value::from("UDP"));
}

#[test]
fn list_port_mappings_igd2_on_igd1_device_is_empty() {
    let gateway = SimulatedGateway::new()
        .igd1_only()
        .with_mapping(mapping(1000, Protocol::TCP));
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::ListPortMappingsIgd2,
        &["gw"],
        &["list"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("list"), Value::List(Vec::new()));
}

#[test]
fn add_any_port_mapping_reports_assigned_port() {
    let gateway = SimulatedGateway::new().with_mapping(mapping(8080, Protocol::TCP));
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ip", Value::from("192.168.1.30"));
    vars.set_variable("int", Value::from(80i64));
    vars.set_variable("suggested", Value::from(8080i64));
    vars.set_variable("proto", Value::from("TCP"));
    vars.set_variable("duration", Value::from(3600i64));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddAnyPortMapping,
        &["gw", "ip", "int", "suggested", "proto", "duration"],
        &["actual"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("actual"), Value::Int(8081));
    let added = gateway
        .mappings()
        .into_iter()
        .find(|m| m.external_port == 8081)
        .unwrap();
    assert_eq!(added.lease_duration, 3600);
    assert_eq!(added.description, MappingConfig::default().any_description);
}

#[test]
fn output_may_reuse_input_name() {
    let gateway = SimulatedGateway::new().with_mapping(mapping(8080, Protocol::TCP));
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ip", Value::from("192.168.1.30"));
    vars.set_variable("port", Value::from(8080i64));
    vars.set_variable("proto", Value::from("TCP"));
    vars.set_variable("dur", Value::from(0i64));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddAnyPortMapping,
        &["gw", "ip", "port", "port", "proto", "dur"],
        &["port"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("port"), Value::Int(8081));
    let added = gateway
        .mappings()
        .into_iter()
        .find(|m| m.external_port == 8081)
        .unwrap();
    assert_eq!(added.internal_port, 8080);
}

#[test]
fn flag_output_may_overwrite_port_input() {
    let gateway = SimulatedGateway::new().reject_port(9000, Protocol::UDP);
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ok", Value::from(9000i64));
    vars.set_variable("proto", Value::from("UDP"));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::DeletePortMapping,
        &["gw", "ok", "proto"],
        &["ok"],
    );

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("ok"), Value::Bool(false));
    assert_eq!(gateway.calls(), 1);
}

#[test]
fn get_status_reports_record() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = run(&dispatcher, &mut vars, Primitive::GetStatus, &["gw"], &["ext", "status"]);

    assert!(outcome.is_completed());
    assert_eq!(vars.get_variable("ext"), Value::from("203.0.113.7"));
    let status = vars.get_variable("status");
    let record = status.as_record().unwrap();
    assert_eq!(record["status"], Value::from("Connected"));
    assert_eq!(record["last_connection_error"], Value::from("ERROR_NONE"));
    assert!(record["uptime"].as_int().unwrap() > 0);
}

#[test]
fn pinhole_lifecycle() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("remote", Value::from("2001:db8::1"));
    vars.set_variable("rport", Value::from(0i64));
    vars.set_variable("host", Value::from("2001:db8::10"));
    vars.set_variable("hport", Value::from(22i64));
    vars.set_variable("proto", Value::from("TCP"));
    vars.set_variable("lease", Value::from(600i64));
    vars.set_variable("new_lease", Value::from(1200i64));

    let added = run(
        &dispatcher,
        &mut vars,
        Primitive::AddPinhole,
        &["gw", "remote", "rport", "host", "hport", "proto", "lease"],
        &["uid"],
    );
    assert!(added.is_completed());
    let uid = vars.get_variable("uid");
    assert_eq!(uid, Value::from("1"));

    run(&dispatcher, &mut vars, Primitive::UpdatePinhole, &["gw", "uid", "new_lease"], &["updated"]);
    assert_eq!(vars.get_variable("updated"), Value::Bool(true));
    assert_eq!(gateway.pinhole_lease("1"), Some(1200));

    run(&dispatcher, &mut vars, Primitive::CheckPinhole, &["gw", "uid"], &["working"]);
    assert_eq!(vars.get_variable("working"), Value::Bool(true));

    gateway.record_packets("1", 42);
    run(&dispatcher, &mut vars, Primitive::GetPinholePacketCount, &["gw", "uid"], &["packets"]);
    assert_eq!(vars.get_variable("packets"), Value::Int(42));

    run(&dispatcher, &mut vars, Primitive::DeletePinhole, &["gw", "uid"], &["deleted"]);
    assert_eq!(vars.get_variable("deleted"), Value::Bool(true));
    assert!(gateway.pinhole_ids().is_empty());

    let outcome = run(&dispatcher, &mut vars, Primitive::CheckPinhole, &["gw", "uid"], &["working"]);
    assert!(!outcome.is_completed());
    assert_eq!(vars.get_variable("working"), Value::Unset);
}

#[test]
fn pinholes_on_igd1_device_fail_quietly() {
    let gateway = SimulatedGateway::new().igd1_only();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("remote", Value::from("2001:db8::1"));
    vars.set_variable("rport", Value::from(443i64));
    vars.set_variable("host", Value::from("2001:db8::10"));
    vars.set_variable("hport", Value::from(443i64));
    vars.set_variable("proto", Value::from("TCP"));
    vars.set_variable("lease", Value::from(600i64));

    let outcome = run(
        &dispatcher,
        &mut vars,
        Primitive::AddPinhole,
        &["gw", "remote", "rport", "host", "hport", "proto", "lease"],
        &["uid"],
    );

    assert_eq!(
        outcome.error(),
        Some(&PrimitiveError::device(
            "add pinhole",
            GatewayError::Unsupported("add_pinhole")
        ))
    );
    assert_eq!(vars.get_variable("uid"), Value::Unset);
}

#[test]
fn firewall_status_and_outbound_timeout() {
    let gateway = SimulatedGateway::new().with_outbound_timeout(300);
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("remote", Value::from("2001:db8::1"));
    vars.set_variable("rport", Value::from(0i64));
    vars.set_variable("host", Value::from("2001:db8::10"));
    vars.set_variable("hport", Value::from(8080i64));
    vars.set_variable("proto", Value::from("UDP"));

    run(
        &dispatcher,
        &mut vars,
        Primitive::GetFirewallStatus,
        &["gw"],
        &["enabled", "inbound"],
    );
    run(
        &dispatcher,
        &mut vars,
        Primitive::GetOutboundPinholeTimeout,
        &["gw", "remote", "rport", "host", "hport", "proto"],
        &["timeout"],
    );

    assert_eq!(vars.get_variable("enabled"), Value::Bool(true));
    assert_eq!(vars.get_variable("inbound"), Value::Bool(true));
    assert_eq!(vars.get_variable("timeout"), Value::Int(300));
}

#[test]
fn presentation_url_requires_base_url() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    run(&dispatcher, &mut vars, Primitive::GetPresentationUrl, &["gw"], &["url"]);
    assert_eq!(vars.get_variable("url"), Value::from("http://192.168.1.1:5000/"));

    let bare = SimulatedGateway::new().with_base_url(None);
    let (dispatcher, mut vars) = setup(&bare);
    let outcome = run(&dispatcher, &mut vars, Primitive::GetPresentationUrl, &["gw"], &["url"]);
    assert!(!outcome.is_completed());
    assert_eq!(vars.get_variable("url"), Value::Unset);
}

#[test]
fn arity_mismatch_resets_outputs_and_skips_device() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("ok", Value::Bool(true));

    let outcome = run(&dispatcher, &mut vars, Primitive::DeletePortMapping, &["gw"], &["ok"]);

    assert_eq!(
        outcome,
        Outcome::Failed(PrimitiveError::ArityMismatch {
            primitive: "delete_port_mapping",
            expected: "3 inputs".to_string(),
            found: 1,
        })
    );
    assert_eq!(vars.get_variable("ok"), Value::Unset);
    assert_eq!(gateway.calls(), 0);
}

#[test]
fn output_count_is_checked() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = run(&dispatcher, &mut vars, Primitive::GetFirewallStatus, &["gw"], &["only_one"]);

    assert!(matches!(
        outcome,
        Outcome::Failed(PrimitiveError::ArityMismatch { found: 1, .. })
    ));
}

#[test]
fn unknown_primitive_by_name() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);
    vars.set_variable("out", Value::Int(1));

    let outcome = dispatcher.invoke_named("teleport", &["gw"], &["out"], &mut vars);

    assert_eq!(
        outcome,
        Outcome::Failed(PrimitiveError::UnknownPrimitive("teleport".to_string()))
    );
    assert_eq!(vars.get_variable("out"), Value::Unset);
}

#[test]
fn known_primitive_by_name() {
    let gateway = SimulatedGateway::new();
    let (dispatcher, mut vars) = setup(&gateway);

    let outcome = dispatcher.invoke_named("get_firewall_status", &["gw"], &["fw", "inbound"], &mut vars);

    assert!(outcome.is_completed());
}
