use efcsim_core::{DeviceType, Ratio, SimConfig, Simulation, TierNode as _};

fn main() -> anyhow::Result<()> {
    // One sensor, an edge node that keeps everything and a fog node that
    // does not compact.
    let mut config = SimConfig::default();
    config.simulation.time = 100;
    config.simulation.num_iot_devices = 1;
    config.simulation.device_type = Some(DeviceType::Sensor);
    config.edge.filtering_ratio = Ratio::ZERO;
    config.fog.aggregation_ratio = Ratio::ONE;

    let mut simulation = Simulation::with_seed(config, 42)?;
    let report = simulation.run()?;

    let topology = simulation.topology();
    let edge = topology.edges()[0].counters();
    let fog = topology.fogs()[0].counters();
    println!(
        "edge: {received} received, {forwarded} forwarded",
        received = edge.packets_received,
        forwarded = edge.packets_forwarded,
    );
    println!(
        "fog: {received} received, {forwarded} forwarded",
        received = fog.packets_received,
        forwarded = fog.packets_forwarded,
    );
    println!(
        "cloud: {processed} processed",
        processed = topology.cloud().counters().packets_processed
    );
    println!();
    println!("{report}");

    Ok(())
}
