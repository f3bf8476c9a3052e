use criterion::{
    BenchmarkGroup, Criterion, Throughput, black_box, criterion_group, criterion_main,
    measurement::WallTime,
};
use efcsim_core::{DeviceType, SimConfig, Simulation};

const TICKS: u64 = 100;

fn config(devices: usize) -> SimConfig {
    let mut config = SimConfig::default();
    config.simulation.time = TICKS;
    config.simulation.num_iot_devices = devices;
    config.simulation.num_edge_nodes = devices.div_ceil(10).max(1);
    config.simulation.num_fog_nodes = devices.div_ceil(50).max(1);
    config
}

fn bench_run_size(group: &mut BenchmarkGroup<'_, WallTime>, devices: usize) {
    let config = config(devices);

    group.throughput(Throughput::Elements(TICKS));
    group.bench_function(format!("{devices} devices"), |b| {
        b.iter(|| {
            let mut simulation = Simulation::with_seed(config.clone(), 42).unwrap();
            black_box(simulation.run().unwrap())
        })
    });
}

fn run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");

    bench_run_size(&mut group, 10);
    bench_run_size(&mut group, 100);
    bench_run_size(&mut group, 1_000);

    group.finish();
}

fn step(c: &mut Criterion) {
    let mut config = config(100);
    config.simulation.time = u64::MAX;
    config.simulation.device_type = Some(DeviceType::Smartphone);
    let mut simulation = Simulation::with_seed(config, 42).unwrap();

    c.bench_function("step 100 smartphones", |b| {
        b.iter(|| simulation.step().unwrap())
    });
}

criterion_group!(benches, run, step);
criterion_main!(benches);
