use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tahoe_sim::display::{Algorithm, DisplayModel};
use tahoe_sim::report::{self, LogRow};
use tahoe_sim::trials::mean_success_rate;
use tahoe_sim::{load_config, logging, run_scenario, run_trials, ScenarioConfig, SimConfig};

fn main() -> Result<()> {
    logging::init_tracing();

    let mut args = std::env::args().skip(1);
    let mut config = SimConfig::default();
    let mut scenario_name = None;
    let mut seed = None;
    let mut steps = None;
    let mut trials = 1u32;
    let mut payload = String::from("Hello, Network World!");
    let mut format = String::from("csv");
    let mut algorithm = None;

    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .ok_or_else(|| anyhow::anyhow!("missing value for {}", arg))
        };
        match arg.as_str() {
            "--config" => config = load_config(value()?)?,
            "--scenario" => scenario_name = Some(value()?),
            "--seed" => seed = Some(value()?.parse::<u64>()?),
            "--steps" => steps = Some(value()?.parse::<u64>()?),
            "--trials" => trials = value()?.parse()?,
            "--payload" => payload = value()?,
            "--format" => format = value()?,
            "--algorithm" => algorithm = Some(value()?.parse::<Algorithm>()?),
            other => anyhow::bail!("unknown argument: {}", other),
        }
    }

    let mut scenario = config.scenario.clone();
    if let Some(name) = scenario_name {
        scenario = ScenarioConfig::named(&name, scenario.seed)
            .ok_or_else(|| anyhow::anyhow!("unknown scenario: {}", name))?;
    }
    if let Some(seed) = seed {
        scenario.seed = seed;
    }
    if let Some(steps) = steps {
        scenario.steps = steps;
    }
    let mut display = config.display.clone();
    if let Some(algorithm) = algorithm {
        display.algorithm = algorithm;
    }

    if trials > 1 {
        let summaries = run_trials(&config.pipeline, &scenario, &payload, trials)?;
        tracing::info!(
            trials,
            mean_success_rate = mean_success_rate(&summaries),
            "trials complete"
        );
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    let pipeline = run_scenario(&config.pipeline, &scenario, &payload)?;
    let stats = pipeline.stats();
    tracing::info!(
        total = stats.total,
        success_rate = stats.success_rate,
        timeouts = stats.total_timeouts,
        cwnd = stats.current_cwnd,
        ssthresh = stats.current_ssthresh,
        "run complete"
    );

    let model = DisplayModel::new(display)?;
    let mut rng = StdRng::seed_from_u64(scenario.seed);
    let rows: Vec<LogRow> = report::log_rows(pipeline.history(), &model, &mut rng);
    match format.as_str() {
        "csv" => print!("{}", report::to_csv(&rows)),
        "json" => println!("{}", report::to_json(&rows)?),
        other => anyhow::bail!("unknown format: {}", other),
    }

    Ok(())
}
