use std::io::{self, Write};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use encounter_explorer::games::duel::{Duel, DuelBuilder};
use encounter_explorer::service::Response;
use encounter_explorer::{
    BattleEngine, ExplorerConfig, ExplorerRunner, SeededRandom, ServiceConfig, StatusService,
};

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
struct Arguments {
    /// What to do with the fixture duel.
    #[arg(value_enum, long, default_value = "explore")]
    mode: Mode,

    /// Rounds to generate past the seed path.
    #[arg(short, long, default_value_t = 1)]
    depth: usize,

    /// Stop after this many results.
    #[arg(long)]
    max_results: Option<usize>,

    /// Enumerate every damage roll instead of 0, 7 and 15.
    #[arg(long)]
    no_collapse: bool,

    /// Replay every result and check its narration matches.
    #[arg(long)]
    verify: bool,

    /// Print each result as one JSON line.
    #[arg(long)]
    json: bool,

    /// Active units per side.
    #[arg(long, default_value_t = 1)]
    actives: usize,

    /// Skip team preview.
    #[arg(long)]
    no_preview: bool,

    /// Disable damage variance.
    #[arg(long)]
    no_variance: bool,

    /// Seed for `sample` mode.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Results per page in `job` mode.
    #[arg(long, default_value_t = 10)]
    page_size: usize,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Mode {
    /// Enumerate every path from the start of the duel.
    Explore,
    /// Run the enumeration as a background job and print its first page.
    Job,
    /// Play one duel with live randomness.
    Sample,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args = Arguments::parse();
    let duel = DuelBuilder::new()
        .actives_per_side(args.actives)
        .team_preview(!args.no_preview)
        .damage_variance(!args.no_variance)
        .build();

    let mut config = ExplorerConfig::new()
        .with_depth(args.depth)
        .with_damage_collapse(!args.no_collapse);
    if let Some(max) = args.max_results {
        config = config.with_max_results(max);
    }

    match args.mode {
        Mode::Explore => explore(&args, &duel, config),
        Mode::Job => job(&args, &duel, config),
        Mode::Sample => sample(&args, duel),
    }
}

fn explore(args: &Arguments, duel: &Duel, config: ExplorerConfig) -> anyhow::Result<()> {
    let runner = ExplorerRunner::<Duel>::from_engine(duel, config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failure = None;

    let summary = runner.run(|result| {
        if failure.is_some() {
            return;
        }
        if args.verify {
            if let Err(err) = runner.verify_replay(&result) {
                failure = Some(anyhow::Error::new(err).context(format!("path {}", result.path)));
                return;
            }
        }
        let written = if args.json {
            serde_json::to_string(&result)
                .map_err(anyhow::Error::from)
                .and_then(|line| writeln!(out, "{line}").map_err(anyhow::Error::from))
        } else {
            writeln!(
                out,
                "{}\tended={}\tp={:.6}",
                result.path,
                result.ended,
                result.probability()
            )
            .map_err(anyhow::Error::from)
        };
        if let Err(err) = written {
            failure = Some(err);
        }
    })?;

    if let Some(err) = failure {
        return Err(err);
    }
    info!(
        explored = summary.explored,
        ended = summary.ended,
        exhausted = summary.exhausted,
        "done"
    );
    Ok(())
}

fn job(args: &Arguments, duel: &Duel, config: ExplorerConfig) -> anyhow::Result<()> {
    let service_config = ServiceConfig::default()
        .with_default_page_size(args.page_size)
        .with_explorer(config);
    let mut service = StatusService::<Duel>::new(duel.snapshot()?, service_config);

    let started = service.start().context("starting job")?;
    info!(job = %started.id, "waiting for job");
    service.pool_mut().wait(started.id);

    let target = format!("/explorer/results/{}", started.id);
    match service.route(&target) {
        Response::Json(page) => println!("{}", serde_json::to_string_pretty(&page)?),
        Response::NotFound => bail!("no results at {target}"),
    }
    Ok(())
}

fn sample(args: &Arguments, mut duel: Duel) -> anyhow::Result<()> {
    duel.play_out(&mut SeededRandom::new(args.seed), 1000)?;
    for line in duel.drain_narration() {
        println!("{line}");
    }
    Ok(())
}
