//! Run the container scenarios and dump the resulting state graph.
//!
//! ```text
//! cargo run --example bathtub -- --graph 2 --states-dot states.dot
//! ```

use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use clap::Parser;

use qrcore::engine::Simulator;
use qrcore::error::QrResult;
use qrcore::{scenarios, trace};

#[derive(Parser)]
#[command(about = "Qualitative simulation of the container system")]
struct Args {
    /// Which model to run: 1 = first-order container, 2 = curved volume,
    /// 3 = extended drain chain, 4 = bidirectional correspondences
    #[arg(short, long, default_value_t = 1)]
    graph: u8,

    /// Seed every causally valid value combination instead of the declared
    /// initial state
    #[arg(long)]
    exhaustive: bool,

    /// Write the reachability graph in Graphviz format
    #[arg(long)]
    states_dot: Option<PathBuf>,

    /// Write the causal model in Graphviz format
    #[arg(long)]
    model_dot: Option<PathBuf>,

    /// Write the narrated per-state trace
    #[arg(long)]
    intra: Option<PathBuf>,

    /// Write the narrated per-transition trace
    #[arg(long)]
    inter: Option<PathBuf>,
}

fn write_to(path: &PathBuf, f: impl FnOnce(&mut BufWriter<File>) -> QrResult<()>) -> QrResult<()> {
    let mut out = BufWriter::new(File::create(path)?);
    f(&mut out)?;
    out.flush()?;
    Ok(())
}

fn main() -> QrResult<()> {
    env_logger::init();
    let args = Args::parse();

    let model = match args.graph {
        2 => scenarios::bathtub_curved(),
        3 => scenarios::bathtub_extended(),
        4 => scenarios::bathtub_bidirectional(),
        _ => scenarios::bathtub(),
    }?;

    let mut sim = Simulator::new(&model);
    if args.exhaustive {
        sim.run_exhaustive();
    } else {
        sim.run();
    }
    println!(
        "discovered {} states and {} transitions",
        sim.state_count(),
        sim.transition_count()
    );
    trace::write_transitions(&sim, &mut stdout())?;

    if let Some(path) = &args.states_dot {
        write_to(path, |w| trace::write_state_graph_dot(&sim, w))?;
    }
    if let Some(path) = &args.model_dot {
        write_to(path, |w| trace::write_model_dot(&model, w))?;
    }
    if let Some(path) = &args.intra {
        write_to(path, |w| trace::write_intra_state_trace(&sim, w))?;
    }
    if let Some(path) = &args.inter {
        write_to(path, |w| trace::write_inter_state_trace(&sim, w))?;
    }
    Ok(())
}
