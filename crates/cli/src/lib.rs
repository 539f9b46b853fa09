mod cli_args;

use clap::Parser;
use cli_args::CliArgs;
use miette::set_panic_hook;
use snpm_diagnostics::enable_tracing_by_env;
use std::thread::available_parallelism;

pub async fn main() -> miette::Result<()> {
    // We use rayon only for blocking syscalls (C9's shim fan-out), so we
    // multiply the number of threads by 3.
    let threads = available_parallelism().map(usize::from).unwrap_or(1) * 3;
    rayon::ThreadPoolBuilder::new().num_threads(threads).build_global().expect("build rayon thread pool");

    enable_tracing_by_env();
    set_panic_hook();
    CliArgs::parse().run().await
}
