// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod job;
pub mod logging;
pub mod net;
pub mod types;

use std::io::Write;

use anyhow::{Result, bail};
use tracing::{debug, error, info, warn};

use crate::cli::CliArgs;
use crate::config::model::BuildFile;
use crate::config::{JobSet, build_jobs, load_and_validate};
use crate::dag::HeapJobOrderer;
use crate::engine::{Client, ClientEvent};
use crate::exec::TcpConnectionFactory;
use crate::net::parse_address;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - build description loading
/// - job graph + orderer
/// - the distribution client over TCP connections
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.jobs)?;
    let job_set = build_jobs(&cfg)?;

    if args.dry_run {
        print_dry_run(&cfg, &job_set);
        return Ok(());
    }

    let daemons = daemon_addresses(&args, &cfg)?;
    if daemons.is_empty() {
        bail!("no daemons configured; pass --daemon HOST:PORT or set [client].daemons");
    }

    let roots = job_set.roots_for(args.target.as_deref())?;
    info!(
        roots = ?roots.iter().map(|j| j.target()).collect::<Vec<_>>(),
        daemons = daemons.len(),
        "starting distribution"
    );

    let orderer = HeapJobOrderer::new(&roots);
    let (client, mut events) = Client::new(TcpConnectionFactory::new(), orderer);

    // Ctrl-C → stop handing out jobs.
    {
        let client = client.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "failed to listen for Ctrl+C");
                return;
            }
            info!("Ctrl+C received; closing daemons");
            client.quit();
        });
    }

    for (host, port) in daemons.iter() {
        client.introduce(host.clone(), *port);
    }

    // Daemons that never connected or whose connection broke.
    let mut lost_daemons = 0usize;

    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Progress { job, result } => {
                write_job_output(&result.stdout);
                if result.is_success() {
                    info!(job = %job.target(), "built");
                } else {
                    error!(job = %job.target(), status = result.status, "build step failed");
                    if !result.stderr.is_empty() {
                        eprint!("{}", String::from_utf8_lossy(&result.stderr));
                    }
                }
            }
            ClientEvent::ConnectFailed { address, error } => {
                warn!(%address, %error, "daemon unavailable");
                lost_daemons += 1;
                if lost_daemons == daemons.len() {
                    client.quit();
                    bail!("no daemon left to run jobs on");
                }
            }
            ClientEvent::Disconnected { address } => {
                warn!(%address, "daemon connection lost");
                lost_daemons += 1;
                if lost_daemons == daemons.len() {
                    client.quit();
                    bail!("no daemon left to run jobs on");
                }
            }
            ClientEvent::WorkerFailed { address, error } => {
                error!(%address, %error, "worker failed");
            }
            ClientEvent::Done { success } => {
                if success {
                    info!("all jobs completed");
                    return Ok(());
                }
                bail!("build failed");
            }
        }
    }

    bail!("client stopped without reporting completion")
}

/// Merge `--daemon` flags with `[client].daemons`, dropping duplicates.
fn daemon_addresses(args: &CliArgs, cfg: &BuildFile) -> Result<Vec<(String, u16)>> {
    let mut out: Vec<(String, u16)> = Vec::new();
    for address in args.daemons.iter().chain(cfg.client.daemons.iter()) {
        let parsed = parse_address(address)?;
        if !out.contains(&parsed) {
            out.push(parsed);
        }
    }
    Ok(out)
}

fn write_job_output(stdout: &[u8]) {
    if stdout.is_empty() {
        return;
    }
    let mut out = std::io::stdout().lock();
    if let Err(e) = out.write_all(stdout).and_then(|_| out.flush()) {
        debug!(error = %e, "failed to forward job output");
    }
}

/// Simple dry-run output: print jobs, prerequisites, commands and images.
fn print_dry_run(cfg: &BuildFile, job_set: &JobSet) {
    println!("junknet dry-run");
    println!("  default.image = {}", cfg.default.image);
    if !cfg.client.daemons.is_empty() {
        println!("  client.daemons = {:?}", cfg.client.daemons);
    }
    println!();

    println!("jobs ({}):", job_set.len());
    for job in job_set.jobs() {
        println!("  - {}", job.target());
        println!("      image: {}", job.environment().docker_image);
        for cmd in job.commands() {
            println!("      cmd: {cmd}");
        }
        let after: Vec<&str> = job.prerequisite_jobs().map(|j| j.target()).collect();
        if !after.is_empty() {
            println!("      after: {:?}", after);
        }
        let inputs: Vec<&str> = job.prerequisite_files().collect();
        if !inputs.is_empty() {
            println!("      inputs: {:?}", inputs);
        }
    }

    let roots: Vec<&str> = job_set.roots().iter().map(|j| j.target()).collect();
    println!();
    println!("roots: {:?}", roots);

    debug!("dry-run complete (no execution)");
}
