use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tracing::warn;

mod cli;

use amf_scale::config::ScaleConfig;
use amf_scale::infrastructure::{AdminInvoker, AmfAdmClient, DryRunInvoker, SnapshotStore};
use amf_scale::services::{
    ScaleInReport, ScaleOptions, ScaleOutOutcome, ScaleOutReport, ScaleService,
};
use amf_scale::ui;
use cli::{local_hostname, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with LOGGING env var support
    // LOGGING=debug,info,warn,error or just LOGGING=debug
    let log_level = std::env::var("LOGGING")
        .or_else(|_| std::env::var("LOG_LEVEL"))
        .unwrap_or_else(|_| {
            if cli.verbose {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        });

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(false)
        .init();

    let config = ScaleConfig::load(cli.config.as_deref())?;
    let snapshot = cli.store.clone().unwrap_or_else(|| config.store.snapshot.clone());
    let store = SnapshotStore::load(&snapshot)
        .with_context(|| format!("Failed to open store {}", snapshot.display()))?;
    let options = ScaleOptions::default()
        .with_fingerprint_len(config.rewrite.fingerprint_len)
        .with_echo_objects(!cli.json);

    let result = if cli.dry_run {
        if !cli.json {
            ui::print_warning("Dry run: admin actions are only logged, the store is not saved");
        }
        let service = ScaleService::new(store.detached(), DryRunInvoker).with_options(options);
        run(&cli, service).await
    } else {
        let admin = AmfAdmClient::with_tools(config.tools.amf_adm(), config.tools.immadm());
        if !admin.tools_available() {
            warn!("Admin tools not found; admin actions will fail and be reported");
        }
        run(&cli, ScaleService::new(store, admin).with_options(options)).await
    };

    if let Err(e) = result {
        ui::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
    Ok(())
}

// Commits are written through to the snapshot file before any follow-up admin action
async fn run<A: AdminInvoker>(
    cli: &Cli,
    mut service: ScaleService<SnapshotStore, A>,
) -> Result<()> {
    match &cli.command {
        Commands::ScaleIn { hostname } => {
            if !cli.json {
                ui::print_header(&format!("Scale-in: {}", hostname));
            }
            let report = service
                .scale_in(hostname)
                .await
                .with_context(|| format!("Scale-in of {} failed", hostname))?;
            print_scale_in(cli.json, &report);
        }
        Commands::ScaleOut { hostname, copy_from } => {
            let template = copy_from
                .clone()
                .or_else(local_hostname)
                .context("--copy-from not given and the local host name is unknown")?;
            if !cli.json {
                ui::print_header(&format!("Scale-out: {} (from {})", hostname, template));
            }
            let outcome = service
                .scale_out(hostname, &template)
                .await
                .with_context(|| format!("Scale-out of {} failed", hostname))?;
            match outcome {
                ScaleOutOutcome::AlreadyScaled { hostname } => {
                    if cli.json {
                        println!("{}", json!({ "hostname": hostname, "already_scaled": true }));
                    } else {
                        ui::print_info(&format!(
                            "{} already hosts service units, nothing to do",
                            hostname
                        ));
                    }
                }
                ScaleOutOutcome::Scaled(report) => {
                    print_scale_out(cli.json, &report);
                }
            }
        }
    }
    Ok(())
}

fn print_scale_in(as_json: bool, report: &ScaleInReport) {
    if as_json {
        let value = json!({
            "hostname": report.node.hostname,
            "amf_node": report.node.amf_node,
            "clm_node": report.node.clm_node,
            "service_units": report.service_units,
            "service_instances": report.service_instances,
            "node_groups": report.node_groups,
            "operations": strings(&report.operations),
            "admin_failures": report.admin_failures,
        });
        println!("{}", value);
        return;
    }

    ui::print_list("Service units removed", &strings(&report.service_units));
    ui::print_list("Service instances removed", &strings(&report.service_instances));
    ui::print_list("Node groups left", &strings(&report.node_groups));
    if report.admin_failures > 0 {
        ui::print_warning(&format!("{} admin actions failed", report.admin_failures));
    }
    ui::print_success(&format!(
        "{} removed ({} operations committed)",
        report.node.hostname,
        report.operations.len()
    ));
}

fn print_scale_out(as_json: bool, report: &ScaleOutReport) {
    if as_json {
        let value = json!({
            "hostname": report.hostname,
            "template": report.template,
            "amf_node": report.new_node,
            "clm_node": report.new_clm_node,
            "created": report.created,
            "node_groups": report.node_groups,
            "admin_failures": report.admin_failures,
            "nonce": report.nonce,
        });
        println!("{}", value);
        return;
    }

    ui::print_list("Node groups joined", &strings(&report.node_groups));
    if report.admin_failures > 0 {
        ui::print_warning(&format!("{} admin actions failed", report.admin_failures));
    }
    ui::print_success(&format!(
        "{} added as a copy of {} ({} objects created)",
        report.hostname,
        report.template,
        report.created.len()
    ));
}

fn strings<T: ToString>(items: &[T]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}
