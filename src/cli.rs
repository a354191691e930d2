//! CLI definitions for amf-scale
//!
//! This module contains all CLI argument parsing structures using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "amf-scale",
    version,
    about = "Scale-in / scale-out of service-availability cluster nodes",
    long_about = "Adds a node by cloning another node's configuration footprint, or removes a node \
                  and everything hosted on it, in one atomic IMM change bundle."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: amf-scale.yaml when present)
    #[arg(long, global = true, env = "AMF_SCALE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Snapshot file backing the store (overrides the config file)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log admin actions instead of running them and do not persist the store
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove a node and its scalable footprint from the cluster
    ScaleIn {
        /// Host name of the node to remove
        #[arg(long, required = true)]
        hostname: String,
    },

    /// Add a node by cloning another node's scalable footprint
    ScaleOut {
        /// Host name of the new node
        #[arg(long, required = true)]
        hostname: String,

        /// Template node (default: this host)
        #[arg(long)]
        copy_from: Option<String>,
    },
}

/// This machine's host name: `HOSTNAME`, then `/etc/hostname`
pub fn local_hostname() -> Option<String> {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}
