//! Administrative actions against running AMF entities
//!
//! Actions are issued through the middleware's command line tools
//! (`amf-adm`, `immadm`). They are fire-and-forget from the scale services'
//! point of view: a failure is reported, never rolled back, and never aborts
//! the surrounding operation.

use std::fmt;
use std::future::Future;

use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::amf::{AdminOperation, CLM_ACTION_OPERATION_ID, CLM_ACTION_STOP_PARAM};
use crate::domain::dn::Dn;
use crate::error::AdminError;
use crate::tools::{get_tool_path, tools};

/// What to run against an object
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    /// `amf-adm <verb> <dn>`
    Amf(AdminOperation),
    /// `immadm -o <id> -p <param>... <dn>`
    Imm { operation_id: u32, params: Vec<String> },
}

/// An admin command bound to a target DN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAction {
    pub dn: Dn,
    pub command: AdminCommand,
}

impl AdminAction {
    pub fn amf(operation: AdminOperation, dn: &Dn) -> Self {
        Self {
            dn: dn.clone(),
            command: AdminCommand::Amf(operation),
        }
    }

    /// Stop the middleware daemon on a CLM node
    pub fn stop_daemon(clm_node: &Dn) -> Self {
        Self {
            dn: clm_node.clone(),
            command: AdminCommand::Imm {
                operation_id: CLM_ACTION_OPERATION_ID,
                params: vec![CLM_ACTION_STOP_PARAM.to_string()],
            },
        }
    }

    /// Program name and arguments
    pub fn argv(&self, amf_adm: &str, immadm: &str) -> (String, Vec<String>) {
        match &self.command {
            AdminCommand::Amf(op) => (
                amf_adm.to_string(),
                vec![op.verb().to_string(), self.dn.to_string()],
            ),
            AdminCommand::Imm {
                operation_id,
                params,
            } => {
                let mut args = vec!["-o".to_string(), operation_id.to_string()];
                for param in params {
                    args.push("-p".to_string());
                    args.push(param.clone());
                }
                args.push(self.dn.to_string());
                (immadm.to_string(), args)
            }
        }
    }
}

impl fmt::Display for AdminAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (program, args) = self.argv(tools::AMF_ADM, tools::IMMADM);
        write!(f, "{} {}", program, args.join(" "))
    }
}

/// Executes admin actions; returns the exit code
pub trait AdminInvoker {
    fn invoke(&self, action: &AdminAction) -> impl Future<Output = Result<i32, AdminError>>;

    /// Command line as this invoker would run it, for logging
    fn describe(&self, action: &AdminAction) -> String {
        action.to_string()
    }
}

/// Runs actions through the middleware command line tools
#[derive(Debug, Clone)]
pub struct AmfAdmClient {
    amf_adm: String,
    immadm: String,
}

impl Default for AmfAdmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl AmfAdmClient {
    /// Resolve tools from `AMF_ADM_BIN` / `IMMADM_BIN`, falling back to PATH
    pub fn new() -> Self {
        Self {
            amf_adm: get_tool_path(tools::AMF_ADM),
            immadm: get_tool_path(tools::IMMADM),
        }
    }

    /// Use explicit tool paths
    pub fn with_tools(amf_adm: impl Into<String>, immadm: impl Into<String>) -> Self {
        Self {
            amf_adm: amf_adm.into(),
            immadm: immadm.into(),
        }
    }

    /// True when both tools can be located
    pub fn tools_available(&self) -> bool {
        which::which(&self.amf_adm).is_ok() && which::which(&self.immadm).is_ok()
    }
}

impl AdminInvoker for AmfAdmClient {
    async fn invoke(&self, action: &AdminAction) -> Result<i32, AdminError> {
        let (program, args) = action.argv(&self.amf_adm, &self.immadm);
        let rendered = self.describe(action);
        debug!("Running: {}", rendered);

        let status = Command::new(&program)
            .args(&args)
            .status()
            .await
            .map_err(|e| AdminError::Spawn {
                tool: program.clone(),
                message: e.to_string(),
            })?;

        // Killed by a signal counts as failure too
        let code = status.code().unwrap_or(-1);
        if code != 0 {
            return Err(AdminError::NonZeroExit {
                command: rendered,
                code,
            });
        }
        Ok(code)
    }

    fn describe(&self, action: &AdminAction) -> String {
        let (program, args) = action.argv(&self.amf_adm, &self.immadm);
        format!("{} {}", program, args.join(" "))
    }
}

/// Logs actions instead of running them
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunInvoker;

impl AdminInvoker for DryRunInvoker {
    async fn invoke(&self, action: &AdminAction) -> Result<i32, AdminError> {
        info!("[dry-run] {}", action);
        Ok(0)
    }
}
