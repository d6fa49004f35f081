//! The `mode` subcommand: change the update mode on VPA resources

use anyhow::Result;
use vpa_core::models::Mode;

use crate::client::{ClientError, ClusterClient};
use crate::commands::split_target;
use crate::output::{print_error, print_success};

pub async fn run(
    client: &ClusterClient,
    default_namespace: &str,
    mode: Mode,
    names: &[String],
) -> Result<()> {
    for input in names {
        let (namespace, name) = split_target(input, default_namespace);
        match client.set_update_mode(namespace, name, mode).await {
            Ok(()) => print_success(&format!("{namespace}/{name} set to {mode}")),
            Err(err @ ClientError::NotFound { .. }) => {
                // Keep going with the remaining names.
                print_error(&err.to_string());
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
