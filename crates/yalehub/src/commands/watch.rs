//! `watch`: run the poll loop and print every new snapshot.

use tracing::info;

use yalehub_core::{ConnectionState, Coordinator, PanelConfig};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::commands::status;
use crate::config::validated_secs;
use crate::error::CliError;
use crate::output;

pub async fn handle(
    mut panel: PanelConfig,
    args: WatchArgs,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let Some(secs) = args.interval {
        panel.poll_interval_secs = validated_secs("interval", secs)?.as_secs();
    }

    let coordinator = Coordinator::new(panel);
    let mut snapshots = coordinator.subscribe();
    let mut state = coordinator.connection_state();

    coordinator
        .start()
        .await
        .map_err(|e| CliError::from_refresh(e, profile))?;

    let result = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break Ok(());
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let latest = snapshots.borrow_and_update().clone();
                if let Some(snapshot) = latest {
                    output::print_output(&status::render(&snapshot, global), global.quiet);
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                if *state.borrow_and_update() == ConnectionState::AuthFailed {
                    break Err(CliError::AuthFailed {
                        profile: profile.into(),
                        message: "session rejected while polling".into(),
                    });
                }
            }
        }
    };

    coordinator.stop().await;
    result
}
