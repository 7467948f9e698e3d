//! Long-poll for the opponent's move, with the 5xx retry loop.

use std::time::Duration;

use derive_getters::Getters;
use tracing::{info, instrument, warn};

use crate::transport::{GameApi, OpponentUpdate, SessionIds, Transport, TransportError};

/// How the long-poll reacts to 5xx answers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Getters, derive_new::new)]
pub struct PollPolicy {
    /// Pause before re-issuing the poll.
    retry_delay: Duration,
    /// Cap on total attempts; `None` leaves it to the server.
    max_attempts: Option<u32>,
}

/// Polls until the server answers with something other than a 5xx.
///
/// Only [`TransportError::is_transient`] failures are retried, with the
/// identical request. When `max_attempts` is reached the last failure is
/// returned.
#[instrument(skip(api, ids, policy), fields(game_id = %ids.game_id(), player_id = %ids.player_id()))]
pub async fn await_opponent_move<T: Transport>(
    api: &GameApi<T>,
    ids: &SessionIds,
    policy: &PollPolicy,
) -> Result<OpponentUpdate, TransportError> {
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);
        match api.poll_move(ids).await {
            Err(e) if e.is_transient() => {
                if policy.max_attempts.is_some_and(|max| attempt >= max) {
                    warn!(attempt, error = %e, "Giving up on long-poll");
                    return Err(e);
                }
                warn!(attempt, error = %e, "Long-poll hit a server error, polling again");
                if !policy.retry_delay.is_zero() {
                    tokio::time::sleep(policy.retry_delay).await;
                }
            }
            other => {
                info!(attempt, ok = other.is_ok(), "Long-poll finished");
                return other;
            }
        }
    }
}
