// src/domain/services/fanout_service.rs
//
// Sends the emergency push to every candidate, at most once each, and folds
// the per-recipient results into a FanoutResult. A failing recipient only ever
// affects its own outcome.

use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::application::ports::output::push_delivery_port::{
    DeliveryReceipt, DispatchError, PushDeliveryPort, PushMessage,
};
use crate::domain::entities::dispatch::{DispatchOutcome, FanoutResult};
use crate::domain::entities::emergency::EmergencyEvent;
use crate::domain::entities::location::LocationRecord;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FanoutSettings {
    /// Upper bound on concurrent transport calls for one event.
    pub max_in_flight: usize,
    /// Time budget for the whole fan-out. Dispatches still pending when it
    /// elapses are abandoned and reported as failed.
    pub deadline: Option<Duration>,
}

impl Default for FanoutSettings {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            deadline: None,
        }
    }
}

pub struct FanoutService {
    transport: Arc<dyn PushDeliveryPort>,
    settings: FanoutSettings,
}

impl FanoutService {
    pub fn new(transport: Arc<dyn PushDeliveryPort>, settings: FanoutSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Push `event` to each candidate and aggregate the outcomes.
    ///
    /// Candidates without a push token, and the reporter, are skipped and do not
    /// appear in the result. Outcomes are returned in candidate order whatever
    /// order the sends complete in.
    pub async fn dispatch(&self, event: &EmergencyEvent, candidates: &[LocationRecord]) -> FanoutResult {
        let targets: Vec<(&str, PushMessage)> = candidates
            .iter()
            .filter(|candidate| candidate.user_id != event.reporter_id)
            .filter_map(|candidate| {
                let token = candidate.push_token()?;
                Some((candidate.user_id.as_str(), PushMessage::emergency(event, token)))
            })
            .collect();

        if targets.is_empty() {
            return FanoutResult::default();
        }

        let mut slots: Vec<Option<Result<DeliveryReceipt, DispatchError>>> =
            targets.iter().map(|_| None).collect();
        let mut queue = targets.iter().enumerate();
        let mut pending = FuturesUnordered::new();

        for (index, (_, message)) in queue.by_ref().take(self.settings.max_in_flight.max(1)) {
            pending.push(self.send_indexed(index, message));
        }
        debug!(
            "Dispatching emergency {} to {} recipients ({} in flight)",
            event.id,
            targets.len(),
            pending.len()
        );

        let deadline = self.settings.deadline.map(|budget| Instant::now() + budget);
        let expired = async move {
            match deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => futures::future::pending::<()>().await,
            }
        };
        tokio::pin!(expired);

        while !pending.is_empty() {
            tokio::select! {
                biased;

                Some((index, result)) = pending.next() => {
                    slots[index] = Some(result);
                    if let Some((next, (_, message))) = queue.next() {
                        pending.push(self.send_indexed(next, message));
                    }
                }

                _ = &mut expired => {
                    warn!(
                        "Fan-out deadline elapsed for emergency {}; abandoning {} dispatches",
                        event.id,
                        slots.iter().filter(|slot| slot.is_none()).count()
                    );
                    break;
                }
            }
        }

        let outcomes = targets
            .iter()
            .zip(slots)
            .map(|((user_id, _), slot)| {
                let result = slot.unwrap_or(Err(DispatchError::Abandoned));
                if let Err(error) = &result {
                    warn!("Push to user {} failed: {}", user_id, error);
                }
                DispatchOutcome::from_result(*user_id, result)
            })
            .collect();

        FanoutResult::from_outcomes(outcomes)
    }

    async fn send_indexed(
        &self,
        index: usize,
        message: &PushMessage,
    ) -> (usize, Result<DeliveryReceipt, DispatchError>) {
        (index, self.transport.send(message).await)
    }
}
