//! Background loader for closure statuses.
//!
//! Closure status for many cycle keys is slow state, fetched after the fast
//! state (schedule, goals, monthly net) is already on screen. Refreshes may
//! overlap; only the response of the most recent refresh is kept.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, warn};

use super::closures_model::CycleClosure;
use super::closures_traits::ClosureServiceTrait;
use crate::errors::Result;
use crate::utils::request_token::LatestValue;

pub struct ClosureStatusLoader {
    service: Arc<dyn ClosureServiceTrait>,
    state: LatestValue<HashMap<String, CycleClosure>>,
}

impl ClosureStatusLoader {
    pub fn new(service: Arc<dyn ClosureServiceTrait>) -> Self {
        Self {
            service,
            state: LatestValue::new(),
        }
    }

    /// Fetches closures for `cycle_keys`. Returns `Ok(false)` when a newer
    /// refresh started meanwhile and this response was dropped. On error the
    /// previous map is kept.
    pub async fn refresh(&self, household_id: &str, cycle_keys: &[String]) -> Result<bool> {
        let token = self.state.begin();
        match self.service.list_closures(household_id, cycle_keys).await {
            Ok(closures) => {
                let stored = self.state.commit(token, closures);
                if !stored {
                    debug!(
                        "Dropping stale closure status response for household {}",
                        household_id
                    );
                }
                Ok(stored)
            }
            Err(e) => {
                warn!(
                    "Closure status lookup failed for household {}: {}",
                    household_id, e
                );
                Err(e)
            }
        }
    }

    pub fn snapshot(&self) -> HashMap<String, CycleClosure> {
        self.state.get()
    }

    pub fn closure(&self, cycle_key: &str) -> Option<CycleClosure> {
        self.state.get().remove(cycle_key)
    }

    pub fn is_closed(&self, cycle_key: &str) -> bool {
        self.state.get().contains_key(cycle_key)
    }
}
