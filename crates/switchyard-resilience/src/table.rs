// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static tier-to-handler table, built once at startup.

use std::sync::Arc;

use switchyard_core::{SwitchyardError, Tier, TierHandler};

/// One handler per tier. Construction fails unless every tier is covered.
#[derive(Clone)]
pub struct HandlerTable {
    handlers: [Arc<dyn TierHandler>; 5],
}

impl HandlerTable {
    pub fn builder() -> HandlerTableBuilder {
        HandlerTableBuilder::default()
    }

    pub fn get(&self, tier: Tier) -> &Arc<dyn TierHandler> {
        &self.handlers[tier.index()]
    }

    /// `(tier, handler name)` for every tier, ascending.
    pub fn names(&self) -> Vec<(Tier, String)> {
        Tier::ALL
            .iter()
            .map(|t| (*t, self.get(*t).name().to_string()))
            .collect()
    }
}

impl std::fmt::Debug for HandlerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.names()).finish()
    }
}

#[derive(Default)]
pub struct HandlerTableBuilder {
    slots: [Option<Arc<dyn TierHandler>>; 5],
}

impl HandlerTableBuilder {
    /// Register the handler for `tier`, replacing any earlier registration.
    pub fn handler(mut self, tier: Tier, handler: Arc<dyn TierHandler>) -> Self {
        self.slots[tier.index()] = Some(handler);
        self
    }

    /// Register the same handler for every tier still missing one.
    pub fn fill_missing(mut self, handler: Arc<dyn TierHandler>) -> Self {
        for slot in self.slots.iter_mut().filter(|s| s.is_none()) {
            *slot = Some(Arc::clone(&handler));
        }
        self
    }

    pub fn build(self) -> Result<HandlerTable, SwitchyardError> {
        let [l1, l2, l3, l4, l5] = self.slots;
        let require = |slot: Option<Arc<dyn TierHandler>>, tier: Tier| {
            slot.ok_or(SwitchyardError::HandlerNotRegistered { tier })
        };
        Ok(HandlerTable {
            handlers: [
                require(l1, Tier::L1)?,
                require(l2, Tier::L2)?,
                require(l3, Tier::L3)?,
                require(l4, Tier::L4)?,
                require(l5, Tier::L5)?,
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use switchyard_core::{HandlerError, TierRequest, TierResponse, TokenUsage};

    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl TierHandler for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn handle(&self, _request: &TierRequest) -> Result<TierResponse, HandlerError> {
            Ok(TierResponse {
                content: self.0.to_string(),
                tokens: TokenUsage::new(1, 1),
                cost: 0.0,
            })
        }
    }

    #[test]
    fn missing_tier_is_rejected() {
        let result = HandlerTable::builder()
            .handler(Tier::L1, Arc::new(Named("a")))
            .handler(Tier::L2, Arc::new(Named("b")))
            .handler(Tier::L4, Arc::new(Named("d")))
            .handler(Tier::L5, Arc::new(Named("e")))
            .build();
        assert!(matches!(
            result,
            Err(SwitchyardError::HandlerNotRegistered { tier: Tier::L3 })
        ));
    }

    #[test]
    fn complete_table_maps_each_tier() {
        let table = HandlerTable::builder()
            .handler(Tier::L5, Arc::new(Named("big")))
            .fill_missing(Arc::new(Named("small")))
            .build()
            .unwrap();
        assert_eq!(table.get(Tier::L5).name(), "big");
        assert_eq!(table.get(Tier::L1).name(), "small");
        assert_eq!(table.names().len(), 5);
    }
}
