//! Plant lifecycle store.
//!
//! Keyed registry of every plant slot the feed has reported. Each applied
//! record is classified into a [`GrowthStage`]; only a new slot or a stage
//! change produces a [`PlantChangeEvent::Replace`]. Same-stage records are
//! ignored entirely, including their recommended action.

pub mod placement;
pub mod stage;

use heapless::FnvIndexMap;
use log::{debug, warn};
use serde::Serialize;

use crate::config::MAX_PLANTS;
use crate::telemetry::record::{ActionKind, PlantId, PlantRecord};

pub use placement::Placement;
pub use stage::{GrowthStage, StageThresholds};

// ---------------------------------------------------------------------------
// Entity and events
// ---------------------------------------------------------------------------

/// Registry entry for one plant slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlantEntity {
    pub id: PlantId,
    pub stage: GrowthStage,
    pub displayed_action: Option<ActionKind>,
    pub placement: Placement,
}

/// Emitted when a slot's visual must be rebuilt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlantChangeEvent {
    /// Destroy the previous visual (if any) and create one for `stage`.
    Replace {
        id: PlantId,
        stage: GrowthStage,
        /// `None` for a slot seen for the first time.
        previous: Option<GrowthStage>,
        displayed_action: Option<ActionKind>,
        placement: Placement,
    },
}

/// Icon shown above a freshly built plant visual.
///
/// Ripe plants always show harvest and empty slots always show seed;
/// otherwise only water and fertilize recommendations are displayed.
pub fn displayed_action(stage: GrowthStage, recommended: Option<ActionKind>) -> Option<ActionKind> {
    match (stage, recommended) {
        (GrowthStage::Ripe, _) => Some(ActionKind::Harvest),
        (GrowthStage::Empty, _) => Some(ActionKind::Seed),
        (_, Some(action @ (ActionKind::Water | ActionKind::Fertilize))) => Some(action),
        (_, None) => None,
        (_, Some(other)) => {
            warn!("Lifecycle: recommendation {} not displayable for {:?}", other, stage);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

pub struct PlantLifecycleStore {
    thresholds: StageThresholds,
    entities: FnvIndexMap<PlantId, PlantEntity, MAX_PLANTS>,
}

impl PlantLifecycleStore {
    pub fn new(thresholds: StageThresholds) -> Self {
        Self {
            thresholds,
            entities: FnvIndexMap::new(),
        }
    }

    /// Apply one snapshot's plant records, returning a `Replace` for every
    /// new slot or stage change, in record order.
    pub fn apply(&mut self, records: &[PlantRecord]) -> Vec<PlantChangeEvent> {
        let mut changes = Vec::new();

        for record in records {
            let stage = self.thresholds.classify(record.age);
            let previous = self.entities.get(&record.id).map(|e| e.stage);

            if previous == Some(stage) {
                continue;
            }

            let entity = PlantEntity {
                id: record.id,
                stage,
                displayed_action: displayed_action(stage, record.recommended_action),
                placement: Placement::of(record.id),
            };

            if self.entities.insert(record.id, entity).is_err() {
                warn!("Lifecycle: registry full, plant {} not tracked", record.id);
                continue;
            }

            debug!(
                "Lifecycle: plant {} {:?} -> {:?}",
                record.id, previous, stage
            );
            changes.push(PlantChangeEvent::Replace {
                id: entity.id,
                stage,
                previous,
                displayed_action: entity.displayed_action,
                placement: entity.placement,
            });
        }

        changes
    }

    pub fn get(&self, id: PlantId) -> Option<&PlantEntity> {
        self.entities.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlantEntity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
