//! Entity contract: identity + creation/modification timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::id::EntityId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Returns the bookkeeping fields shared by every persisted entity.
    fn base(&self) -> &BaseEntity;

    /// Returns the entity identifier.
    fn id(&self) -> EntityId {
        self.base().id()
    }
}

/// Fields carried by every persisted domain entity.
///
/// - `id` is assigned at creation and never reassigned.
/// - `creation_date` is set once at creation.
/// - `last_modified_date` stays unset until the first mutation, then tracks the
///   latest one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseEntity {
    id: EntityId,
    creation_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified_date: Option<DateTime<Utc>>,
}

impl BaseEntity {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_id(EntityId::new(), now)
    }

    pub fn with_id(id: EntityId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            creation_date: now,
            last_modified_date: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn creation_date(&self) -> DateTime<Utc> {
        self.creation_date
    }

    pub fn last_modified_date(&self) -> Option<DateTime<Utc>> {
        self.last_modified_date
    }

    /// Record a mutation at `now`.
    ///
    /// Timestamps never move backwards: `now` must not precede the creation date
    /// or the previous modification.
    pub fn touch(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        let floor = self.last_modified_date.unwrap_or(self.creation_date);
        if now < floor {
            return Err(DomainError::validation(format!(
                "modification time {now} precedes {floor}"
            )));
        }
        self.last_modified_date = Some(now);
        Ok(())
    }
}
