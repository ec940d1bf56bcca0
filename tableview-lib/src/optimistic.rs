//! Optimistic edits with a named rollback path.
//!
//! A cell shows the new value as soon as an edit begins. The remote write
//! then either commits it or rolls the cell back to the value it had
//! before the edit:
//!
//! ```text
//! Idle ──begin──▶ Pending ──commit───▶ Committed ──settle──▶ Idle
//!                    └──────rollback──▶ RolledBack ──settle──▶ Idle
//! ```

use async_trait::async_trait;
use log::debug;
use log::warn;

use crate::capabilities::EditableField;
use crate::capabilities::ViewerCapabilities;
use crate::error::OptimisticError;
use crate::error::PersistError;

/// Writes a value to the backend.
///
/// Implemented by whatever talks to the network; the pipeline only cares
/// whether the write happened.
#[async_trait]
pub trait Persist<V>: Send + Sync
where
    V: Send + Sync,
{
    /// Persists `value`.
    async fn persist(&self, value: &V) -> Result<(), PersistError>;
}

/// State of an optimistically edited value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellState<V> {
    /// No edit in flight.
    Idle(V),
    /// An edit is in flight.
    Pending {
        /// Value before the edit.
        previous: V,
        /// Value being written.
        proposed: V,
    },
    /// The edit was persisted.
    Committed(V),
    /// The edit failed and the previous value was restored.
    RolledBack(V),
}

/// A single editable value, such as a row's status.
#[derive(Debug, Clone)]
pub struct OptimisticCell<V> {
    state: CellState<V>,
}

impl<V: Clone> OptimisticCell<V> {
    /// Creates an idle cell.
    pub fn new(value: V) -> Self {
        Self {
            state: CellState::Idle(value),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &CellState<V> {
        &self.state
    }

    /// Returns `true` while an edit is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, CellState::Pending { .. })
    }

    /// Returns the value to display. While pending this is the proposed value.
    pub fn current(&self) -> &V {
        match &self.state {
            CellState::Idle(v) | CellState::Committed(v) | CellState::RolledBack(v) => v,
            CellState::Pending { proposed, .. } => proposed,
        }
    }

    /// Starts an edit, showing `proposed` immediately.
    pub fn begin(&mut self, proposed: V) -> Result<(), OptimisticError> {
        let previous = match &self.state {
            CellState::Pending { .. } => return Err(OptimisticError::AlreadyPending),
            CellState::Idle(v) | CellState::Committed(v) | CellState::RolledBack(v) => v.clone(),
        };
        self.state = CellState::Pending { previous, proposed };
        Ok(())
    }

    /// Accepts the pending edit.
    pub fn commit(&mut self) -> Result<(), OptimisticError> {
        let CellState::Pending { proposed, .. } = &self.state else {
            return Err(OptimisticError::NotPending);
        };
        self.state = CellState::Committed(proposed.clone());
        Ok(())
    }

    /// Reverts the pending edit to the value it replaced.
    pub fn rollback(&mut self) -> Result<(), OptimisticError> {
        let CellState::Pending { previous, .. } = &self.state else {
            return Err(OptimisticError::NotPending);
        };
        self.state = CellState::RolledBack(previous.clone());
        Ok(())
    }

    /// Returns a committed or rolled back cell to idle. Idle and pending
    /// cells are left alone.
    pub fn settle(&mut self) {
        if let CellState::Committed(v) | CellState::RolledBack(v) = &self.state {
            self.state = CellState::Idle(v.clone());
        }
    }
}

impl<V> OptimisticCell<V>
where
    V: Clone + Send + Sync,
{
    /// Shows `proposed`, persists it, then commits or rolls back.
    ///
    /// On failure the cell holds the previous value and the persist error is
    /// returned so the caller can show it. There is no retry.
    pub async fn apply<P>(&mut self, proposed: V, persister: &P) -> Result<(), OptimisticError>
    where
        P: Persist<V> + ?Sized,
    {
        self.begin(proposed)?;
        let result = persister.persist(self.current()).await;
        match result {
            Ok(()) => {
                debug!("optimistic update committed");
                self.commit()
            }
            Err(err) => {
                warn!("optimistic update rolled back: {}", err);
                self.rollback()?;
                Err(err.into())
            }
        }
    }

    /// Like [`apply`](Self::apply), for a viewer who must be allowed to edit
    /// `field`. A refused edit leaves the cell untouched and never reaches
    /// the persister.
    pub async fn apply_as<P>(
        &mut self,
        field: EditableField,
        capabilities: &ViewerCapabilities,
        proposed: V,
        persister: &P,
    ) -> Result<(), OptimisticError>
    where
        P: Persist<V> + ?Sized,
    {
        if !capabilities.can_edit(field) {
            warn!("refusing {} edit: viewer lacks permission", field);
            return Err(OptimisticError::NotPermitted(field));
        }
        self.apply(proposed, persister).await
    }
}

/// Last known-good copy of a collection.
///
/// Local edits go to the working copy; [`commit`](Self::commit) promotes
/// it and [`restore`](Self::restore) throws it away.
#[derive(Debug, Clone)]
pub struct Snapshot<S> {
    good: S,
    working: S,
}

impl<S: Clone> Snapshot<S> {
    /// Creates a snapshot where `value` is known-good.
    pub fn new(value: S) -> Self {
        Self {
            good: value.clone(),
            working: value,
        }
    }

    /// Returns the working copy.
    pub fn get(&self) -> &S {
        &self.working
    }

    /// Returns the last known-good copy.
    pub fn last_good(&self) -> &S {
        &self.good
    }

    /// Edits the working copy in place.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut S),
    {
        f(&mut self.working);
    }

    /// Marks the working copy as known-good.
    pub fn commit(&mut self) {
        self.good = self.working.clone();
    }

    /// Replaces both copies with authoritative state.
    pub fn reset(&mut self, value: S) {
        self.good = value.clone();
        self.working = value;
    }

    /// Reverts the working copy to the last known-good copy.
    pub fn restore(&mut self) {
        self.working = self.good.clone();
    }
}
