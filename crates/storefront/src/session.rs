use chrono::Utc;
use thiserror::Error;

use packbuilder_catalog::Catalog;
use packbuilder_core::{Aggregate, ProductId, SelectionId};
use packbuilder_events::{Event, SessionLog};
use packbuilder_selection::{
    AddUnit, RemoveUnit, Selection, SelectionCommand, SelectionError, SelectionEvent,
};

/// Failures surfaced to the interaction layer. None of them abort the
/// session; the selection stays exactly as it was.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    /// The id is not in the catalog. Caught here so the engine only ever
    /// sees tokens the storefront actually rendered controls for.
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),

    #[error(transparent)]
    Selection(#[from] SelectionError),
}

/// One shopper's pack-building session: the loaded catalog, the selection,
/// and the history of committed events.
///
/// The session never touches the unit sequence directly — all mutation goes
/// through [`Selection::handle`]/[`Selection::apply`], so the quota invariant
/// is enforced at a single choke point.
#[derive(Debug)]
pub struct StorefrontSession {
    catalog: Catalog,
    selection: Selection,
    log: SessionLog<SelectionEvent>,
}

impl StorefrontSession {
    /// Start a session over a loaded catalog with an empty selection.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            selection: Selection::new(SelectionId::new()),
            log: SessionLog::new(),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// History of committed events, in commit order.
    pub fn history(&self) -> &SessionLog<SelectionEvent> {
        &self.log
    }

    /// One more unit of `product_id` into the pack (the "+" control).
    pub fn increment(&mut self, product_id: &ProductId) -> Result<(), SessionError> {
        self.ensure_known(product_id)?;
        let cmd = SelectionCommand::AddUnit(AddUnit {
            selection_id: self.selection.id_typed(),
            product_id: product_id.clone(),
            occurred_at: Utc::now(),
        });
        self.dispatch(cmd)
    }

    /// One unit of `product_id` out of the pack (the "-" control).
    pub fn decrement(&mut self, product_id: &ProductId) -> Result<(), SessionError> {
        self.ensure_known(product_id)?;
        let cmd = SelectionCommand::RemoveUnit(RemoveUnit {
            selection_id: self.selection.id_typed(),
            product_id: product_id.clone(),
            occurred_at: Utc::now(),
        });
        self.dispatch(cmd)
    }

    fn ensure_known(&self, product_id: &ProductId) -> Result<(), SessionError> {
        if !self.catalog.contains(product_id) {
            tracing::warn!(product = %product_id, "interaction for a product not in the catalog");
            return Err(SessionError::UnknownProduct(product_id.clone()));
        }
        Ok(())
    }

    fn dispatch(&mut self, cmd: SelectionCommand) -> Result<(), SessionError> {
        let events = match self.selection.handle(&cmd) {
            Ok(events) => events,
            Err(err) => {
                // Defensive guard fired; the control should have been
                // disabled, so this is a quiet no-op.
                tracing::debug!(%err, "selection command rejected");
                return Err(err.into());
            }
        };

        for event in events {
            self.selection.apply(&event);
            let sequence = self.log.append(event.clone());
            tracing::info!(
                event = event.event_type(),
                sequence,
                remaining = self.selection.remaining_quota(),
                "selection updated"
            );
        }
        Ok(())
    }
}
