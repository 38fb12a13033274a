//! Selection Update Engine
//!
//! All multi-selection commands funnel their changes through these two
//! functions. A mapping closure is applied to every selection; returning
//! `None` drops the selection, returning an error aborts the whole update
//! and leaves the prior selection set untouched. What happens when every
//! selection is dropped is never implicit: each call site names its
//! `EmptyPolicy`.

use tracing::trace;

use crate::core::document::Document;
use crate::core::error::EngineError;
use crate::core::position::Position;
use crate::core::selection::Selection;

/// What to do when an update drops every selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Fail the update with [`EngineError::EmptySelectionSet`], keeping
    /// the prior selections
    Reject,
    /// Replace the set with a single empty selection at the document start
    FallbackToStart,
}

/// Map `f` over each selection by index, dropping `None` results.
///
/// The new set replaces the old one only if `f` never errors; results are
/// kept in mapping order and not re-sorted.
pub fn update_by_index<F>(
    selections: &mut Vec<Selection>,
    document: &Document,
    policy: EmptyPolicy,
    mut f: F,
) -> Result<(), EngineError>
where
    F: FnMut(usize, &Selection, &Document) -> Result<Option<Selection>, EngineError>,
{
    let mut updated = Vec::with_capacity(selections.len());

    for (index, selection) in selections.iter().enumerate() {
        match f(index, selection, document)? {
            Some(mapped) => updated.push(mapped),
            None => trace!(index, %selection, "selection dropped by update"),
        }
    }

    commit(selections, updated, policy)
}

/// Hand the whole selection list to one closure, for updates that need to
/// see every selection at once (rotation, merging). Same empty-set and
/// abort semantics as [`update_by_index`].
pub fn update_all<F>(
    selections: &mut Vec<Selection>,
    document: &Document,
    policy: EmptyPolicy,
    f: F,
) -> Result<(), EngineError>
where
    F: FnOnce(&[Selection], &Document) -> Result<Vec<Selection>, EngineError>,
{
    let updated = f(selections, document)?;
    commit(selections, updated, policy)
}

fn commit(
    selections: &mut Vec<Selection>,
    updated: Vec<Selection>,
    policy: EmptyPolicy,
) -> Result<(), EngineError> {
    if updated.is_empty() {
        match policy {
            EmptyPolicy::Reject => return Err(EngineError::EmptySelectionSet),
            EmptyPolicy::FallbackToStart => {
                trace!("empty selection set, falling back to document start");
                *selections = vec![Selection::empty(Position::zero())];
                return Ok(());
            }
        }
    }

    *selections = updated;
    Ok(())
}
