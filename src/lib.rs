//! quadrille: a composable multi-selection modal editing engine
//!
//! The engine is headless and backend-agnostic: hosts open documents and
//! editors, dispatch commands by identifier, and answer the interactive
//! prompt requests commands suspend on. Everything selection-shaped flows
//! through [`core::update`], so empty-set handling and abort-on-error
//! semantics are uniform across commands.

pub mod config;
pub mod core;
