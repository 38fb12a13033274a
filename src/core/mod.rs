//! The core, headless editing engine.
//!
//! It manages fundamental components such as documents, editors (logical
//! views), the selection model, command dispatch, registers, histories,
//! and interactive prompt plumbing.

pub mod combinators;
pub mod command;
pub mod commands;
pub mod context;
pub mod document;
pub mod error;
pub mod history;
pub mod id;
pub mod position;
pub mod prompt;
pub mod register;
pub mod seek;
pub mod selection;
pub mod update;
