//! Crowdsource authoring core.
//!
//! Pure in-memory logic for building task templates and tracking module
//! edits: the component catalog, the template item editor, module publish
//! rules, field diffing, project drafts, and the local cache. The only
//! I/O is [`cache::FileCache`]. Backend access is expressed as traits in
//! [`remote`] and implemented elsewhere.

pub mod cache;
pub mod component;
pub mod editor;
pub mod error;
pub mod item;
pub mod module;
pub mod naming;
pub mod patch;
pub mod preview;
pub mod project;
pub mod remote;
pub mod types;
