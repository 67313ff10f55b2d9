//! # boltgrant – Passbolt
//!
//! Folder sharing against a Passbolt server: a small REST client, name
//! resolution over fetched collections, the permission level codec and the
//! grant reconciler that converges declared grants with one share call each.

pub mod passbolt;
