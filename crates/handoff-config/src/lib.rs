// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Handoff inbox coordinator.
//!
//! TOML files following the XDG hierarchy, merged with `HANDOFF_*`
//! environment variable overrides via Figment.

pub mod loader;
pub mod model;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::HandoffConfig;
