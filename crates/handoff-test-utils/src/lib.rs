// SPDX-FileCopyrightText: 2026 Handoff Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for the Handoff workspace: scriptable mock
//! implementations of the two external collaborators.

pub mod mock_backend;
pub mod mock_transport;

pub use mock_backend::MockBackend;
pub use mock_transport::MockTransport;
