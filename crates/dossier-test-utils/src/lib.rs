// SPDX-FileCopyrightText: 2026 Dossier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Dossier integration tests.
//!
//! Mock adapters and a harness that assembles a full chat pipeline over a
//! temporary ledger directory, so tests run without network access.

pub mod harness;
pub mod mock_embedder;
pub mod mock_provider;
pub mod retriever;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_embedder::MockEmbedder;
pub use mock_provider::MockProvider;
pub use retriever::CountingRetriever;
