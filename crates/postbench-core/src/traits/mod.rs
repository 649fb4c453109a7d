// SPDX-FileCopyrightText: 2026 Postbench Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait seams between the writer and its front-ends.

pub mod writer;

pub use writer::PostWriter;
