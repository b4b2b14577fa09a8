// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared infrastructure of the integration tests.

pub mod infrastructure;

#[allow(unused_imports)]
pub use infrastructure::*;
