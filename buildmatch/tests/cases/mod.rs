// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration test cases.
//!
//! Each test prepares a workspace in a temporary directory, writes a build
//! output into it and checks the markers the executable reports.

pub mod config;
pub mod exit_codes;
pub mod file_matching;
