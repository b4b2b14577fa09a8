// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod config;
pub mod context;
pub mod markers;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod resource;
pub mod session;
