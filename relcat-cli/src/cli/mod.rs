// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for relcat

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
