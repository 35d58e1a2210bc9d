// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Croc Tokens - token views over a CrocSwap-style DEX
//!
//! This crate exposes per-token wallet, surplus, and allowance queries plus
//! approvals and surplus deposit/withdraw/transfer commands, all forwarded
//! to the DEX contracts through alloy.
//!
//! ## Modules
//!
//! - `blockchain` - Contract bindings, connection context, token views
//! - `config` - Environment configuration
//! - `telemetry` - Logging setup

pub mod blockchain;
pub mod config;
pub mod telemetry;
