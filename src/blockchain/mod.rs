// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain integration for a CrocSwap-style DEX.
//!
//! This module provides functionality for:
//! - Querying wallet, surplus, and allowance balances per token
//! - Converting between smallest-unit and decimal quantities
//! - Submitting approvals and surplus deposit/withdraw/transfer commands

pub mod context;
pub mod dex;
pub mod erc20;
pub mod token;
pub mod types;
pub mod units;

pub use context::{ContextError, CrocContext, DexContext};
pub use token::{TokenError, TokenView};
pub use types::*;
pub use units::{format_display_qty, parse_display_qty, UnitsError};
