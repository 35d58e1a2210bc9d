// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and loads the DEX
//! deployment settings from the environment. Unset variables fall back to
//! the Ethereum mainnet deployment.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CROC_RPC_URL` | JSON-RPC endpoint | public mainnet endpoint |
//! | `CROC_CHAIN_ID` | Expected chain ID | `1` |
//! | `CROC_DEX_ADDRESS` | `CrocSwapDex` contract | mainnet deployment |
//! | `CROC_QUERY_ADDRESS` | `CrocQuery` contract | mainnet deployment |
//! | `CROC_EXPLORER_URL` | Block explorer base URL | `https://etherscan.io` |
//! | `CROC_PRIVATE_KEY` | Hex signing key for write commands | Optional |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::str::FromStr;

use alloy::primitives::Address;

use crate::blockchain::{ChainConfig, ContextError};

pub const RPC_URL_ENV: &str = "CROC_RPC_URL";
pub const CHAIN_ID_ENV: &str = "CROC_CHAIN_ID";
pub const DEX_ADDRESS_ENV: &str = "CROC_DEX_ADDRESS";
pub const QUERY_ADDRESS_ENV: &str = "CROC_QUERY_ADDRESS";
pub const EXPLORER_URL_ENV: &str = "CROC_EXPLORER_URL";

/// Hex-encoded private key. Never logged.
pub const PRIVATE_KEY_ENV: &str = "CROC_PRIVATE_KEY";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Load the chain configuration from the process environment.
pub fn chain_config_from_env() -> Result<ChainConfig, ContextError> {
    chain_config_from(|key| std::env::var(key).ok())
}

/// Build a chain configuration from a variable lookup, starting from mainnet.
pub fn chain_config_from<F>(lookup: F) -> Result<ChainConfig, ContextError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
    let mut config = ChainConfig::mainnet();

    if let Some(url) = var(RPC_URL_ENV) {
        config.name = "Custom".to_string();
        config.rpc_url = url;
    }
    if let Some(raw) = var(CHAIN_ID_ENV) {
        config.chain_id = raw
            .parse()
            .map_err(|_| ContextError::Config(format!("{CHAIN_ID_ENV} is not a number: {raw}")))?;
    }
    if let Some(raw) = var(DEX_ADDRESS_ENV) {
        config.dex_address = parse_address(DEX_ADDRESS_ENV, &raw)?;
    }
    if let Some(raw) = var(QUERY_ADDRESS_ENV) {
        config.query_address = parse_address(QUERY_ADDRESS_ENV, &raw)?;
    }
    if let Some(url) = var(EXPLORER_URL_ENV) {
        config.explorer_url = url;
    }

    Ok(config)
}

fn parse_address(key: &str, raw: &str) -> Result<Address, ContextError> {
    Address::from_str(raw).map_err(|e| ContextError::InvalidAddress(format!("{key}: {e}")))
}
