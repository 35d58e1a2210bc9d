// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain types and constants.

use alloy::primitives::{address, Address, TxHash, U256};
use serde::{Deserialize, Serialize};

/// Address used to denote the chain's native currency instead of an ERC-20.
pub const NATIVE_TOKEN: Address = Address::ZERO;

/// Decimals of the native currency (wei).
pub const NATIVE_DECIMALS: u8 = 18;

/// Sentinel allowance reported for the native currency, which never needs one.
///
/// Equal to `2^128 - 1`, the largest liquidity value the DEX accepts.
pub const MAX_LIQ: U256 = U256::from_limbs([u64::MAX, u64::MAX, 0, 0]);

/// Allowance granted by `approve`: `2^120`.
///
/// Mostly zero bytes in calldata, which the DEX charges less gas for, while
/// still exceeding any realistic transfer.
pub const APPROVE_AMOUNT: U256 = U256::from_limbs([0, 1 << 56, 0, 0]);

/// Proxy index for the DEX's cold-path `userCmd` entry point.
pub const COLD_PROXY_PATH: u16 = 0;

/// Sub-command codes understood by the cold path for surplus operations.
pub mod surplus_code {
    pub const DEPOSIT: u8 = 73;
    pub const WITHDRAW: u8 = 74;
    pub const TRANSFER: u8 = 75;
}

/// Deployment of the DEX on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainConfig {
    /// Network name for display
    pub name: String,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// `CrocSwapDex` contract address
    pub dex_address: Address,
    /// `CrocQuery` contract address
    pub query_address: Address,
    /// Block explorer URL
    pub explorer_url: String,
}

impl ChainConfig {
    /// Ethereum mainnet deployment.
    pub fn mainnet() -> Self {
        Self {
            name: "Ethereum Mainnet".to_string(),
            chain_id: 1,
            rpc_url: "https://ethereum-rpc.publicnode.com".to_string(),
            dex_address: address!("0xAaAaAAAaA24eEeb8d57D431224f73832bC34f688"),
            query_address: address!("0xc2e1f740E11294C64adE66f69a1271C5B32004c8"),
            explorer_url: "https://etherscan.io".to_string(),
        }
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &TxHash) -> String {
        format!("{}/tx/{:?}", self.explorer_url.trim_end_matches('/'), tx_hash)
    }
}

/// A token quantity, either exact in the token's smallest unit or a
/// human-readable decimal that still has to be scaled by the token decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenQty {
    /// Full-precision amount in the smallest unit (wei).
    Wei(U256),
    /// Decimal amount as text, e.g. `"1.5"`.
    Display(String),
}

impl From<U256> for TokenQty {
    fn from(value: U256) -> Self {
        Self::Wei(value)
    }
}

impl From<&str> for TokenQty {
    fn from(value: &str) -> Self {
        Self::Display(value.to_string())
    }
}

impl From<String> for TokenQty {
    fn from(value: String) -> Self {
        Self::Display(value)
    }
}

impl From<f64> for TokenQty {
    fn from(value: f64) -> Self {
        // `-0.0` would otherwise render as "-0".
        let value = if value == 0.0 { 0.0 } else { value };
        Self::Display(value.to_string())
    }
}

/// Handle for a transaction that has been submitted but not yet confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTx {
    /// Transaction hash
    pub tx_hash: TxHash,
}

/// Transaction receipt after confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Transaction hash
    pub tx_hash: TxHash,
    /// Block number where transaction was included
    pub block_number: u64,
    /// Gas actually used
    pub gas_used: u64,
    /// Whether the transaction was successful
    pub success: bool,
}
