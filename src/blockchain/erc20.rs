// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! ERC-20 token contract interactions.

use alloy::{
    primitives::{Address, U256},
    providers::Provider,
    sol,
};

use super::context::ContextError;
use super::types::PendingTx;

// Define the ERC-20 interface using alloy's sol! macro
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}

/// ERC-20 contract wrapper.
pub struct Erc20Contract<P> {
    contract: IERC20::IERC20Instance<P>,
}

impl<P: Provider + Clone> Erc20Contract<P> {
    /// Bind the ERC-20 interface to a token address.
    pub fn new(provider: &P, token: Address) -> Self {
        Self {
            contract: IERC20::new(token, provider.clone()),
        }
    }

    /// Get the token decimals.
    pub async fn decimals(&self) -> Result<u8, ContextError> {
        self.contract
            .decimals()
            .call()
            .await
            .map_err(|e| ContextError::Contract(e.to_string()))
    }

    /// Get the balance of an address.
    pub async fn balance_of(&self, owner: Address) -> Result<U256, ContextError> {
        self.contract
            .balanceOf(owner)
            .call()
            .await
            .map_err(|e| ContextError::Contract(e.to_string()))
    }

    /// Get the amount `spender` may move on behalf of `owner`.
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, ContextError> {
        self.contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| ContextError::Contract(e.to_string()))
    }

    /// Submit an `approve(spender, amount)` transaction.
    pub async fn approve(&self, spender: Address, amount: U256) -> Result<PendingTx, ContextError> {
        let pending = self
            .contract
            .approve(spender, amount)
            .send()
            .await
            .map_err(|e| ContextError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(PendingTx {
            tx_hash: *pending.tx_hash(),
        })
    }
}
