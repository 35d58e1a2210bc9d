// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Connection context shared by every token view.
//!
//! [`DexContext`] is the collaborator surface a [`TokenView`] needs: the DEX
//! address and its `userCmd` entry point, ERC-20 reads and approvals, the
//! surplus query, and native balances. [`CrocContext`] implements it on top
//! of an alloy HTTP provider.
//!
//! [`TokenView`]: super::token::TokenView

use std::future::Future;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, Bytes, TxHash, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    signers::local::PrivateKeySigner,
};

use super::dex::{ICrocQuery, ICrocSwapDex};
use super::erc20::Erc20Contract;
use super::types::{ChainConfig, PendingTx, TxReceipt};

/// Errors that can occur while talking to the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    #[error("Invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Contract error: {0}")]
    Contract(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("No signer configured; write operations are unavailable")]
    NoSigner,

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Chain access needed by token views.
pub trait DexContext: Send + Sync {
    /// Address of the DEX contract, the spender for approvals.
    fn dex_address(&self) -> Address;

    /// Native currency balance held by `owner`.
    fn native_balance(&self, owner: Address) -> impl Future<Output = Result<U256, ContextError>> + Send;

    /// `decimals()` of an ERC-20 token.
    fn token_decimals(&self, token: Address) -> impl Future<Output = Result<u8, ContextError>> + Send;

    /// `balanceOf(owner)` of an ERC-20 token.
    fn token_balance(
        &self,
        token: Address,
        owner: Address,
    ) -> impl Future<Output = Result<U256, ContextError>> + Send;

    /// `allowance(owner, spender)` of an ERC-20 token.
    fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> impl Future<Output = Result<U256, ContextError>> + Send;

    /// Submit `approve(spender, amount)` on an ERC-20 token.
    fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> impl Future<Output = Result<PendingTx, ContextError>> + Send;

    /// Surplus balance of `token` the DEX holds on behalf of `owner`.
    fn query_surplus(
        &self,
        owner: Address,
        token: Address,
    ) -> impl Future<Output = Result<U256, ContextError>> + Send;

    /// Submit `userCmd(callpath, cmd)` to the DEX, optionally carrying native value.
    fn user_cmd(
        &self,
        callpath: u16,
        cmd: Bytes,
        value: Option<U256>,
    ) -> impl Future<Output = Result<PendingTx, ContextError>> + Send;
}

/// Alloy-backed connection to a DEX deployment.
pub struct CrocContext {
    config: ChainConfig,
    provider: DynProvider<Ethereum>,
    signer: Option<Address>,
}

impl std::fmt::Debug for CrocContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrocContext")
            .field("network", &self.config.name)
            .field("rpc_url", &self.config.rpc_url)
            .field("signer", &self.signer)
            .finish()
    }
}

impl CrocContext {
    /// Connect to a deployment, optionally with a signing key for writes.
    ///
    /// The node's chain ID must match `config.chain_id`.
    pub async fn connect(
        config: ChainConfig,
        private_key_hex: Option<&str>,
    ) -> Result<Self, ContextError> {
        let url: url::Url = config
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ContextError::InvalidRpcUrl(e.to_string()))?;

        let (provider, signer) = match private_key_hex {
            Some(key) => {
                let signer = create_signer(key)?;
                let address = signer.address();
                let provider = ProviderBuilder::new()
                    .wallet(EthereumWallet::from(signer))
                    .connect_http(url)
                    .erased();
                (provider, Some(address))
            }
            None => (ProviderBuilder::new().connect_http(url).erased(), None),
        };

        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| ContextError::Rpc(e.to_string()))?;
        if chain_id != config.chain_id {
            return Err(ContextError::Config(format!(
                "RPC endpoint reports chain {chain_id}, expected {}",
                config.chain_id
            )));
        }

        tracing::info!(
            network = %config.name,
            chain_id,
            dex = %config.dex_address,
            signer = ?signer,
            "Connected to DEX deployment"
        );

        Ok(Self {
            config,
            provider,
            signer,
        })
    }

    /// Get the chain configuration.
    pub fn chain_config(&self) -> &ChainConfig {
        &self.config
    }

    /// Address of the configured signer, if any.
    pub fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    /// Explorer link for a submitted transaction.
    pub fn explorer_tx_url(&self, tx: &PendingTx) -> String {
        self.config.explorer_tx_url(&tx.tx_hash)
    }

    /// Get the transaction status by checking for a receipt.
    pub async fn transaction_status(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TxReceipt>, ContextError> {
        let receipt = self
            .provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| ContextError::Rpc(format!("Failed to get receipt: {}", e)))?;

        Ok(receipt.map(|r| TxReceipt {
            tx_hash,
            block_number: r.block_number.unwrap_or(0),
            gas_used: r.gas_used,
            success: r.status(),
        }))
    }

    fn require_signer(&self) -> Result<(), ContextError> {
        self.signer.map(|_| ()).ok_or(ContextError::NoSigner)
    }
}

impl DexContext for CrocContext {
    fn dex_address(&self) -> Address {
        self.config.dex_address
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, ContextError> {
        self.provider
            .get_balance(owner)
            .await
            .map_err(|e| ContextError::Rpc(e.to_string()))
    }

    async fn token_decimals(&self, token: Address) -> Result<u8, ContextError> {
        Erc20Contract::new(&self.provider, token).decimals().await
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ContextError> {
        Erc20Contract::new(&self.provider, token).balance_of(owner).await
    }

    async fn token_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, ContextError> {
        Erc20Contract::new(&self.provider, token)
            .allowance(owner, spender)
            .await
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<PendingTx, ContextError> {
        self.require_signer()?;
        Erc20Contract::new(&self.provider, token)
            .approve(spender, amount)
            .await
    }

    async fn query_surplus(&self, owner: Address, token: Address) -> Result<U256, ContextError> {
        let query = ICrocQuery::new(self.config.query_address, self.provider.clone());
        let surplus = query
            .querySurplus(owner, token)
            .call()
            .await
            .map_err(|e| ContextError::Contract(e.to_string()))?;
        Ok(U256::from(surplus))
    }

    async fn user_cmd(
        &self,
        callpath: u16,
        cmd: Bytes,
        value: Option<U256>,
    ) -> Result<PendingTx, ContextError> {
        self.require_signer()?;
        let dex = ICrocSwapDex::new(self.config.dex_address, self.provider.clone());

        let mut call = dex.userCmd(callpath, cmd);
        if let Some(value) = value {
            call = call.value(value);
        }

        let pending = call
            .send()
            .await
            .map_err(|e| ContextError::TransactionFailed(format!("Failed to send: {}", e)))?;

        Ok(PendingTx {
            tx_hash: *pending.tx_hash(),
        })
    }
}

/// Create a signer from a hex-encoded private key (with or without `0x`).
pub fn create_signer(private_key_hex: &str) -> Result<PrivateKeySigner, ContextError> {
    let key_bytes = alloy::hex::decode(private_key_hex.trim().trim_start_matches("0x"))
        .map_err(|e| ContextError::InvalidPrivateKey(e.to_string()))?;

    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ContextError::InvalidPrivateKey(e.to_string()))
}
