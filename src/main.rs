// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # croc-tokens CLI
//!
//! Subcommands:
//! - `croc-tokens report <token> <owner>` — Wallet, surplus, and allowance for one token
//! - `croc-tokens tx-status <hash>` — Receipt lookup for a submitted transaction

use std::{process::ExitCode, sync::Arc};

use alloy::primitives::{Address, TxHash, U256};
use clap::{Parser, Subcommand};
use serde::Serialize;

use croc_tokens::{
    blockchain::{CrocContext, PendingTx, TokenError, TokenView, TxReceipt},
    config::{chain_config_from_env, PRIVATE_KEY_ENV},
    telemetry::init_tracing,
};

/// Token views over a CrocSwap-style DEX.
///
/// Deployment settings come from the `CROC_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "croc-tokens", version, about)]
struct Cli {
    /// Hex signing key (only needed for write commands).
    #[arg(long, env = PRIVATE_KEY_ENV, hide_env_values = true, global = true)]
    private_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print wallet, surplus, and allowance balances as JSON.
    Report {
        /// Token address (0x0000000000000000000000000000000000000000 for the native currency).
        token: Address,

        /// Owner address.
        owner: Address,
    },

    /// Look up the receipt of a submitted transaction.
    TxStatus {
        /// Transaction hash (0x...).
        hash: TxHash,
    },
}

/// Raw and decimal renderings of one amount.
#[derive(Debug, Serialize)]
struct Amount {
    raw: String,
    display: String,
}

#[derive(Debug, Serialize)]
struct TokenReport {
    network: String,
    chain_id: u64,
    token: Address,
    owner: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    signer: Option<Address>,
    decimals: u8,
    wallet: Amount,
    surplus: Amount,
    allowance: Amount,
}

#[derive(Debug, Serialize)]
struct TxStatusReport {
    tx_hash: TxHash,
    explorer_url: String,
    /// `None` while the transaction is pending or unknown.
    receipt: Option<TxReceipt>,
}

async fn amount(view: &TokenView<CrocContext>, raw: U256) -> Result<Amount, TokenError> {
    Ok(Amount {
        raw: raw.to_string(),
        display: view.to_display(raw).await?,
    })
}

async fn connect(private_key: Option<&str>) -> Result<Arc<CrocContext>, TokenError> {
    let config = chain_config_from_env()?;
    Ok(Arc::new(CrocContext::connect(config, private_key).await?))
}

async fn report(
    context: Arc<CrocContext>,
    token: Address,
    owner: Address,
) -> Result<TokenReport, TokenError> {
    let view = TokenView::resolved(Arc::clone(&context), token).await;
    let decimals = view.resolve_decimals().await?;

    let wallet = view.wallet(owner).await?;
    let surplus = view.balance(owner).await?;
    let allowance = view.allowance(owner).await?;

    Ok(TokenReport {
        network: context.chain_config().name.clone(),
        chain_id: context.chain_config().chain_id,
        token,
        owner,
        signer: context.signer_address(),
        decimals,
        wallet: amount(&view, wallet).await?,
        surplus: amount(&view, surplus).await?,
        allowance: amount(&view, allowance).await?,
    })
}

async fn tx_status(context: &CrocContext, tx_hash: TxHash) -> Result<TxStatusReport, TokenError> {
    let receipt = context.transaction_status(tx_hash).await?;
    Ok(TxStatusReport {
        tx_hash,
        explorer_url: context.explorer_tx_url(&PendingTx { tx_hash }),
        receipt,
    })
}

async fn run(cli: Cli) -> Result<serde_json::Value, TokenError> {
    let context = connect(cli.private_key.as_deref()).await?;
    let value = match cli.command {
        Command::Report { token, owner } => serde_json::to_value(report(context, token, owner).await?),
        Command::TxStatus { hash } => serde_json::to_value(tx_status(&context, hash).await?),
    };
    // Plain derived structs always serialize.
    Ok(value.unwrap_or(serde_json::Value::Null))
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(json) => {
            println!("{json:#}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            ExitCode::FAILURE
        }
    }
}
