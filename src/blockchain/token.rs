// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-token view over wallet and surplus balances.
//!
//! A [`TokenView`] binds a shared [`DexContext`] to one token address. Reads
//! cover the owner's wallet balance, the surplus balance the DEX holds for
//! them, and the allowance granted to the DEX. Writes approve the DEX and
//! move tokens into, out of, or between surplus balances through the DEX's
//! cold-path `userCmd`.
//!
//! The zero address stands for the native currency: it has 18 decimals, needs
//! no approval, and deposits carry the amount as transaction value.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::context::{ContextError, DexContext};
use super::dex::encode_surplus_cmd;
use super::types::{
    surplus_code, PendingTx, TokenQty, APPROVE_AMOUNT, COLD_PROXY_PATH, MAX_LIQ, NATIVE_DECIMALS,
    NATIVE_TOKEN,
};
use super::units::{format_display_qty, parse_display_qty, UnitsError};

/// Errors from token view operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error(transparent)]
    Units(#[from] UnitsError),

    #[error("Token decimals unavailable: {0}")]
    DecimalsUnavailable(ContextError),

    #[error("Quantity {0} does not fit in uint128")]
    QuantityOverflow(U256),
}

/// View of a single token through a shared DEX context.
///
/// Clones share the context and the memoized decimals.
pub struct TokenView<C> {
    context: Arc<C>,
    token: Address,
    is_native: bool,
    /// Resolved at most once; a failed lookup stays cached.
    decimals: Arc<OnceCell<Result<u8, ContextError>>>,
}

impl<C> Clone for TokenView<C> {
    fn clone(&self) -> Self {
        Self {
            context: Arc::clone(&self.context),
            token: self.token,
            is_native: self.is_native,
            decimals: Arc::clone(&self.decimals),
        }
    }
}

impl<C> std::fmt::Debug for TokenView<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenView")
            .field("token", &self.token)
            .field("is_native", &self.is_native)
            .field("decimals", &self.decimals.get())
            .finish()
    }
}

impl<C: DexContext> TokenView<C> {
    /// Create a view for `token`. Decimals are fetched on first use.
    pub fn new(context: Arc<C>, token: Address) -> Self {
        let is_native = token == NATIVE_TOKEN;
        let decimals = if is_native {
            OnceCell::new_with(Some(Ok(NATIVE_DECIMALS)))
        } else {
            OnceCell::new()
        };

        Self {
            context,
            token,
            is_native,
            decimals: Arc::new(decimals),
        }
    }

    /// Create a view for the chain's native currency.
    pub fn native(context: Arc<C>) -> Self {
        Self::new(context, NATIVE_TOKEN)
    }

    /// Create a view and resolve its decimals before returning.
    ///
    /// A lookup failure is kept by the view rather than returned here.
    pub async fn resolved(context: Arc<C>, token: Address) -> Self {
        let view = Self::new(context, token);
        let _ = view.resolve_decimals().await;
        view
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn is_native(&self) -> bool {
        self.is_native
    }

    pub fn context(&self) -> &Arc<C> {
        &self.context
    }

    /// Token decimals, fetched once and cached for the life of the view.
    pub async fn resolve_decimals(&self) -> Result<u8, TokenError> {
        let resolved = self
            .decimals
            .get_or_init(|| async {
                let result = self.context.token_decimals(self.token).await;
                match &result {
                    Ok(decimals) => debug!(token = %self.token, decimals, "Resolved token decimals"),
                    Err(e) => warn!(token = %self.token, error = %e, "Failed to resolve token decimals"),
                }
                result
            })
            .await;

        resolved.clone().map_err(TokenError::DecimalsUnavailable)
    }

    /// Approve the DEX to spend this token on the signer's behalf.
    ///
    /// Returns `None` for the native currency, which needs no approval.
    pub async fn approve(&self) -> Result<Option<PendingTx>, TokenError> {
        if self.is_native {
            return Ok(None);
        }

        let spender = self.context.dex_address();
        let pending = self
            .context
            .approve(self.token, spender, APPROVE_AMOUNT)
            .await?;
        info!(token = %self.token, %spender, tx_hash = %pending.tx_hash, "Submitted approval");
        Ok(Some(pending))
    }

    /// Balance held in `owner`'s wallet, in the smallest unit.
    pub async fn wallet(&self, owner: Address) -> Result<U256, TokenError> {
        debug!(token = %self.token, %owner, "Querying wallet balance");
        let balance = if self.is_native {
            self.context.native_balance(owner).await?
        } else {
            self.context.token_balance(self.token, owner).await?
        };
        Ok(balance)
    }

    /// Wallet balance as a decimal string.
    pub async fn wallet_display(&self, owner: Address) -> Result<String, TokenError> {
        let balance = self.wallet(owner).await?;
        self.to_display(balance).await
    }

    /// Surplus balance the DEX holds for `owner`, in the smallest unit.
    pub async fn balance(&self, owner: Address) -> Result<U256, TokenError> {
        debug!(token = %self.token, %owner, "Querying surplus balance");
        Ok(self.context.query_surplus(owner, self.token).await?)
    }

    /// Surplus balance as a decimal string.
    pub async fn balance_display(&self, owner: Address) -> Result<String, TokenError> {
        let balance = self.balance(owner).await?;
        self.to_display(balance).await
    }

    /// Amount `owner` has approved the DEX to spend.
    ///
    /// Always [`MAX_LIQ`] for the native currency.
    pub async fn allowance(&self, owner: Address) -> Result<U256, TokenError> {
        if self.is_native {
            return Ok(MAX_LIQ);
        }

        let spender = self.context.dex_address();
        Ok(self
            .context
            .token_allowance(self.token, owner, spender)
            .await?)
    }

    /// Normalize a quantity to the smallest unit.
    ///
    /// `Wei` quantities pass through without consulting decimals.
    pub async fn norm_qty(&self, qty: impl Into<TokenQty>) -> Result<U256, TokenError> {
        match qty.into() {
            TokenQty::Wei(wei) => Ok(wei),
            TokenQty::Display(text) => {
                let decimals = self.resolve_decimals().await?;
                Ok(parse_display_qty(&text, decimals)?)
            }
        }
    }

    /// Render a quantity as a decimal string.
    ///
    /// `Display` quantities are returned as given.
    pub async fn to_display(&self, qty: impl Into<TokenQty>) -> Result<String, TokenError> {
        match qty.into() {
            TokenQty::Display(text) => Ok(text),
            TokenQty::Wei(wei) => {
                let decimals = self.resolve_decimals().await?;
                Ok(format_display_qty(wei, decimals))
            }
        }
    }

    /// Move `qty` from the signer's wallet into `recv`'s surplus balance.
    pub async fn deposit(
        &self,
        qty: impl Into<TokenQty>,
        recv: Address,
    ) -> Result<PendingTx, TokenError> {
        self.surplus_op(surplus_code::DEPOSIT, qty.into(), recv, self.is_native)
            .await
    }

    /// Move `qty` out of the signer's surplus balance to `recv`'s wallet.
    pub async fn withdraw(
        &self,
        qty: impl Into<TokenQty>,
        recv: Address,
    ) -> Result<PendingTx, TokenError> {
        self.surplus_op(surplus_code::WITHDRAW, qty.into(), recv, false)
            .await
    }

    /// Move `qty` from the signer's surplus balance to `recv`'s surplus balance.
    pub async fn transfer(
        &self,
        qty: impl Into<TokenQty>,
        recv: Address,
    ) -> Result<PendingTx, TokenError> {
        self.surplus_op(surplus_code::TRANSFER, qty.into(), recv, false)
            .await
    }

    async fn surplus_op(
        &self,
        code: u8,
        qty: TokenQty,
        recv: Address,
        use_msg_val: bool,
    ) -> Result<PendingTx, TokenError> {
        let wei = self.norm_qty(qty).await?;
        let wei_qty = u128::try_from(wei).map_err(|_| TokenError::QuantityOverflow(wei))?;

        let cmd = encode_surplus_cmd(code, recv, wei_qty, self.token);
        let value = use_msg_val.then_some(wei);

        let pending = self.context.user_cmd(COLD_PROXY_PATH, cmd, value).await?;
        info!(
            token = %self.token,
            code,
            %recv,
            amount = %wei,
            tx_hash = %pending.tx_hash,
            "Submitted surplus command"
        );
        Ok(pending)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use alloy::primitives::{address, Bytes, TxHash};
    use alloy::sol_types::SolType;

    use super::*;
    use crate::blockchain::dex::SurplusCmd;

    const DEX: Address = address!("0xAaAaAAAaA24eEeb8d57D431224f73832bC34f688");
    const USDC: Address = address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const ALICE: Address = address!("0x1111111111111111111111111111111111111111");
    const BOB: Address = address!("0x2222222222222222222222222222222222222222");

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        NativeBalance(Address),
        TokenBalance(Address, Address),
        Allowance(Address, Address, Address),
        Approve(Address, Address, U256),
        Surplus(Address, Address),
        UserCmd(u16, Bytes, Option<U256>),
    }

    struct MockContext {
        decimals: Result<u8, ContextError>,
        decimals_lookups: AtomicUsize,
        native_balance: U256,
        token_balance: U256,
        surplus: U256,
        allowance: U256,
        calls: Mutex<Vec<Call>>,
    }

    impl MockContext {
        fn with_decimals(decimals: Result<u8, ContextError>) -> Arc<Self> {
            Arc::new(Self {
                decimals,
                decimals_lookups: AtomicUsize::new(0),
                native_balance: U256::from(3_000_000_000_000_000_000u64),
                token_balance: U256::from(2_250_000u64),
                surplus: U256::from(1_500_000u64),
                allowance: U256::from(42u64),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn lookups(&self) -> usize {
            self.decimals_lookups.load(Ordering::SeqCst)
        }
    }

    impl DexContext for MockContext {
        fn dex_address(&self) -> Address {
            DEX
        }

        async fn native_balance(&self, owner: Address) -> Result<U256, ContextError> {
            self.record(Call::NativeBalance(owner));
            Ok(self.native_balance)
        }

        async fn token_decimals(&self, _token: Address) -> Result<u8, ContextError> {
            self.decimals_lookups.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.decimals.clone()
        }

        async fn token_balance(&self, token: Address, owner: Address) -> Result<U256, ContextError> {
            self.record(Call::TokenBalance(token, owner));
            Ok(self.token_balance)
        }

        async fn token_allowance(
            &self,
            token: Address,
            owner: Address,
            spender: Address,
        ) -> Result<U256, ContextError> {
            self.record(Call::Allowance(token, owner, spender));
            Ok(self.allowance)
        }

        async fn approve(
            &self,
            token: Address,
            spender: Address,
            amount: U256,
        ) -> Result<PendingTx, ContextError> {
            self.record(Call::Approve(token, spender, amount));
            Ok(PendingTx { tx_hash: TxHash::ZERO })
        }

        async fn query_surplus(&self, owner: Address, token: Address) -> Result<U256, ContextError> {
            self.record(Call::Surplus(owner, token));
            Ok(self.surplus)
        }

        async fn user_cmd(
            &self,
            callpath: u16,
            cmd: Bytes,
            value: Option<U256>,
        ) -> Result<PendingTx, ContextError> {
            self.record(Call::UserCmd(callpath, cmd, value));
            Ok(PendingTx { tx_hash: TxHash::ZERO })
        }
    }

    fn usdc() -> (Arc<MockContext>, TokenView<MockContext>) {
        let ctx = MockContext::with_decimals(Ok(6));
        let view = TokenView::new(Arc::clone(&ctx), USDC);
        (ctx, view)
    }

    fn broken() -> (Arc<MockContext>, TokenView<MockContext>) {
        let ctx = MockContext::with_decimals(Err(ContextError::Contract("reverted".to_string())));
        let view = TokenView::new(Arc::clone(&ctx), USDC);
        (ctx, view)
    }

    fn decode_cmd(call: &Call) -> ((u8, Address, u128, Address), Option<U256>) {
        match call {
            Call::UserCmd(callpath, cmd, value) => {
                assert_eq!(*callpath, COLD_PROXY_PATH);
                let decoded = <SurplusCmd as SolType>::abi_decode_params(cmd).unwrap();
                (decoded, *value)
            }
            other => panic!("expected userCmd, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn display_conversions_with_six_decimals() {
        let (_, view) = usdc();
        assert_eq!(view.to_display(U256::from(1_500_000u64)).await.unwrap(), "1.5");
        assert_eq!(view.norm_qty("1.5").await.unwrap(), U256::from(1_500_000u64));
        assert_eq!(view.norm_qty(1.5f64).await.unwrap(), U256::from(1_500_000u64));
    }

    #[tokio::test]
    async fn display_then_norm_round_trips() {
        let (_, view) = usdc();
        for amount in [0u64, 1, 999_999, 1_000_000, 123_456_789_012] {
            let amount = U256::from(amount);
            let text = view.to_display(amount).await.unwrap();
            assert_eq!(view.norm_qty(text).await.unwrap(), amount);
        }
    }

    #[tokio::test]
    async fn negative_zero_number_normalizes_to_zero() {
        let (_, view) = usdc();
        assert_eq!(view.norm_qty(-0.0f64).await.unwrap(), U256::ZERO);
    }

    #[tokio::test]
    async fn wei_and_text_skip_decimals() {
        let (ctx, view) = broken();
        let wei = U256::from(777u64);
        assert_eq!(view.norm_qty(wei).await.unwrap(), wei);
        assert_eq!(view.to_display("not-a-number").await.unwrap(), "not-a-number");
        assert_eq!(ctx.lookups(), 0);
    }

    #[tokio::test]
    async fn failed_decimals_poison_the_view() {
        let (ctx, view) = broken();
        for _ in 0..2 {
            let err = view.balance_display(ALICE).await.unwrap_err();
            assert!(matches!(err, TokenError::DecimalsUnavailable(_)));
            let err = view.norm_qty("1").await.unwrap_err();
            assert!(matches!(err, TokenError::DecimalsUnavailable(_)));
        }
        assert_eq!(ctx.lookups(), 1);

        // Precision-free reads still work.
        assert_eq!(view.balance(ALICE).await.unwrap(), U256::from(1_500_000u64));
    }

    #[tokio::test]
    async fn concurrent_first_use_resolves_once() {
        let (ctx, view) = usdc();
        let other = view.clone();
        let (a, b) = tokio::join!(view.resolve_decimals(), other.resolve_decimals());
        assert_eq!(a.unwrap(), 6);
        assert_eq!(b.unwrap(), 6);
        assert_eq!(ctx.lookups(), 1);
    }

    #[tokio::test]
    async fn resolved_constructor_fetches_eagerly() {
        let ctx = MockContext::with_decimals(Ok(8));
        let view = TokenView::resolved(Arc::clone(&ctx), USDC).await;
        assert_eq!(ctx.lookups(), 1);
        assert_eq!(view.resolve_decimals().await.unwrap(), 8);
        assert_eq!(ctx.lookups(), 1);
    }

    #[tokio::test]
    async fn invalid_text_is_a_units_error() {
        let (_, view) = usdc();
        let err = view.norm_qty("1.2.3").await.unwrap_err();
        assert!(matches!(err, TokenError::Units(UnitsError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn native_allowance_is_max_liq() {
        let ctx = MockContext::with_decimals(Ok(6));
        let view = TokenView::native(Arc::clone(&ctx));
        for owner in [ALICE, BOB, Address::ZERO] {
            assert_eq!(view.allowance(owner).await.unwrap(), MAX_LIQ);
        }
        assert!(ctx.calls().is_empty());
    }

    #[tokio::test]
    async fn token_allowance_targets_dex() {
        let (ctx, view) = usdc();
        assert_eq!(view.allowance(ALICE).await.unwrap(), U256::from(42u64));
        assert_eq!(ctx.calls(), vec![Call::Allowance(USDC, ALICE, DEX)]);
    }

    #[tokio::test]
    async fn native_approve_is_a_no_op() {
        let ctx = MockContext::with_decimals(Ok(6));
        let view = TokenView::native(Arc::clone(&ctx));
        assert_eq!(view.approve().await.unwrap(), None);
        assert!(ctx.calls().is_empty());
    }

    #[tokio::test]
    async fn token_approve_grants_two_pow_120() {
        let (ctx, view) = usdc();
        assert!(view.approve().await.unwrap().is_some());
        assert_eq!(
            ctx.calls(),
            vec![Call::Approve(USDC, DEX, U256::from(1u8) << 120usize)]
        );
    }

    #[tokio::test]
    async fn wallet_reads_provider_or_token() {
        let ctx = MockContext::with_decimals(Ok(6));
        let native = TokenView::native(Arc::clone(&ctx));
        assert_eq!(native.wallet_display(ALICE).await.unwrap(), "3");
        assert_eq!(ctx.lookups(), 0);

        let token = TokenView::new(Arc::clone(&ctx), USDC);
        assert_eq!(token.wallet_display(ALICE).await.unwrap(), "2.25");
        assert_eq!(
            ctx.calls(),
            vec![Call::NativeBalance(ALICE), Call::TokenBalance(USDC, ALICE)]
        );
    }

    #[tokio::test]
    async fn balance_and_display_agree() {
        let (ctx, view) = usdc();
        let raw = view.balance(ALICE).await.unwrap();
        let shown = view.balance_display(ALICE).await.unwrap();
        assert_eq!(shown, view.to_display(raw).await.unwrap());
        assert_eq!(shown, "1.5");
        assert_eq!(ctx.calls(), vec![Call::Surplus(ALICE, USDC); 2]);
    }

    #[tokio::test]
    async fn native_deposit_attaches_value() {
        let ctx = MockContext::with_decimals(Ok(6));
        let view = TokenView::native(Arc::clone(&ctx));
        view.deposit(U256::from(1_000_000u64), BOB).await.unwrap();

        let calls = ctx.calls();
        let ((code, recv, qty, token), value) = decode_cmd(&calls[0]);
        assert_eq!((code, recv, qty, token), (73, BOB, 1_000_000, NATIVE_TOKEN));
        assert_eq!(value, Some(U256::from(1_000_000u64)));
    }

    #[tokio::test]
    async fn token_deposit_attaches_no_value() {
        let (ctx, view) = usdc();
        view.deposit(U256::from(1_000_000u64), BOB).await.unwrap();

        let ((code, recv, qty, token), value) = decode_cmd(&ctx.calls()[0]);
        assert_eq!((code, recv, qty, token), (73, BOB, 1_000_000, USDC));
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn withdraw_and_transfer_codes() {
        let ctx = MockContext::with_decimals(Ok(6));
        let native = TokenView::native(Arc::clone(&ctx));
        native.withdraw("0.5", ALICE).await.unwrap();
        let token = TokenView::new(Arc::clone(&ctx), USDC);
        token.transfer("2", BOB).await.unwrap();

        let calls = ctx.calls();
        let ((code, recv, qty, _), value) = decode_cmd(&calls[0]);
        assert_eq!((code, recv, qty), (74, ALICE, 500_000_000_000_000_000));
        assert_eq!(value, None);

        let ((code, recv, qty, token_addr), value) = decode_cmd(&calls[1]);
        assert_eq!((code, recv, qty, token_addr), (75, BOB, 2_000_000, USDC));
        assert_eq!(value, None);
    }

    #[tokio::test]
    async fn oversized_quantity_is_rejected_before_submission() {
        let (ctx, view) = usdc();
        let too_big = U256::from(u128::MAX) + U256::from(1u8);
        let err = view.deposit(too_big, ALICE).await.unwrap_err();
        assert_eq!(err, TokenError::QuantityOverflow(too_big));
        assert!(ctx.calls().is_empty());
    }

    #[tokio::test]
    async fn context_errors_propagate() {
        let ctx = MockContext::with_decimals(Err(ContextError::Rpc("down".to_string())));
        let view = TokenView::new(Arc::clone(&ctx), USDC);
        let err = view.deposit("1", ALICE).await.unwrap_err();
        assert_eq!(
            err,
            TokenError::DecimalsUnavailable(ContextError::Rpc("down".to_string()))
        );
    }
}
