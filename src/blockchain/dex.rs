// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! DEX and query contract bindings, plus the surplus command encoding.

use alloy::{
    primitives::{Address, Bytes},
    sol,
    sol_types::{sol_data, SolType},
};

sol! {
    #[sol(rpc)]
    interface ICrocSwapDex {
        function userCmd(uint16 callpath, bytes calldata cmd) external payable returns (bytes memory);
    }

    #[sol(rpc)]
    interface ICrocQuery {
        function querySurplus(address owner, address token) external view returns (uint128 surplus);
    }
}

/// Surplus command payload: `(uint8 code, address recv, uint128 qty, address token)`.
pub type SurplusCmd = (
    sol_data::Uint<8>,
    sol_data::Address,
    sol_data::Uint<128>,
    sol_data::Address,
);

/// Encode a surplus command as a flat parameter list.
pub fn encode_surplus_cmd(code: u8, recv: Address, qty: u128, token: Address) -> Bytes {
    <SurplusCmd as SolType>::abi_encode_params(&(code, recv, qty, token)).into()
}
