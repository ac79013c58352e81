// Copyright 2021 lowRISC contributors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

//! Internal diagnostics. None of these ever reach the wire — every failure
//! the host sees collapses to the single NAK byte; these types exist so the
//! tick loop can log *why* before it does.

use core::fmt;

/// Why [`crate::decode`] rejected or could not complete a frame.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The opcode byte did not match any known command.
    UnknownOpcode(u8),
    /// A declared payload would overflow the receive buffer.
    RxOverflow,
    /// A declared reply would overflow the transmit buffer.
    TxOverflow,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnknownOpcode(b) => write!(f, "unknown opcode 0x{:02x}", b),
            DecodeError::RxOverflow => write!(f, "declared payload exceeds rx buffer capacity"),
            DecodeError::TxOverflow => write!(f, "declared reply exceeds tx buffer capacity"),
        }
    }
}

/// Everything that can keep [`crate::Session::tick`] from completing a
/// command. `Transport` wraps whatever the transport's blocking read/write
/// reported; the others are protocol-level.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TickError<E> {
    Decode(DecodeError),
    Transport(E),
}

impl<E> From<DecodeError> for TickError<E> {
    fn from(e: DecodeError) -> Self {
        TickError::Decode(e)
    }
}

/// Why a dispatched handler declined to touch the bus.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HandlerError {
    /// A requested bus mode is not in `supported_bus_mask`.
    UnsupportedBusMode,
    /// `address_hold_ns` or `ce_pulse_width_ns` is below the backend minimum.
    TimingBelowMinimum,
    /// `address_bus_width` would exceed the backend's pin count.
    AddressBusWidthExceeded,
    /// The backend itself reported failure (SPI mode/frequency rejected, a
    /// transmit failed, ...).
    BackendRejected,
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::UnsupportedBusMode => write!(f, "bus mode unsupported by backend"),
            HandlerError::TimingBelowMinimum => write!(f, "timing parameter below backend minimum"),
            HandlerError::AddressBusWidthExceeded => write!(f, "address bus width exceeds pin count"),
            HandlerError::BackendRejected => write!(f, "backend rejected the operation"),
        }
    }
}
