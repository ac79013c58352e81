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

//! Firmware-resident command server for parallel and SPI memory programming.
//!
//! A host drives a connected EPROM/EEPROM/Flash part (parallel or SPI) by
//! sending framed binary commands over a byte transport; this crate decodes
//! those frames, dispatches them against a small state machine, and drives
//! the bus through the [`ProgrammerBackend`] and [`TransportBackend`] traits.
//! Both traits are implemented once per hardware platform; [`Session`] is
//! generic over them and owns no global state.

#![cfg_attr(not(any(test, feature = "mock")), no_std)]

mod decode;
mod error;
mod handlers;
mod opcode;
mod session;

pub mod backend;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use backend::{BusMode, ProgrammerBackend, SpiMode, TransportBackend};
pub use error::{DecodeError, HandlerError, TickError};
pub use opcode::Opcode;
pub use session::Session;

/// Wire status byte for a successful command.
pub const ACK: u8 = 0x05;
/// Wire status byte for a failed command.
pub const NAK: u8 = 0x06;

/// Protocol revision reported by `GetInterfaceVersion`.
pub const INTERFACE_VERSION: u16 = 1;

/// Bitmask values for [`BusMode`], as carried on the wire.
pub mod bus_mask {
    pub const PARALLEL: u8 = 1;
    pub const SPI: u8 = 2;
    pub const I2C: u8 = 4;
}
