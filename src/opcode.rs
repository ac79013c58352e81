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

//! The closed set of command opcodes and their wire argument shapes.

/// One opcode per wire command. Numbering 0–15 is the bit-exact base
/// protocol; 16–19 are an additive extension exposing the current values of
/// the timing/frequency/mode setters and are ignored by hosts that only know
/// the base set.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0,
    Sync = 1,
    GetInterfaceVersion = 2,
    GetMaxRxSize = 3,
    GetMaxTxSize = 4,
    ToggleIo = 5,
    GetSupportedBusTypes = 6,
    SetAddressBusWidth = 7,
    SetAddressHoldTime = 8,
    SetPulseWidthTime = 9,
    ParallelRead = 10,
    ParallelWrite = 11,
    SetSpiClockFreq = 12,
    SetSpiMode = 13,
    GetSupportedSpiModes = 14,
    SpiTransmit = 15,
    GetAddressHoldTime = 16,
    GetPulseWidthTime = 17,
    GetSpiClockFreq = 18,
    GetSpiMode = 19,
}

impl Opcode {
    pub fn from_wire(byte: u8) -> Option<Opcode> {
        use Opcode::*;
        Some(match byte {
            0 => Nop,
            1 => Sync,
            2 => GetInterfaceVersion,
            3 => GetMaxRxSize,
            4 => GetMaxTxSize,
            5 => ToggleIo,
            6 => GetSupportedBusTypes,
            7 => SetAddressBusWidth,
            8 => SetAddressHoldTime,
            9 => SetPulseWidthTime,
            10 => ParallelRead,
            11 => ParallelWrite,
            12 => SetSpiClockFreq,
            13 => SetSpiMode,
            14 => GetSupportedSpiModes,
            15 => SpiTransmit,
            16 => GetAddressHoldTime,
            17 => GetPulseWidthTime,
            18 => GetSpiClockFreq,
            19 => GetSpiMode,
            _ => return None,
        })
    }

    /// Number of fixed argument bytes following the opcode byte, before any
    /// trailing variable-length payload.
    pub fn fixed_arg_len(self) -> usize {
        use Opcode::*;
        match self {
            Nop | Sync | GetInterfaceVersion | GetMaxRxSize | GetMaxTxSize
            | GetSupportedBusTypes | GetSupportedSpiModes | GetAddressHoldTime
            | GetPulseWidthTime | GetSpiClockFreq | GetSpiMode => 0,
            ToggleIo | SetAddressBusWidth | SetSpiMode => 1,
            SetAddressHoldTime | SetPulseWidthTime | SetSpiClockFreq => 4,
            ParallelRead | ParallelWrite => 8,
            SpiTransmit => 4,
        }
    }

    /// Whether this opcode carries a `count`-prefixed variable-length
    /// payload, and if so, the byte offset (from the start of the fixed
    /// argument block) of the little-endian `u32` count.
    pub fn payload_count_offset(self) -> Option<usize> {
        use Opcode::*;
        match self {
            ParallelWrite => Some(4),
            SpiTransmit => Some(0),
            _ => None,
        }
    }
}
