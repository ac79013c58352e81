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

//! Frame decoder: pulls exactly one command frame off the transport into the
//! receive buffer, or reports why it couldn't.

use byteorder::{ByteOrder, LittleEndian};

use crate::backend::TransportBackend;
use crate::error::{DecodeError, TickError};
use crate::opcode::Opcode;

/// Read one frame from `transport` into `rx_buf`. On success, returns the
/// number of bytes written to `rx_buf` (opcode + fixed args + payload).
///
/// Deliberately does **not** consume a declared-oversize payload on
/// rejection: recovery relies on the host issuing `Sync`, which flushes the
/// transport.
pub fn decode_frame<T: TransportBackend>(
    rx_buf: &mut [u8],
    tx_cap: usize,
    transport: &mut T,
) -> Result<usize, TickError<T::Error>> {
    let rx_cap = rx_buf.len();

    transport
        .get_data(&mut rx_buf[0..1])
        .map_err(TickError::Transport)?;
    let opcode_byte = rx_buf[0];
    let opcode =
        Opcode::from_wire(opcode_byte).ok_or(DecodeError::UnknownOpcode(opcode_byte))?;

    let fixed_len = opcode.fixed_arg_len();
    if fixed_len > 0 {
        transport
            .get_data(&mut rx_buf[1..1 + fixed_len])
            .map_err(TickError::Transport)?;
    }
    let mut total_len = 1 + fixed_len;

    if let Some(count_offset) = opcode.payload_count_offset() {
        let count =
            LittleEndian::read_u32(&rx_buf[1 + count_offset..1 + count_offset + 4]) as usize;

        match opcode {
            Opcode::ParallelWrite if count > rx_cap.saturating_sub(9) => {
                return Err(DecodeError::RxOverflow.into())
            }
            Opcode::SpiTransmit if count > rx_cap.saturating_sub(5) => {
                return Err(DecodeError::RxOverflow.into())
            }
            Opcode::SpiTransmit if count > tx_cap.saturating_sub(1) => {
                return Err(DecodeError::TxOverflow.into())
            }
            _ => {}
        }

        transport
            .get_data(&mut rx_buf[total_len..total_len + count])
            .map_err(TickError::Transport)?;
        total_len += count;
    } else if opcode == Opcode::ParallelRead {
        let count = LittleEndian::read_u32(&rx_buf[5..9]) as usize;
        if count > tx_cap.saturating_sub(1) {
            return Err(DecodeError::TxOverflow.into());
        }
    }

    Ok(total_len)
}
