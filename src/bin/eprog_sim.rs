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

//! Host-side simulator: runs the command server against a simulated parallel
//! memory array and a loopback SPI device, talking the wire protocol over
//! stdin/stdout. Lets a client exercise the protocol without real hardware.

use std::io::{self, Read, Write};

use eprog_core::mock::MockProgrammer;
use eprog_core::backend::TransportBackend;
use eprog_core::Session;

const MEMORY_SIZE: usize = 1 << 16;
const RX_CAP: usize = 264;
const TX_CAP: usize = 264;

struct StdioTransport {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl TransportBackend for StdioTransport {
    type Error = io::Error;

    fn get_data(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.stdin.lock().read_exact(buf)
    }

    fn put_data(&mut self, buf: &[u8]) -> Result<(), Self::Error> {
        self.stdout.lock().write_all(buf)?;
        self.stdout.lock().flush()
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Stdin has no discard-pending-bytes primitive; Sync's realignment
        // guarantee relies on the host not sending further bytes until it
        // sees our ACK.
        Ok(())
    }

    fn data_waiting(&self) -> bool {
        true
    }
}

fn main() {
    env_logger::init();

    let mut session = Session::<RX_CAP, TX_CAP>::new();
    let mut programmer = MockProgrammer::new(MEMORY_SIZE);
    let mut transport = StdioTransport {
        stdin: io::stdin(),
        stdout: io::stdout(),
    };

    log::info!("eprog-sim: serving on stdio, {} byte memory", MEMORY_SIZE);

    loop {
        match session.tick(&mut programmer, &mut transport) {
            Ok(_) => {}
            Err(err) => {
                log::error!("tick failed: {:?}", err);
                break;
            }
        }
    }
}
