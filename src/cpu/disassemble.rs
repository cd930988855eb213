// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! A minimal opcode-name disassembler, used only by the `debug` feature's
//! execution trace. It is not a mnemonic-accurate disassembler: it names the
//! opcode byte (and its CB-prefixed second byte) without decoding operands.

#![cfg(feature = "debug")]

use std::format;
use std::string::String;

use super::Cpu;
use crate::GameboyError;

/// Returns a short human-readable label for the instruction at `address`.
pub fn disassemble(cpu: &Cpu, address: u16) -> Result<String, GameboyError> {
	let opcode = cpu.mmap.read(address)?;

	if opcode == 0xcb {
		let cb_opcode = cpu.mmap.read(address.wrapping_add(1))?;
		return Ok(format!("cb {:02x}", cb_opcode));
	}

	Ok(format!("{:02x}", opcode))
}
