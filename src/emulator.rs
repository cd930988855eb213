// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! The emulation library's front-end API.

use crate::cpu::*;
use crate::bus::cartridge::*;
use crate::GameboyError;
use crate::config::Config;

/// The complete emulator's state.
///
/// Thin wrapper around [`Cpu`], which already owns the system bus (and so the
/// APU and every other memory-mapped peripheral); this is the crate's
/// front-end entry point for a scheduler to drive with repeated [`Emulator::step`] calls.
pub struct Emulator<'a> {
	// Interrupts, system tick, cpu speed, serial ports and etc. should come here

	/// The gameboy's processor, and (through it) its memory bus and peripherals.
	pub cpu: Cpu<'a>,
	/// The emulator's configuration
	pub config: &'a Config,
}

impl<'a> Emulator<'a> {
	/// Create a new emulator.
	#[inline(always)]
	pub fn new(config: &'a Config, cartridge: &'a mut Cartridge<'a>) -> Self {
		Emulator {
			cpu: Cpu::new(config, cartridge),
			config,
		}
	}

	/// Run a single fetch-decode-execute step and advance every peripheral
	/// (including the APU) by the resulting cycle count.
	pub fn step(&mut self) -> Result<usize, GameboyError> {
		self.cpu.execute()
	}
}
