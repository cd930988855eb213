// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Gameboy's processor emulation.

pub mod alu;
pub mod state;
pub mod decode;
pub mod interrupts;
pub mod disassemble;
pub mod instructions;

use num::PrimInt;
use core::mem::size_of;
use core::ops::{AddAssign, Shl};

use state::*;
use state::registers::*;
use instructions::{Instruction, enter_interrupt};

use crate::GameboyError;
use crate::config::Config;
use crate::bus::joypad::Controller;

use crate::bus::*;
use crate::bus::cartridge::*;
use crate::cpu::interrupts::*;

/// The gameboy's processor.
///
/// This struct contains the complete emulator's state.
pub struct Cpu<'a> {
	/// The cpu's registers and latched interrupt/power state.
	pub registers: CpuState,
	/// The devices' memory mapping
	pub mmap: SystemBus<'a>,
	/// The emulator's configuration
	pub config: &'a Config,
}

impl<'a> Cpu<'a> {
	/// Initializes a new virtual cpu
	#[inline(always)]
	pub fn new(config: &'a Config, cartridge: &'a mut Cartridge<'a>) -> Self {
		Cpu {
			registers: CpuState::new(config),
			mmap: SystemBus::new(&config, cartridge),
			config,
		}
	}

	/// Apply the given closure to the game controller.
	pub fn with_controller<F>(&mut self, closure: F)
		where F: FnOnce(&mut dyn Controller) -> () {
			closure(&mut self.mmap.joypad);
	}

	/// Reads the next instruction bytes and increments the program counter appropriately.
	///
	/// The function works in little-endian, that is, when reading 2 bytes,
	/// the first byte will be the least-significant one.
	pub fn fetch<T: PrimInt + AddAssign + Shl<Output=T>>(&mut self) -> Result<T, GameboyError> {
		let mut result: T = num::cast(0).unwrap();

		for i in 0..size_of::<T>() {
			// Read the next byte.
			let pc: u16 = self.registers.get(Register::PC);
			let data: T = num::cast::<u8, T>(self.mmap.read(pc)?).unwrap();

			// We're using little-endianity.
			result += data << num::cast::<usize, T>(8 * i).unwrap();

			if self.registers.take_halt_bug() {
				// The halt bug prevents the program counter from being incremented once.
			} else {
				// Move the PC forward.
				self.registers.set(Register::PC, pc + 1);
			}
		}

		Ok(result)
	}

	/// Writes the display's data to the given frame buffer.
	pub fn flush(&mut self, frame_buffer: &mut [u32]) {
		self.mmap.ppu.flush(frame_buffer);
	}

	/// Emulates the execution of a single instruction.
	///	This function also processes the peripherals and enters interrupts if any.
	///
	/// Returns the number of clock cycles the instruction has taken.
	pub fn execute(&mut self) -> Result<usize, GameboyError> {
		// Enter an interrupt if any (and if interrupts are enabled).
		let mut num_cycles = self.handle_interrupts()?;

		if !self.registers.halted() {
			num_cycles += self.execute_single()?;
		} else {
			num_cycles += 4;
		}

		// Apply a pending EI, one instruction after it was requested.
		self.registers.tick_ime_delay();

		// Progress the peripherals.
		self.mmap.process(num_cycles);

		Ok(num_cycles)
	}

	/// Emulates the execution of a single instruction.
	///
	/// Returns the number of clock cycles the instruction has taken.
	pub fn execute_single(&mut self) -> Result<usize, GameboyError> {
		#[cfg(feature = "debug")]
		let address: u16 = self.registers.get(Register::PC);

		// Fetch the opcode from the memory.
		let opcode: u8 = self.fetch()?;

		#[cfg(feature = "debug")]
		{
			log::trace!("0x{:04x}: ({:02x}) {}", address, opcode, disassemble::disassemble(self, address)?);
		}

		// Decode the given opcode.
		let insn: Instruction = self.decode(opcode)?;

		// Execute and return the number of cycles taken.
		Ok(insn(self)?)
	}

	fn handle_interrupts(&mut self) -> Result<usize, GameboyError> {
		if !self.registers.ime() {
			// Stop halting if there's any active interrupt.
			// We wake the cpu in a case of an interrupt, but we won't
			// enter the ISR if interrupts are disabled.
			if self.registers.halted() && self.mmap.interrupt_flag != 0 {
				self.registers.wake();
			}
			return Ok(0);
		}

		if let Some(interrupt) = self.mmap.fetch_interrupt() {
			// Stop halting (if relevant) and enter the ISR.
			self.registers.wake();

			let isr = match interrupt {
				Interrupt::VerticalBlank => 0x0040,
				Interrupt::LcdStat => 0x0048,
				Interrupt::Timer => 0x0050,
				Interrupt::Serial => 0x0058,
				Interrupt::Joypad => 0x0060,
			};

			return Ok(enter_interrupt(self, isr)?);
		}

		Ok(0)
	}
}

#[cfg(test)]
#[cfg(feature = "alloc")]
pub mod tests {
	use super::*;
	use alloc::boxed::Box;

	/// With-closure for running logic with an initialized cpu instance.
	pub fn with_cpu<F>(callback: F) -> Result<(), GameboyError>
		where F: FnOnce(&mut Cpu) -> Result<(), GameboyError> {
		// Initialize the cpu
		let config = Config::default();
		let mut rom = cartridge::tests::empty_rom(CartridgeType::MBC3);
		let mut ram: Box<[u8]> = Cartridge::make_ram(&rom)?;
		let mut cartridge = Cartridge::new(&mut rom, &mut ram)?;

		let mut cpu = Cpu::new(&config, &mut cartridge);

		callback(&mut cpu)
	}

	#[test]
	fn test_fetch() -> Result<(), GameboyError> {
		with_cpu(|cpu| {
			// Move the program counter to the RAM bank.
			cpu.registers.set(Register::PC, 0xA000);

			// Write arbitrary data to the memory starting from the program counter.
			let data: &[u8] = &[1, 2, 3];
			cpu.mmap.cartridge.set_ram_enabled(true);
			cpu.mmap.write_all(cpu.registers.get(Register::PC), data)?;

			// Make sure that fetch works as expected.
			assert!(cpu.fetch::<u16>()? == 0x0201);
			assert!(cpu.fetch::<u8>()? == 0x03);

			Ok(())
		})
	}
}
