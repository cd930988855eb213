// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! Gameboy's audio processing unit: four voices synthesized from register writes.
//!
//! The APU never generates samples itself; it derives frequency, amplitude
//! and pan from the sound registers each [`Apu::run`] call and drives an
//! [`oscillator::OscillatorSink`] per voice. Sample synthesis and real-time
//! playback are a host concern.

pub mod envelope;
pub mod frequency;
pub mod oscillator;
pub mod registers;
pub mod voice;
pub mod wave;

use alloc::boxed::Box;

use crate::bus::Memory;
use crate::bus::memory_range::MemoryRange;
use crate::{make_range, memory_range};
use crate::GameboyError;

use oscillator::{NullOscillator, OscillatorSink};
use registers::SoundRegister;
use voice::{Lfsr, Voice, VoiceExtra, VoiceParams};
use wave::WAVE_RAM_SIZE;

/// Register address constants for the sound controller's memory-mapped page.
#[allow(missing_docs)]
pub mod consts {
	use super::*;

	pub const NR10: u16 = 0xFF10;
	pub const NR11: u16 = 0xFF11;
	pub const NR12: u16 = 0xFF12;
	pub const NR13: u16 = 0xFF13;
	pub const NR14: u16 = 0xFF14;
	pub const NR21: u16 = 0xFF16;
	pub const NR22: u16 = 0xFF17;
	pub const NR23: u16 = 0xFF18;
	pub const NR24: u16 = 0xFF19;
	pub const NR30: u16 = 0xFF1A;
	pub const NR31: u16 = 0xFF1B;
	pub const NR32: u16 = 0xFF1C;
	pub const NR33: u16 = 0xFF1D;
	pub const NR34: u16 = 0xFF1E;
	pub const NR41: u16 = 0xFF20;
	pub const NR42: u16 = 0xFF21;
	pub const NR43: u16 = 0xFF22;
	pub const NR44: u16 = 0xFF23;
	pub const NR50: u16 = 0xFF24;
	pub const NR51: u16 = 0xFF25;
	pub const NR52: u16 = 0xFF26;
	pub const WAVE_RAM_START: u16 = 0xFF30;
	pub const WAVE_RAM_END: u16 = 0xFF3F;

	/// The whole sound controller's memory-mapped page, NR10 through wave RAM.
	pub const MMAP_IO_SOUND: MemoryRange = make_range!(0xFF10, 0xFF3F);
}

use consts::*;

/// Voice indices, in NR52/NR51 bit order: Pulse-A, Pulse-B, Wave, Noise.
const VOICE_COUNT: usize = 4;
const VOICE_WAVE: usize = 2;

/// Sweep time lookup for NR10[4..6], §4.3.3.
const SWEEP_TIME_TABLE: [f32; 8] = [0.0, 0.0078, 0.0156, 0.0234, 0.0313, 0.0391, 0.0469, 0.0547];
/// Duty cycle lookup for NRx1[6..7].
const DUTY_TABLE: [f32; 4] = [0.125, 0.25, 0.5, 0.75];
/// Noise divisor lookup for NR43[0..2], per SPEC_FULL.md §4.3.3.
const NOISE_DIVISOR_TABLE: [u32; 8] = [8, 16, 32, 48, 64, 80, 96, 112];

/// The gameboy's sound controller.
pub struct Apu {
	nr10: SoundRegister,
	nr11: SoundRegister,
	nr12: SoundRegister,
	nr13: SoundRegister,
	nr14: SoundRegister,
	nr21: SoundRegister,
	nr22: SoundRegister,
	nr23: SoundRegister,
	nr24: SoundRegister,
	nr30: SoundRegister,
	nr31: SoundRegister,
	nr32: SoundRegister,
	nr33: SoundRegister,
	nr34: SoundRegister,
	nr41: SoundRegister,
	nr42: SoundRegister,
	nr43: SoundRegister,
	nr44: SoundRegister,
	nr50: SoundRegister,
	nr51: SoundRegister,
	nr52: SoundRegister,
	wave_ram: [u8; WAVE_RAM_SIZE],
	wave_ram_version: u32,

	voices: [Voice; VOICE_COUNT],
	was_enabled: bool,
}

impl Apu {
	/// Create a new APU whose voices are all backed by a silent [`NullOscillator`].
	///
	/// Hosts that want real sound should build their APU via
	/// [`Apu::with_sinks`] instead, supplying one boxed sink per voice.
	pub fn new() -> Self {
		Apu::with_sinks([
			Box::new(NullOscillator),
			Box::new(NullOscillator),
			Box::new(NullOscillator),
			Box::new(NullOscillator),
		])
	}

	/// Create a new APU, in NR52/NR51 bit order: Pulse-A, Pulse-B, Wave, Noise.
	pub fn with_sinks(sinks: [Box<dyn OscillatorSink>; VOICE_COUNT]) -> Self {
		let [pulse_a, pulse_b, wave, noise] = sinks;

		Apu {
			nr10: SoundRegister::new(),
			nr11: SoundRegister::new(),
			nr12: SoundRegister::new(),
			nr13: SoundRegister::new(),
			nr14: SoundRegister::new(),
			nr21: SoundRegister::new(),
			nr22: SoundRegister::new(),
			nr23: SoundRegister::new(),
			nr24: SoundRegister::new(),
			nr30: SoundRegister::new(),
			nr31: SoundRegister::new(),
			nr32: SoundRegister::new(),
			nr33: SoundRegister::new(),
			nr34: SoundRegister::new(),
			nr41: SoundRegister::new(),
			nr42: SoundRegister::new(),
			nr43: SoundRegister::new(),
			nr44: SoundRegister::new(),
			nr50: SoundRegister::new(),
			nr51: SoundRegister::new(),
			nr52: SoundRegister::new(),
			wave_ram: [0; WAVE_RAM_SIZE],
			wave_ram_version: 0,
			voices: [
				Voice::new(VoiceExtra::PulseSweep(Default::default()), pulse_a),
				Voice::new(VoiceExtra::Pulse, pulse_b),
				Voice::new(VoiceExtra::Wave(Default::default()), wave),
				Voice::new(VoiceExtra::Noise(Lfsr::default()), noise),
			],
			was_enabled: false,
		}
	}

	/// Advance every voice's envelopes by the time `cycles` T-states represent.
	///
	/// `cycles` is the same integer [`crate::cpu::Cpu::execute`] returns;
	/// `Δt = cycles / 4_194_304` seconds, the DMG's master clock rate.
	pub fn run(&mut self, cycles: usize) {
		let dt = cycles as f32 / 4_194_304.0;
		let enabled = self.nr52.bit(7);

		if !enabled {
			if self.was_enabled {
				self.master_disable();
			}
			self.was_enabled = false;
			return;
		}

		self.was_enabled = true;

		let params = self.voice_params();
		for (i, params) in params.iter().enumerate() {
			self.voices[i].update(params, dt);
		}

		let output_shift = self.nr32.bits(5, 6);
		self.voices[VOICE_WAVE].refresh_waveform(&self.wave_ram, self.wave_ram_version, output_shift);

		self.apply_routing();
		self.update_status();
	}

	/// Zero every sound register on the falling edge of NR52 bit 7.
	fn master_disable(&mut self) {
		self.nr10.reset(0);
		self.nr11.reset(0);
		self.nr12.reset(0);
		self.nr13.reset(0);
		self.nr14.reset(0);
		self.nr21.reset(0);
		self.nr22.reset(0);
		self.nr23.reset(0);
		self.nr24.reset(0);
		self.nr30.reset(0);
		self.nr31.reset(0);
		self.nr32.reset(0);
		self.nr33.reset(0);
		self.nr34.reset(0);
		self.nr41.reset(0);
		self.nr42.reset(0);
		self.nr43.reset(0);
		self.nr44.reset(0);
		self.nr50.reset(0);
		self.nr51.reset(0);
		// NR52's own bit 7 was already the write that cleared it; leave the
		// playing-voice status bits (0..3) at zero too.
		self.nr52.reset(0);

		for voice in &mut self.voices {
			voice.set_routing(false, false);
			voice.update(&VoiceParams::default(), 0.0);
		}
	}

	fn voice_params(&self) -> [VoiceParams; VOICE_COUNT] {
		let pulse_a_bits = ((self.nr14.bits(0, 2) as u16) << 8) | self.nr13.read() as u16;
		let pulse_b_bits = ((self.nr24.bits(0, 2) as u16) << 8) | self.nr23.read() as u16;
		let wave_bits = ((self.nr34.bits(0, 2) as u16) << 8) | self.nr33.read() as u16;

		let pulse_a = VoiceParams {
			frequency: frequency::bits_to_frequency(pulse_a_bits),
			duty: DUTY_TABLE[self.nr11.bits(6, 7) as usize],
			amplitude_start_step: self.nr12.bits(4, 7),
			amplitude_increasing: self.nr12.bit(3),
			amplitude_step_duration: self.nr12.bits(0, 2) as f32 / 64.0,
			length_enabled: self.nr14.bit(6),
			length_duration: (64 - self.nr11.bits(0, 5) as i32) as f32 / 256.0,
			sweep_shifts: self.nr10.bits(0, 2),
			sweep_increasing: self.nr10.bit(3),
			sweep_time: SWEEP_TIME_TABLE[self.nr10.bits(4, 6) as usize],
			dac_enabled: self.nr12.bits(3, 7) != 0,
			trigger_version: self.nr14.version(),
			trigger_bit: self.nr14.bit(7),
			..Default::default()
		};

		let pulse_b = VoiceParams {
			frequency: frequency::bits_to_frequency(pulse_b_bits),
			duty: DUTY_TABLE[self.nr21.bits(6, 7) as usize],
			amplitude_start_step: self.nr22.bits(4, 7),
			amplitude_increasing: self.nr22.bit(3),
			amplitude_step_duration: self.nr22.bits(0, 2) as f32 / 64.0,
			length_enabled: self.nr24.bit(6),
			length_duration: (64 - self.nr21.bits(0, 5) as i32) as f32 / 256.0,
			dac_enabled: self.nr22.bits(3, 7) != 0,
			trigger_version: self.nr24.version(),
			trigger_bit: self.nr24.bit(7),
			..Default::default()
		};

		let wave = VoiceParams {
			frequency: frequency::bits_to_frequency(wave_bits),
			amplitude_start_step: 15,
			amplitude_increasing: false,
			amplitude_step_duration: 0.0,
			length_enabled: self.nr34.bit(6),
			length_duration: (256 - self.nr31.read() as i32) as f32 / 256.0,
			wave_output_shift: self.nr32.bits(5, 6),
			dac_enabled: self.nr30.bit(7),
			trigger_version: self.nr34.version(),
			trigger_bit: self.nr34.bit(7),
			..Default::default()
		};

		let shift = self.nr43.bits(4, 7);
		let divisor = NOISE_DIVISOR_TABLE[self.nr43.bits(0, 2) as usize] as f32;
		let noise_frequency = 524288.0 / divisor / (1u32 << shift) as f32;

		let noise = VoiceParams {
			amplitude_start_step: self.nr42.bits(4, 7),
			amplitude_increasing: self.nr42.bit(3),
			amplitude_step_duration: self.nr42.bits(0, 2) as f32 / 64.0,
			length_enabled: self.nr44.bit(6),
			length_duration: (64 - self.nr41.bits(0, 5) as i32) as f32 / 256.0,
			noise_half_period: 1.0 / (2.0 * noise_frequency),
			noise_width7: self.nr43.bit(3),
			dac_enabled: self.nr42.bits(3, 7) != 0,
			trigger_version: self.nr44.version(),
			trigger_bit: self.nr44.bit(7),
			..Default::default()
		};

		[pulse_a, pulse_b, wave, noise]
	}

	/// Apply NR51 stereo routing: bits 0..3 = right channel, bits 4..7 = left.
	fn apply_routing(&mut self) {
		for (i, voice) in self.voices.iter_mut().enumerate() {
			let right_on = self.nr51.bit(i as u8);
			let left_on = self.nr51.bit(i as u8 + 4);
			voice.set_routing(left_on, right_on);
		}
	}

	/// Write each voice's playing status back into NR52 bits 0..3.
	fn update_status(&mut self) {
		let mut status = self.nr52.read() & 0x80;
		for (i, voice) in self.voices.iter().enumerate() {
			if !voice.stopped() {
				status |= 1 << i;
			}
		}
		self.nr52.reset(status);
	}

	/// NR50's per-channel master volume, `0.0..=1.0` each, `(left, right)`.
	///
	/// Per the Open Question decision (§9), NR50 is applied at master-mix
	/// time rather than per-voice: this core exposes the raw register as a
	/// single scale pair the host reads once per [`Apu::run`] call and
	/// applies to its own final stereo mix, rather than scaling each voice's
	/// amplitude individually.
	pub fn master_volume(&self) -> (f32, f32) {
		let left = self.nr50.bits(4, 6) as f32 / 7.0;
		let right = self.nr50.bits(0, 2) as f32 / 7.0;
		(left, right)
	}

	fn register(&self, address: u16) -> Option<&SoundRegister> {
		Some(match address {
			NR10 => &self.nr10,
			NR11 => &self.nr11,
			NR12 => &self.nr12,
			NR13 => &self.nr13,
			NR14 => &self.nr14,
			NR21 => &self.nr21,
			NR22 => &self.nr22,
			NR23 => &self.nr23,
			NR24 => &self.nr24,
			NR30 => &self.nr30,
			NR31 => &self.nr31,
			NR32 => &self.nr32,
			NR33 => &self.nr33,
			NR34 => &self.nr34,
			NR41 => &self.nr41,
			NR42 => &self.nr42,
			NR43 => &self.nr43,
			NR44 => &self.nr44,
			NR50 => &self.nr50,
			NR51 => &self.nr51,
			NR52 => &self.nr52,
			_ => return None,
		})
	}

	fn register_mut(&mut self, address: u16) -> Option<&mut SoundRegister> {
		Some(match address {
			NR10 => &mut self.nr10,
			NR11 => &mut self.nr11,
			NR12 => &mut self.nr12,
			NR13 => &mut self.nr13,
			NR14 => &mut self.nr14,
			NR21 => &mut self.nr21,
			NR22 => &mut self.nr22,
			NR23 => &mut self.nr23,
			NR24 => &mut self.nr24,
			NR30 => &mut self.nr30,
			NR31 => &mut self.nr31,
			NR32 => &mut self.nr32,
			NR33 => &mut self.nr33,
			NR34 => &mut self.nr34,
			NR41 => &mut self.nr41,
			NR42 => &mut self.nr42,
			NR43 => &mut self.nr43,
			NR44 => &mut self.nr44,
			NR50 => &mut self.nr50,
			NR51 => &mut self.nr51,
			NR52 => &mut self.nr52,
			_ => return None,
		})
	}
}

impl Default for Apu {
	fn default() -> Self {
		Apu::new()
	}
}

impl Memory for Apu {
	fn write(&mut self, address: u16, value: u8) -> Result<(), GameboyError> {
		match address {
			memory_range!(MMAP_IO_SOUND) if (WAVE_RAM_START..=WAVE_RAM_END).contains(&address) => {
				self.wave_ram[(address - WAVE_RAM_START) as usize] = value;
				self.wave_ram_version = self.wave_ram_version.wrapping_add(1);
				Ok(())
			}
			NR52 => {
				// Only bit 7 (master enable) is writable; status bits 0..3 are
				// derived every `run()` call and the unused bits read as 1.
				self.nr52.write(value & 0x80);
				Ok(())
			}
			_ => match self.register_mut(address) {
				Some(register) => {
					register.write(value);
					Ok(())
				}
				// Unused register slots in the 0xFF27..0xFF2F gap: silently ignored.
				None => Ok(()),
			},
		}
	}

	fn read(&self, address: u16) -> Result<u8, GameboyError> {
		match address {
			memory_range!(MMAP_IO_SOUND) if (WAVE_RAM_START..=WAVE_RAM_END).contains(&address) => {
				Ok(self.wave_ram[(address - WAVE_RAM_START) as usize])
			}
			NR52 => Ok((self.nr52.read() & 0x8F) | 0x70),
			_ => match self.register(address) {
				Some(register) => Ok(register.read()),
				None => Ok(0xFF),
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write(apu: &mut Apu, address: u16, value: u8) {
		apu.write(address, value).unwrap();
	}

	#[test]
	fn master_disable_clears_every_sound_register() {
		let mut apu = Apu::new();
		write(&mut apu, NR52, 0x80);
		write(&mut apu, NR10, 0x7F);
		write(&mut apu, NR11, 0xFF);
		write(&mut apu, NR50, 0x77);

		// Enable, then run once so the APU observes the enabled state.
		apu.run(4);
		assert_ne!(apu.read(NR10).unwrap(), 0);

		// Falling edge of bit 7.
		write(&mut apu, NR52, 0x00);
		apu.run(4);

		assert_eq!(apu.read(NR10).unwrap(), 0);
		assert_eq!(apu.read(NR11).unwrap(), 0);
		assert_eq!(apu.read(NR50).unwrap(), 0);
	}

	#[test]
	fn sweep_deactivation_clears_nr52_bit0() {
		let mut apu = Apu::new();
		write(&mut apu, NR52, 0x80);
		// sweepTime=0.0078 (0b001), increasing (bit3=1), shifts=7 (0b111).
		write(&mut apu, NR10, 0b0_001_1_111);
		write(&mut apu, NR13, 0xFF);
		write(&mut apu, NR14, 0b1000_0111); // trigger=1, bits[0..2]=0b111 -> start bits 0x7FF
		write(&mut apu, NR12, 0xF0); // max volume, DAC on

		let cycles = (4_194_304.0 * 0.008) as usize;
		apu.run(cycles);

		assert_eq!(apu.read(NR52).unwrap() & 0x01, 0);
	}

	#[test]
	fn wave_ram_roundtrips_and_bumps_version() {
		let mut apu = Apu::new();
		write(&mut apu, 0xFF30, 0xAB);
		assert_eq!(apu.read(0xFF30).unwrap(), 0xAB);
		assert_eq!(apu.wave_ram_version, 1);
	}

	#[test]
	fn master_volume_reads_nr50_without_scaling_voices() {
		let mut apu = Apu::new();
		// Left=7 (max), right=3.
		write(&mut apu, NR50, 0b0_111_0_011);
		let (left, right) = apu.master_volume();
		assert_eq!(left, 1.0);
		assert!((right - 3.0 / 7.0).abs() < 1e-6);
	}

	#[test]
	fn disabled_apu_ignores_run() {
		let mut apu = Apu::new();
		// NR52 bit 7 left clear: the APU must not process voices.
		write(&mut apu, NR11, 0xFF);
		apu.run(1000);
		assert_eq!(apu.read(NR11).unwrap(), 0xFF);
	}
}
