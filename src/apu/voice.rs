// Copyright 2021 Nir H. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
//! A single audio voice: envelopes, a variant-specific extra, and its sink.
//!
//! Subclass polymorphism (`Voice` -> `Pulse` -> `PulseWithSweep`) is replaced
//! here with a single [`Voice`] plus a [`VoiceExtra`] tag; the reset behavior
//! that used to live in an overridden `onTriggered` method becomes a match
//! arm in [`Voice::on_triggered`].

use alloc::boxed::Box;

use super::envelope::{AmplitudeEnvelope, EnvelopeStatus, FrequencySweepEnvelope, LengthEnvelope};
use super::oscillator::{OscillatorSink, Panner};
use super::wave::WaveformMemo;

/// How long the APU ramps amplitude and frequency changes, per §4.3.2.
pub const PARAMETER_RAMP_SECONDS: f32 = 0.01;

/// Parameters read off a voice's NRx0..NRx4 registers for one `run()` call.
#[derive(Clone, Copy, Default)]
pub struct VoiceParams {
	/// Base frequency in Hz (meaningless for the noise voice).
	pub frequency: f32,
	/// Duty cycle, `0.0..=1.0` (pulse voices only).
	pub duty: f32,
	/// Starting amplitude step, `0..=15`.
	pub amplitude_start_step: u8,
	/// Whether the amplitude envelope counts up.
	pub amplitude_increasing: bool,
	/// Seconds between amplitude envelope steps.
	pub amplitude_step_duration: f32,
	/// Whether the length counter gates the voice.
	pub length_enabled: bool,
	/// Total seconds the length counter allows the voice to sound.
	pub length_duration: f32,
	/// Sweep shift amount, `0..=7` (Pulse-A only).
	pub sweep_shifts: u8,
	/// Whether the sweep raises the frequency (Pulse-A only).
	pub sweep_increasing: bool,
	/// Seconds between sweep steps (Pulse-A only).
	pub sweep_time: f32,
	/// Output shift applied to wave RAM nibbles (wave voice only).
	pub wave_output_shift: u8,
	/// Whether DAC/channel is enabled at all (wave voice's NR30.bit7).
	pub dac_enabled: bool,
	/// Noise LFSR half-period in seconds (noise voice only).
	pub noise_half_period: f32,
	/// Noise LFSR width, `true` = 7-bit, `false` = 15-bit.
	pub noise_width7: bool,
	/// The register version observed for NRx4; used to detect the trigger edge.
	pub trigger_version: u32,
	/// The live value of NRx4 bit 7 at the time `trigger_version` was observed.
	pub trigger_bit: bool,
}

/// Per-voice kind data that doesn't fit the common envelope set.
pub enum VoiceExtra {
	/// A plain square voice (Pulse-B).
	Pulse,
	/// A square voice with a frequency sweep (Pulse-A).
	PulseSweep(FrequencySweepEnvelope),
	/// The custom waveform voice.
	Wave(WaveformMemo),
	/// The noise voice, clocked by a linear feedback shift register.
	Noise(Lfsr),
}

/// A 15-bit (or 7-bit) linear feedback shift register driving the noise voice.
#[derive(Clone, Copy, Debug)]
pub struct Lfsr {
	register: u16,
	elapsed: f32,
}

impl Default for Lfsr {
	fn default() -> Self {
		Lfsr { register: 0x7FFF, elapsed: 0.0 }
	}
}

impl Lfsr {
	/// Reseed to all-bits-set, as happens on trigger.
	pub fn reset(&mut self) {
		self.register = 0x7FFF;
		self.elapsed = 0.0;
	}

	fn clock(&mut self, width7: bool) {
		let bit = (self.register & 1) ^ ((self.register >> 1) & 1);
		self.register >>= 1;
		self.register |= bit << 14;

		if width7 {
			self.register &= !(1 << 6);
			self.register |= bit << 6;
		}
	}

	/// Advance by `dt` seconds at the given `half_period`, returning the current output bit.
	pub fn advance(&mut self, dt: f32, half_period: f32, width7: bool) -> bool {
		if half_period > 0.0 {
			self.elapsed += dt;

			// Catch up on every half-period boundary crossed since the last call.
			while self.elapsed >= half_period {
				self.elapsed -= half_period;
				self.clock(width7);
			}
		}

		self.register & 1 == 0
	}
}

/// The externally observable part of a voice's state.
#[derive(Clone, Copy, Default, Debug)]
pub struct VoiceState {
	/// Current output frequency, Hz.
	pub frequency: f32,
	/// Current envelope amplitude, `0.0..=1.0`.
	pub amplitude: f32,
	/// Current pan, `-1.0` (left) .. `+1.0` (right), `0.0` = both.
	pub pan: f32,
	/// Host-requested mute, independent of envelope state.
	pub muted: bool,
	/// Whether an envelope has deactivated the voice.
	pub stopped: bool,
	/// Whether NR51 routes this voice to the left channel.
	pub left_on: bool,
	/// Whether NR51 routes this voice to the right channel.
	pub right_on: bool,
}

/// One of the APU's four independent sound sources.
pub struct Voice {
	/// The voice's externally observable state.
	pub state: VoiceState,
	amplitude_envelope: AmplitudeEnvelope,
	length_envelope: LengthEnvelope,
	extra: VoiceExtra,
	last_trigger_version: u32,
	sink: Panner<dyn OscillatorSink>,
}

impl Voice {
	/// Create a new voice of the given kind, backed by `sink`.
	pub fn new(extra: VoiceExtra, sink: Box<dyn OscillatorSink>) -> Self {
		Voice {
			state: VoiceState::default(),
			amplitude_envelope: AmplitudeEnvelope::default(),
			length_envelope: LengthEnvelope::default(),
			extra,
			last_trigger_version: 0,
			sink: Panner::new_boxed(sink),
		}
	}

	fn on_triggered(&mut self, params: &VoiceParams) {
		self.amplitude_envelope = AmplitudeEnvelope {
			start_step: params.amplitude_start_step,
			increasing: params.amplitude_increasing,
			step_duration: params.amplitude_step_duration,
			..Default::default()
		};
		self.length_envelope = LengthEnvelope {
			enabled: params.length_enabled,
			duration: params.length_duration,
			..Default::default()
		};

		match &mut self.extra {
			VoiceExtra::Pulse | VoiceExtra::Wave(_) => {}
			VoiceExtra::PulseSweep(sweep) => {
				*sweep = FrequencySweepEnvelope {
					start_frequency: params.frequency,
					sweep_increasing: params.sweep_increasing,
					sweep_shifts: params.sweep_shifts,
					sweep_time: params.sweep_time,
					..Default::default()
				};
			}
			VoiceExtra::Noise(lfsr) => lfsr.reset(),
		}

		self.sink.sink_mut().start();
	}

	/// Advance this voice by `dt` seconds given this run's register-derived parameters.
	pub fn update(&mut self, params: &VoiceParams, dt: f32) {
		let triggered_edge = params.trigger_version != self.last_trigger_version && params.trigger_bit;
		self.last_trigger_version = params.trigger_version;

		if triggered_edge {
			self.on_triggered(params);
		} else {
			// Parameters may change without a trigger (e.g. mid-note duty/length
			// register writes); keep non-reset fields current without
			// restarting elapsed-time accounting.
			self.length_envelope.enabled = params.length_enabled;
			self.length_envelope.duration = params.length_duration;
			if let VoiceExtra::PulseSweep(sweep) = &mut self.extra {
				sweep.sweep_increasing = params.sweep_increasing;
				sweep.sweep_shifts = params.sweep_shifts;
				sweep.sweep_time = params.sweep_time;
			}
		}

		let amplitude = self.amplitude_envelope.advance(dt);
		let length_status = self.length_envelope.advance(dt);

		let (frequency, sweep_status) = match &mut self.extra {
			VoiceExtra::PulseSweep(sweep) => sweep.advance(dt),
			_ => (params.frequency, EnvelopeStatus::Active),
		};

		let playing = length_status == EnvelopeStatus::Active && sweep_status == EnvelopeStatus::Active
			&& params.dac_enabled;

		self.state.frequency = frequency;
		self.state.amplitude = amplitude;
		self.state.stopped = !playing;

		match &mut self.extra {
			VoiceExtra::Pulse | VoiceExtra::PulseSweep(_) => {
				self.sink.sink_mut().set_pulse_width(params.duty);
			}
			VoiceExtra::Wave(waveform) => {
				// Wave RAM contents are pushed by the caller via `refresh_waveform`,
				// since only `Apu::run` has the raw bytes; nothing to do here.
				let _ = waveform;
			}
			VoiceExtra::Noise(lfsr) => {
				let high = lfsr.advance(dt, params.noise_half_period, params.noise_width7);
				self.state.amplitude = if high { amplitude } else { 0.0 };
			}
		}

		self.apply_ramp();
	}

	/// For the wave voice, refresh and push the memoized waveform table if stale.
	pub fn refresh_waveform(&mut self, wave_ram: &[u8; super::wave::WAVE_RAM_SIZE], wave_ram_version: u32, output_shift: u8) {
		if let VoiceExtra::Wave(memo) = &mut self.extra {
			if let Some(table) = memo.refresh(wave_ram, wave_ram_version, output_shift) {
				self.sink.sink_mut().set_wavetable(table);
			}
		}
	}

	/// Apply NR51 stereo routing: which channels this voice is routed to.
	pub fn set_routing(&mut self, left_on: bool, right_on: bool) {
		self.state.left_on = left_on;
		self.state.right_on = right_on;
		self.state.pan = match (left_on, right_on) {
			(true, false) => -1.0,
			(false, true) => 1.0,
			_ => 0.0,
		};
	}

	/// Host-controlled mute, independent of the DMG's own envelopes.
	pub fn set_muted(&mut self, muted: bool) {
		self.state.muted = muted;
	}

	/// Whether an envelope has silenced the voice.
	pub fn stopped(&self) -> bool {
		self.state.stopped
	}

	fn apply_ramp(&mut self) {
		let silent = self.state.muted || self.state.stopped || (!self.state.left_on && !self.state.right_on);
		let target_amplitude = if silent { 0.0 } else { self.state.amplitude };

		let sink = self.sink.sink_mut();
		sink.ramp_amplitude(target_amplitude, PARAMETER_RAMP_SECONDS);
		sink.ramp_frequency(self.state.frequency, PARAMETER_RAMP_SECONDS);
		self.sink.ramp_pan(self.state.pan, PARAMETER_RAMP_SECONDS);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::apu::oscillator::NullOscillator;

	fn pulse_voice() -> Voice {
		Voice::new(VoiceExtra::Pulse, Box::new(NullOscillator))
	}

	#[test]
	fn trigger_resets_envelopes_and_starts_playing() {
		let mut voice = pulse_voice();
		let params = VoiceParams {
			frequency: 440.0,
			amplitude_start_step: 15,
			amplitude_increasing: false,
			amplitude_step_duration: 1.0,
			length_enabled: false,
			dac_enabled: true,
			trigger_version: 1,
			trigger_bit: true,
			..Default::default()
		};

		voice.update(&params, 0.0);
		assert!(!voice.stopped());
		assert_eq!(voice.state.amplitude, 1.0);
	}

	#[test]
	fn repeated_trigger_without_new_version_does_not_reset() {
		let mut voice = pulse_voice();
		let mut params = VoiceParams {
			amplitude_start_step: 15,
			amplitude_step_duration: 1.0,
			dac_enabled: true,
			trigger_version: 1,
			trigger_bit: true,
			..Default::default()
		};

		voice.update(&params, 1.0);
		let amp_after_first = voice.state.amplitude;

		// Same trigger_version: no new edge, envelope keeps advancing.
		params.trigger_bit = true;
		voice.update(&params, 1.0);
		assert!(voice.state.amplitude <= amp_after_first);
	}

	#[test]
	fn no_dac_means_not_playing() {
		let mut voice = pulse_voice();
		let params = VoiceParams {
			dac_enabled: false,
			trigger_version: 1,
			trigger_bit: true,
			..Default::default()
		};

		voice.update(&params, 0.0);
		assert!(voice.stopped());
	}

	#[test]
	fn noise_lfsr_clocks_over_time() {
		let mut lfsr = Lfsr::default();
		let before = lfsr.register;
		lfsr.advance(1.0, 0.1, false);
		assert_ne!(lfsr.register, before);
	}
}
