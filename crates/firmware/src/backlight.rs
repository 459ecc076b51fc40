//! PWM backlight with blocking linear fades.
//!
//! Brightness is a fraction in `[0.0, 1.0]`. Out-of-range input (including
//! NaN) is clamped rather than rejected, so a brightness request never fails
//! on its value; only the PWM write itself can fail.

use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;

/// Steps used when a fade brightens
pub const FADE_IN_STEPS: u32 = 50;

/// Steps used when a fade dims
pub const FADE_OUT_STEPS: u32 = 30;

/// Clamp to `[0.0, 1.0]`; NaN maps to `0.0`.
#[inline]
pub fn clamp_fraction(fraction: f32) -> f32 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// `round(fraction * max_duty)` for a fraction already in `[0.0, 1.0]`.
#[inline]
pub fn duty_for(fraction: f32, max_duty: u16) -> u16 {
    (clamp_fraction(fraction) * f32::from(max_duty) + 0.5) as u16
}

/// Backlight controller
pub struct Backlight<P, D> {
    pwm: P,
    delay: D,
    max_duty: u16,
    level: f32,
    on: bool,
}

impl<P, D> Backlight<P, D>
where
    P: SetDutyCycle,
    D: DelayNs,
{
    /// Wrap a PWM channel. Nothing is written until the first
    /// [`set_brightness`](Self::set_brightness).
    pub fn new(pwm: P, delay: D) -> Self {
        let max_duty = pwm.max_duty_cycle();
        Self {
            pwm,
            delay,
            max_duty,
            level: 0.0,
            on: false,
        }
    }

    /// Last written brightness fraction
    pub fn brightness(&self) -> f32 {
        self.level
    }

    /// Whether the last write left the backlight lit
    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Full-scale duty of the PWM channel
    pub fn max_duty(&self) -> u16 {
        self.max_duty
    }

    /// Write `fraction` (clamped) as a duty cycle.
    pub fn set_brightness(&mut self, fraction: f32) -> Result<(), P::Error> {
        let level = clamp_fraction(fraction);
        self.pwm.set_duty_cycle(duty_for(level, self.max_duty))?;
        self.level = level;
        self.on = level > 0.0;
        Ok(())
    }

    /// Blocking linear fade from the current level to `target` (clamped).
    ///
    /// Brightening uses [`FADE_IN_STEPS`], dimming [`FADE_OUT_STEPS`]. The
    /// channel sees `steps + 1` writes: the first at the current level, the
    /// last exactly at `target`, with `duration / steps` between writes.
    pub fn fade_to(&mut self, target: f32, duration: Duration) -> Result<(), P::Error> {
        let start = self.level;
        let target = clamp_fraction(target);
        let steps = if target >= start {
            FADE_IN_STEPS
        } else {
            FADE_OUT_STEPS
        };
        let step_us = u32::try_from(duration.as_micros() / u64::from(steps)).unwrap_or(u32::MAX);

        for i in 0..=steps {
            let level = if i == steps {
                target
            } else {
                start + (target - start) * (i as f32 / steps as f32)
            };
            self.set_brightness(level)?;
            if i < steps {
                self.delay.delay_us(step_us);
            }
        }
        Ok(())
    }

    /// Fade to full brightness
    pub fn fade_on(&mut self, duration: Duration) -> Result<(), P::Error> {
        self.fade_to(1.0, duration)
    }

    /// Fade to off
    pub fn fade_off(&mut self, duration: Duration) -> Result<(), P::Error> {
        self.fade_to(0.0, duration)
    }

    /// Give back the PWM channel and delay
    pub fn release(self) -> (P, D) {
        (self.pwm, self.delay)
    }
}
