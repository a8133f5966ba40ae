//! Relay-board actuators over `embedded-hal` output pins.
//!
//! Two relay channels (fan, water pump), each with its own polarity:
//! many opto-isolated relay boards are low-trigger, most pump drivers are
//! active-high.
//!
//! Every command drives the pin, even when the requested state matches
//! the recorded one, so a relay that was reset behind our back is brought
//! back in line on the next cycle.

use embedded_hal::digital::OutputPin;
use log::warn;

use crate::app::ports::ActuatorPort;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Pin HIGH energises the relay.
    ActiveHigh,
    /// Pin LOW energises the relay.
    ActiveLow,
}

/// One relay output.
pub struct RelayChannel<P> {
    pin: P,
    polarity: Polarity,
    /// Last state successfully written; `None` until the first write.
    state: Option<bool>,
}

impl<P: OutputPin> RelayChannel<P> {
    pub fn new(pin: P, polarity: Polarity) -> Self {
        Self {
            pin,
            polarity,
            state: None,
        }
    }

    /// Energise (`true`) or release the relay.
    pub fn drive(&mut self, on: bool) -> Result<(), P::Error> {
        let high = match self.polarity {
            Polarity::ActiveHigh => on,
            Polarity::ActiveLow => !on,
        };
        if high {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.state = Some(on);
        Ok(())
    }

    pub fn state(&self) -> Option<bool> {
        self.state
    }

    pub fn release(self) -> P {
        self.pin
    }
}

/// Fan and pump relays behind [`ActuatorPort`].
pub struct RelayActuators<F, P> {
    fan: RelayChannel<F>,
    pump: RelayChannel<P>,
}

impl<F: OutputPin, P: OutputPin> RelayActuators<F, P> {
    pub fn new(fan: RelayChannel<F>, pump: RelayChannel<P>) -> Self {
        Self { fan, pump }
    }

    pub fn fan_state(&self) -> Option<bool> {
        self.fan.state()
    }

    pub fn pump_state(&self) -> Option<bool> {
        self.pump.state()
    }
}

impl<F: OutputPin, P: OutputPin> ActuatorPort for RelayActuators<F, P> {
    fn set_fan(&mut self, on: bool) -> bool {
        match self.fan.drive(on) {
            Ok(()) => true,
            Err(e) => {
                warn!("Fan relay write failed: {:?}", e);
                false
            }
        }
    }

    fn set_water_pump(&mut self, on: bool) -> bool {
        match self.pump.drive(on) {
            Ok(()) => true,
            Err(e) => {
                warn!("Pump relay write failed: {:?}", e);
                false
            }
        }
    }
}
