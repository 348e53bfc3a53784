//! Geräte-Kontext
//!
//! Bündelt Status-LED und Provisionierung in einem Wert, den die Firmware
//! einmal erzeugt und an HTTP-Handler und Tick-Task weiterreicht.

use embedded_hal::delay::DelayNs;

use crate::indicator::StatusIndicator;
use crate::provisioning::{Provisioner, ProvisioningConfig};
use crate::traits::{Clock, CredentialStore, NetworkDriver, PixelSink};
use crate::types::ConnectionState;

pub struct DeviceContext<P, C, N, S, D> {
    indicator: StatusIndicator<P, C>,
    provisioner: Provisioner<N, S, D>,
}

impl<P, C, N, S, D> DeviceContext<P, C, N, S, D>
where
    P: PixelSink,
    C: Clock,
    N: NetworkDriver,
    S: CredentialStore,
    D: DelayNs,
{
    pub fn new(sink: P, clock: C, network: N, store: S, delay: D, config: ProvisioningConfig) -> Self {
        Self {
            indicator: StatusIndicator::new(sink, clock),
            provisioner: Provisioner::new(network, store, delay, config),
        }
    }

    /// Schaltet die LED aus und startet die Provisionierung
    pub fn boot(&mut self) -> ConnectionState {
        self.indicator.set_off();
        self.provisioner.boot(&mut self.indicator)
    }

    /// Einmal pro Loop-Iteration aufrufen
    pub fn tick(&mut self) {
        self.indicator.tick();
    }

    pub fn state(&self) -> ConnectionState {
        self.provisioner.state()
    }

    pub fn indicator(&self) -> &StatusIndicator<P, C> {
        &self.indicator
    }

    pub fn indicator_mut(&mut self) -> &mut StatusIndicator<P, C> {
        &mut self.indicator
    }

    pub fn provisioner(&self) -> &Provisioner<N, S, D> {
        &self.provisioner
    }

    pub fn provisioner_mut(&mut self) -> &mut Provisioner<N, S, D> {
        &mut self.provisioner
    }

    /// Beide Hälften gleichzeitig (z.B. für `update_credentials`)
    pub fn split_mut(&mut self) -> (&mut StatusIndicator<P, C>, &mut Provisioner<N, S, D>) {
        (&mut self.indicator, &mut self.provisioner)
    }
}
