// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`Transport`] backed by `btleplug`.

use std::time::Duration;

use btleplug::api::{
    Central, CharPropFlags, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};

use super::{Advertisement, CharacteristicId, Transport, TransportError};

/// BLE transport using the first adapter reported by the platform.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use lightdesk::transport::{BtleTransport, Transport};
///
/// # async fn example() -> Result<(), lightdesk::transport::TransportError> {
/// let transport = BtleTransport::new().await?;
/// for adv in transport.scan(Duration::from_secs(6)).await? {
///     println!("{:?} {}", adv.name, adv.address);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BtleTransport {
    adapter: Adapter,
}

impl BtleTransport {
    /// Opens the platform BLE manager and picks its first adapter.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::AdapterUnavailable` if there is no adapter.
    pub async fn new() -> Result<Self, TransportError> {
        let manager = Manager::new().await.map_err(ble_error)?;
        let adapter = manager
            .adapters()
            .await
            .map_err(ble_error)?
            .into_iter()
            .next()
            .ok_or_else(|| TransportError::AdapterUnavailable("no adapters found".to_string()))?;
        Ok(Self { adapter })
    }

    /// Wraps an adapter chosen by the caller.
    #[must_use]
    pub fn with_adapter(adapter: Adapter) -> Self {
        Self { adapter }
    }

    async fn find_peripheral(&self, address: &str) -> Result<Peripheral, TransportError> {
        let peripherals = self.adapter.peripherals().await.map_err(ble_error)?;
        peripherals
            .into_iter()
            .find(|p| p.address().to_string().eq_ignore_ascii_case(address))
            .ok_or_else(|| TransportError::NotFound(address.to_string()))
    }
}

impl Transport for BtleTransport {
    type Session = Peripheral;

    async fn scan(&self, timeout: Duration) -> Result<Vec<Advertisement>, TransportError> {
        self.adapter
            .start_scan(ScanFilter::default())
            .await
            .map_err(ble_error)?;
        tokio::time::sleep(timeout).await;
        if let Err(e) = self.adapter.stop_scan().await {
            tracing::warn!(error = %e, "Failed to stop BLE scan");
        }

        let mut found = Vec::new();
        for peripheral in self.adapter.peripherals().await.map_err(ble_error)? {
            let name = peripheral
                .properties()
                .await
                .map_err(ble_error)?
                .and_then(|props| props.local_name);
            found.push(Advertisement {
                name,
                address: peripheral.address().to_string(),
            });
        }
        Ok(found)
    }

    async fn connect(&self, address: &str) -> Result<Peripheral, TransportError> {
        let peripheral = self.find_peripheral(address).await?;
        if !peripheral.is_connected().await.map_err(ble_error)? {
            peripheral.connect().await.map_err(ble_error)?;
        }
        peripheral.discover_services().await.map_err(ble_error)?;
        Ok(peripheral)
    }

    async fn discover_writable_characteristic(
        &self,
        session: &Peripheral,
    ) -> Result<CharacteristicId, TransportError> {
        session
            .characteristics()
            .into_iter()
            .find(is_writable)
            .map(|c| c.uuid)
            .ok_or(TransportError::NoWritableCharacteristic)
    }

    async fn write(
        &self,
        session: &Peripheral,
        characteristic: &CharacteristicId,
        bytes: &[u8],
        ack_required: bool,
    ) -> Result<(), TransportError> {
        let target = session
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == *characteristic)
            .ok_or(TransportError::NoWritableCharacteristic)?;
        let write_type = if ack_required {
            WriteType::WithResponse
        } else {
            WriteType::WithoutResponse
        };
        session
            .write(&target, bytes, write_type)
            .await
            .map_err(ble_error)
    }

    async fn disconnect(&self, session: Peripheral) {
        if let Err(e) = session.disconnect().await {
            tracing::warn!(address = %session.address(), error = %e, "BLE disconnect failed");
        }
    }
}

fn is_writable(characteristic: &Characteristic) -> bool {
    characteristic
        .properties
        .intersects(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE)
}

#[allow(clippy::needless_pass_by_value)]
fn ble_error(err: btleplug::Error) -> TransportError {
    TransportError::Ble(err.to_string())
}
