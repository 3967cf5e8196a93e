//! In-memory device store.
//!
//! All access goes through one `RwLock`: listing takes a shared guard and
//! returns a snapshot, mutations take the exclusive guard.

use tokio::sync::RwLock;

use devicemon_core::Device;

#[derive(Debug, Default)]
pub struct DeviceStore {
    devices: RwLock<Vec<Device>>,
}

impl DeviceStore {
    pub fn new(seed: Vec<Device>) -> Self {
        Self {
            devices: RwLock::new(seed),
        }
    }

    /// Snapshot of all devices in insertion order.
    pub async fn list(&self) -> Vec<Device> {
        self.devices.read().await.clone()
    }

    /// Append verbatim (no ID checks). Returns the new length.
    pub async fn append(&self, device: Device) -> usize {
        self.append_with(device, |_| {}).await
    }

    /// Append, then call `on_len` with the new length before the write
    /// guard is released, so publishers see lengths in append order.
    pub async fn append_with(&self, device: Device, on_len: impl FnOnce(usize)) -> usize {
        let mut g = self.devices.write().await;
        g.push(device);
        let n = g.len();
        on_len(n);
        n
    }

    /// Set the firmware of every device with `id`. Returns how many matched;
    /// zero is not an error.
    pub async fn update_firmware(&self, id: i64, firmware: &str) -> usize {
        let mut g = self.devices.write().await;
        let mut touched = 0;
        for d in g.iter_mut().filter(|d| d.id == id) {
            d.firmware_version = firmware.to_string();
            touched += 1;
        }
        touched
    }

    pub async fn len(&self) -> usize {
        self.devices.read().await.len()
    }
}
