//! Bulk pipes carrying CCID messages
//!
//! [`BulkPipe`] is the seam between the CCID framing logic and the USB
//! stack. [`UsbBulkPipe`] implements it with libusb through `rusb`.

use std::fmt;
use std::time::Duration;

use rusb::{Context, Device, DeviceHandle, Direction, TransferType, UsbContext};
use tracing::{debug, trace, warn};

use crate::descriptor::find_class_descriptor;
use crate::error::CcidError;

/// Smart card interface class
pub const CCID_CLASS: u8 = 0x0B;
/// CCID interface subclass
pub const CCID_SUBCLASS: u8 = 0x00;
/// CCID bulk-transfer protocol
pub const CCID_PROTOCOL_0: u8 = 0x00;

/// A pair of bulk endpoints talking to one CCID reader
pub trait BulkPipe: Send + fmt::Debug {
    /// Write one complete message to the bulk-out endpoint
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<(), CcidError>;

    /// Read one message from the bulk-in endpoint, returning its length
    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CcidError>;

    /// Reset the USB device
    fn reset(&mut self) -> Result<(), CcidError>;

    /// The 54-byte CCID class descriptor, when the pipe knows it
    fn class_descriptor(&self) -> Option<&[u8]> {
        None
    }
}

/// Bulk pipe over a claimed libusb interface
pub struct UsbBulkPipe {
    /// USB device handle
    handle: DeviceHandle<Context>,
    /// Claimed interface number
    interface_number: u8,
    /// Bulk OUT endpoint address
    endpoint_out: u8,
    /// Bulk IN endpoint address
    endpoint_in: u8,
    /// CCID class descriptor copied from the interface
    class_descriptor: Option<Vec<u8>>,
}

impl fmt::Debug for UsbBulkPipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsbBulkPipe")
            .field("interface_number", &self.interface_number)
            .field("endpoint_out", &format!("{:#04x}", self.endpoint_out))
            .field("endpoint_in", &format!("{:#04x}", self.endpoint_in))
            .field("has_class_descriptor", &self.class_descriptor.is_some())
            .finish()
    }
}

/// Location of a CCID interface on a device
#[derive(Debug, Clone)]
struct CcidInterface {
    number: u8,
    endpoint_in: u8,
    endpoint_out: u8,
    class_descriptor: Option<Vec<u8>>,
}

impl UsbBulkPipe {
    /// Open the first device exposing a CCID interface
    ///
    /// When no device can be opened, the last failure of a CCID device is
    /// returned so that e.g. a permission problem is not reported as a
    /// missing reader.
    pub fn first_available() -> Result<Self, CcidError> {
        let context = Context::new()?;
        let devices = context.devices()?;
        first_opened(devices.iter().map(|device| {
            Self::open(&device).inspect_err(|e| {
                if !matches!(e, CcidError::NotCcidDevice) {
                    debug!(
                        bus = device.bus_number(),
                        address = device.address(),
                        error = %e,
                        "Skipping CCID device"
                    );
                }
            })
        }))
    }

    /// Claim the CCID interface of `device`
    pub fn open(device: &Device<Context>) -> Result<Self, CcidError> {
        let interface = Self::find_interface(device)?;
        debug!(
            bus = device.bus_number(),
            address = device.address(),
            interface = interface.number,
            endpoint_in = format_args!("{:#04x}", interface.endpoint_in),
            endpoint_out = format_args!("{:#04x}", interface.endpoint_out),
            "Found CCID interface"
        );

        let mut handle = device.open()?;

        // Detach kernel driver if necessary (Linux)
        #[cfg(target_os = "linux")]
        {
            if handle.kernel_driver_active(interface.number).unwrap_or(false) {
                handle.detach_kernel_driver(interface.number)?;
            }
        }

        handle.claim_interface(interface.number)?;

        Ok(Self {
            handle,
            interface_number: interface.number,
            endpoint_out: interface.endpoint_out,
            endpoint_in: interface.endpoint_in,
            class_descriptor: interface.class_descriptor,
        })
    }

    fn find_interface(device: &Device<Context>) -> Result<CcidInterface, CcidError> {
        let config = device.active_config_descriptor()?;

        for interface in config.interfaces() {
            for desc in interface.descriptors() {
                if desc.class_code() != CCID_CLASS
                    || desc.sub_class_code() != CCID_SUBCLASS
                    || desc.protocol_code() != CCID_PROTOCOL_0
                {
                    continue;
                }

                let mut endpoint_in = None;
                let mut endpoint_out = None;
                for endpoint in desc.endpoint_descriptors() {
                    if endpoint.transfer_type() != TransferType::Bulk {
                        continue;
                    }
                    match endpoint.direction() {
                        Direction::In => endpoint_in = Some(endpoint.address()),
                        Direction::Out => endpoint_out = Some(endpoint.address()),
                    }
                }

                if let (Some(endpoint_in), Some(endpoint_out)) = (endpoint_in, endpoint_out) {
                    return Ok(CcidInterface {
                        number: desc.interface_number(),
                        endpoint_in,
                        endpoint_out,
                        class_descriptor: find_class_descriptor(desc.extra()).map(<[u8]>::to_vec),
                    });
                }
            }
        }

        Err(CcidError::NotCcidDevice)
    }

    /// Read a string descriptor from the device
    pub fn string_descriptor(&self, index: u8) -> Result<String, CcidError> {
        Ok(self.handle.read_string_descriptor_ascii(index)?)
    }
}

impl BulkPipe for UsbBulkPipe {
    fn write(&mut self, data: &[u8], timeout: Duration) -> Result<(), CcidError> {
        trace!(message = %hex::encode(data), "CCID TX");
        let written = self.handle.write_bulk(self.endpoint_out, data, timeout)?;
        if written != data.len() {
            return Err(CcidError::IncompleteWrite {
                written,
                expected: data.len(),
            });
        }
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize, CcidError> {
        let read = self.handle.read_bulk(self.endpoint_in, buf, timeout)?;
        trace!(message = %hex::encode(&buf[..read]), "CCID RX");
        Ok(read)
    }

    fn reset(&mut self) -> Result<(), CcidError> {
        debug!("Resetting USB device");
        Ok(self.handle.reset()?)
    }

    fn class_descriptor(&self) -> Option<&[u8]> {
        self.class_descriptor.as_deref()
    }
}

impl Drop for UsbBulkPipe {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(self.interface_number) {
            warn!(error = %e, "Failed to release CCID interface");
        }
    }
}

/// First successful attempt, or the last error other than `NotCcidDevice`
fn first_opened<T>(
    attempts: impl IntoIterator<Item = Result<T, CcidError>>,
) -> Result<T, CcidError> {
    let mut last_error = None;
    for attempt in attempts {
        match attempt {
            Ok(opened) => return Ok(opened),
            Err(CcidError::NotCcidDevice) => {}
            Err(e) => last_error = Some(e),
        }
    }
    Err(last_error.unwrap_or(CcidError::NotCcidDevice))
}
