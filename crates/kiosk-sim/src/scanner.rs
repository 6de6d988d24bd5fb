//! Simulated barcode scanner.

use kiosk_core::{Barcode, BarcodeScanner, DeviceFault, ScannedItem};
use tracing::trace;

/// A scanner that always reads the barcode printed on the item.
#[derive(Debug, Clone, Default)]
pub struct SimulatedScanner {
    disabled: bool,
    scans: usize,
    last_barcode: Option<Barcode>,
}

impl SimulatedScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(&mut self) {
        self.disabled = true;
    }

    pub fn enable(&mut self) {
        self.disabled = false;
    }

    /// Number of successful reads.
    pub fn scan_count(&self) -> usize {
        self.scans
    }

    pub fn last_barcode(&self) -> Option<&Barcode> {
        self.last_barcode.as_ref()
    }
}

impl BarcodeScanner for SimulatedScanner {
    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn scan(&mut self, item: &ScannedItem) -> Result<Barcode, DeviceFault> {
        if self.disabled {
            return Err(DeviceFault::Disabled);
        }

        let barcode = item.barcode().clone();
        trace!(%barcode, "Barcode read");
        self.scans += 1;
        self.last_barcode = Some(barcode.clone());
        Ok(barcode)
    }
}
