//! Kernel logger: ring retention and serial mirroring

mod common;

use common::{SimDisk, SimulatedAta};
use etyos_core::{logger, Disktool};
use etyos_hwinit::{PortIo, SerialPort};
use log::LevelFilter;
use std::sync::{Arc, Mutex};

/// UART that is always ready and records transmitted bytes.
struct RecordingUart {
    out: Arc<Mutex<Vec<u8>>>,
}

impl PortIo for RecordingUart {
    fn inb(&mut self, port: u16) -> u8 {
        if port == 0x3F8 + 5 {
            0x20
        } else {
            0
        }
    }
    fn outb(&mut self, port: u16, value: u8) {
        if port == 0x3F8 {
            self.out.lock().unwrap().push(value);
        }
    }
    fn inw(&mut self, _port: u16) -> u16 {
        0
    }
    fn outw(&mut self, _port: u16, _value: u16) {}
}

// One logger per process, so everything runs in a single test
#[test]
fn test_session_logs_reach_ring_and_serial() {
    let out = Arc::new(Mutex::new(Vec::new()));
    let serial = SerialPort::com1(RecordingUart { out: out.clone() });
    logger::set_sink(Box::leak(Box::new(serial)));
    logger::init(LevelFilter::Info).expect("logger installed once");

    let sim = SimulatedAta::new().with_disk(0, 0, SimDisk::new("QEMU HARDDISK", 100));
    let mut tool = Disktool::new(sim);
    tool.scan();

    assert!(logger::log_count() >= 2);
    let mut lines = Vec::new();
    logger::recent(|l| lines.push(l.as_str().to_string()));
    assert!(lines.iter().any(|l| l.starts_with("[INFO]") && l.contains("QEMU HARDDISK")));
    assert!(lines.iter().any(|l| l.contains("found 1 disks")));

    let text = String::from_utf8(out.lock().unwrap().clone()).unwrap();
    assert!(text.contains("QEMU HARDDISK"));
    assert!(text.contains("\r\n"));

    // debug lines are filtered at Info
    log::debug!("not retained");
    let mut saw_debug = false;
    logger::recent(|l| saw_debug |= l.as_str().contains("not retained"));
    assert!(!saw_debug);
}
