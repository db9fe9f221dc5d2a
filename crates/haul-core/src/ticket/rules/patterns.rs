//! Common regex patterns for disposal ticket extraction.
//!
//! Digit classes are spelled `[0-9]` because `\d` is Unicode-aware in the
//! regex crate and would accept non-ASCII digits.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Ticket number: "Ticket #: 12345", "TICKET#: 00123", "ticket 987"
    pub static ref TICKET_NUMBER: Regex = Regex::new(
        r"(?i)Ticket\s*#?:?\s*([0-9]{3,})"
    ).unwrap();

    // A scan line holding nothing but the ticket number
    pub static ref DIGIT_LINE: Regex = Regex::new(
        r"^[0-9]{3,}$"
    ).unwrap();

    // Weight: "Weight: 12,345.6", "Weight - 5,000"
    pub static ref WEIGHT: Regex = Regex::new(
        r"(?i)Weight\s*[:\-]?\s*([0-9.,]+)"
    ).unwrap();

    // Truck: "Truck No: AB-123", "Truck #: T9", "Truck - 42"
    pub static ref TRUCK_NUMBER: Regex = Regex::new(
        r"(?i)Truck\s*(?:No|#)?\s*[:\-]?\s*([A-Za-z0-9\-]+)"
    ).unwrap();

    // Driver name: "Driver: Jane O'Brien"
    pub static ref DRIVER_NAME: Regex = Regex::new(
        r"(?i)Driver\s*[:\-]?\s*([A-Za-z .'\-]{3,})"
    ).unwrap();

    // Driver badge from the monitor line: "Monitor Name(Id): M4512"
    pub static ref DRIVER_BADGE: Regex = Regex::new(
        r"(?i)Monitor Name\(Id\):\s*([A-Za-z0-9]+)"
    ).unwrap();

    // Debris classification: "Debris Type: Vegetative Debris"
    pub static ref DEBRIS_TYPE: Regex = Regex::new(
        r"(?i)Debris\s*Type\s*[:\-]?\s*([A-Za-z ]+)"
    ).unwrap();
}
