//! Regex patterns shared by the field rules.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Strict ISO calendar date: 4-digit year, 2-digit month and day
    pub static ref ISO_DATE: Regex = Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$"
    ).unwrap();

    // Anything that is not an ASCII digit
    pub static ref NON_DIGIT: Regex = Regex::new(
        r"[^0-9]"
    ).unwrap();
}
