//! Fuzz target for CTCP envelope decoding
//!
//! Ensures arbitrary PRIVMSG/NOTICE payloads never panic the CTCP codec
//! and that decoded envelopes re-encode cleanly.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::str;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = str::from_utf8(data) {
        if input.len() > 512 {
            return;
        }

        if let Some(query) = slirc_client::ctcp::decode(input) {
            // A decoded envelope must round-trip through encode.
            let encoded = slirc_client::ctcp::encode(query.verb, query.body);
            let again = slirc_client::ctcp::decode(&encoded).unwrap();
            assert_eq!(again.verb, query.verb);
        }
    }
});
