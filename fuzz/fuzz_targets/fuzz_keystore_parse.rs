#![no_main]

use libfuzzer_sys::fuzz_target;
use safemig_wallet_core::Keystore;

fuzz_target!(|data: &[u8]| {
    // Keystore files are operator-supplied; parsing and secret-shape checks
    // must never panic.
    if let Ok(keystore) = serde_json::from_slice::<Keystore>(data) {
        let _ = keystore.pin_key();
        let _ = keystore.spend_private_key();
        let _ = format!("{keystore:?}");
        let _ = safemig_wallet_core::SessionAuth::from_keystore(&keystore);
    }
});
