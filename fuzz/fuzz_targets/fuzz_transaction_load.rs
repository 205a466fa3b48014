#![no_main]

use libfuzzer_sys::fuzz_target;
use safemig_types::SafeTransaction;

fuzz_target!(|data: &[u8]| {
    // Raw transactions arrive hex-encoded from the ledger.
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = SafeTransaction::load(text);
    }

    // Decoded bytes: anything that loads must dump back to a loadable form
    // with the same hash.
    if let Ok(tx) = bincode::deserialize::<SafeTransaction>(data) {
        if let Ok(raw) = tx.dump() {
            let again = SafeTransaction::load(&raw).expect("dumped transaction must load");
            assert_eq!(
                safemig_crypto::hash_transaction(&again).ok(),
                safemig_crypto::hash_transaction(&tx).ok()
            );
        }
    }
});
