#![no_main]

use libfuzzer_sys::fuzz_target;
use safemig_types::Amount;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing never panics; anything accepted displays canonically and
    // re-parses to the same raw units.
    if let Ok(amount) = text.parse::<Amount>() {
        let shown = amount.to_string();
        let reparsed: Amount = shown.parse().expect("display output must parse");
        assert_eq!(reparsed, amount);
    }
});
