#![no_main]
use javelin::{Abort, CollectingReporter, Parser, ParserOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let (diet, module_info) = match data.first() {
        Some(byte) => (byte & 1 == 1, byte & 2 == 2),
        None => (false, false),
    };
    let options = ParserOptions::default()
        .with_diet(diet)
        .with_module_info(module_info)
        .with_stack_balance_check(true);
    let Ok(mut parser) = Parser::new(options) else {
        return;
    };

    let mut reporter = CollectingReporter::new();
    match parser.parse_compilation_unit(source, &mut reporter) {
        Ok(mut outcome) => {
            if diet {
                let _ = parser.parse_method_bodies(&mut outcome.unit, source, &mut reporter);
            }
        }
        Err(Abort::Invariant(message)) => panic!("invariant violated: {message}"),
        Err(_) => {}
    }
});
