#![no_main]
use javelin::lexer::TokenSource;
use javelin::{ScanMode, Scanner, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    let mut scanner = Scanner::new(source, ScanMode::Standard);
    let mut end = 0;
    loop {
        let token = scanner.next_token();
        assert!(token.range.start().to_usize() >= end, "tokens out of order");
        assert!(token.range.end().to_usize() <= source.len());
        end = token.range.end().to_usize();
        if token.kind == TokenKind::Eof {
            break;
        }
    }
});
