#![no_main]
use libfuzzer_sys::fuzz_target;
use weigh_core::{Command, LineAssembler, LineEvent, Response};

fuzz_target!(|data: (u8, Vec<u8>)| {
    let (max, bytes) = data;
    let max_len = usize::from(max).max(1);
    let mut asm = LineAssembler::new(max_len);
    for b in bytes {
        match asm.feed(b) {
            Some(LineEvent::Line(line)) => {
                assert!(line.chars().count() <= max_len);
                let resp = match Command::parse(&line) {
                    Ok(_) => continue,
                    Err(e) => Response::from(e),
                };
                assert!(resp.to_string().starts_with("ERR:"));
            }
            Some(LineEvent::Overflow) | None => {}
        }
        assert!(asm.pending() <= max_len);
    }
});
