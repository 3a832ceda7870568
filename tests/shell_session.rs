#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(dagger_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

use core::panic::PanicInfo;
use dagger_os::keyboard::{InputReader, ScriptedController};
use dagger_os::shell::commands::{self, Command};
use dagger_os::shell::{Shell, PROMPT};
use dagger_os::vga_buffer::{Buffer, Console, BUFFER_HEIGHT};

#[no_mangle]
pub extern "C" fn _start() -> ! {
    test_main();

    loop {}
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    dagger_os::test_panic_handler(info)
}

fn row_text<'a>(console: &Console, row: usize, out: &'a mut [u8]) -> &'a [u8] {
    for (x, slot) in out.iter_mut().enumerate() {
        *slot = console.read_cell(x, row).ascii_character;
    }
    out
}

const HELP: [u8; 5] = [0x23, 0x12, 0x26, 0x19, 0x1c];
const CLEAR: [u8; 6] = [0x2e, 0x26, 0x12, 0x1e, 0x13, 0x1c];

#[test_case]
fn test_banner_then_help() {
    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    console.initialize();
    commands::hello_user(&mut console, "root");
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&HELP)));

    assert_eq!(shell.step(&mut console), Command::Help);

    let mut text = [0u8; 19];
    assert_eq!(row_text(&console, 2, &mut text), b"root@DaggerOS> help");
    let mut text = [0u8; 19];
    assert_eq!(row_text(&console, 3, &mut text), b"---- HELP MENU ----");
}

#[test_case]
fn test_sessions_scroll_and_clear() {
    // enough help menus to push the screen past its last row, then a clear
    let mut keys = [0u8; HELP.len() * 6 + CLEAR.len()];
    for chunk in keys[..HELP.len() * 6].chunks_mut(HELP.len()) {
        chunk.copy_from_slice(&HELP);
    }
    keys[HELP.len() * 6..].copy_from_slice(&CLEAR);

    let mut screen = Buffer::new();
    let mut console = Console::new(&mut screen);
    let mut shell = Shell::new(InputReader::new(ScriptedController::new(&keys)));

    for _ in 0..6 {
        assert_eq!(shell.step(&mut console), Command::Help);
        let (row, column) = console.cursor();
        assert!(row < BUFFER_HEIGHT);
        assert_eq!(column, 0);
    }
    // the newest menu ends just above the bottom row
    let mut text = [0u8; 9];
    assert_eq!(row_text(&console, BUFFER_HEIGHT - 7, &mut text), b"Commands:");

    assert_eq!(shell.step(&mut console), Command::Clear);
    assert_eq!(console.cursor(), (0, 0));

    shell.prompt(&mut console);
    assert_eq!(console.cursor(), (0, PROMPT.len()));
}
