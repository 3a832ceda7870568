#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(dagger_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

use core::panic::PanicInfo;
use dagger_os::println;
use dagger_os::vga_buffer::{CONSOLE, DEFAULT_COLOR};

/* Integration tests are separate kernels, each with its own entry point. This one checks that
the console is usable straight after `init`. */
#[no_mangle]
pub extern "C" fn _start() -> ! {
    dagger_os::init();
    test_main();

    loop {}
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    dagger_os::test_panic_handler(info)
}

#[test_case]
fn test_console_starts_blank() {
    let console = CONSOLE.lock();
    assert_eq!(console.color(), DEFAULT_COLOR);
    assert_eq!(console.read_cell(0, 0).ascii_character, b' ');
}

#[test_case]
fn test_println() {
    println!("test_println output");
}

#[test_case]
fn test_println_lands_on_screen() {
    CONSOLE.lock().clear_screen();
    println!("boot ok");
    let console = CONSOLE.lock();
    assert_eq!(console.read_cell(0, 0).ascii_character, b'b');
    assert_eq!(console.read_cell(5, 0).ascii_character, b'o');
    assert_eq!(console.cursor(), (1, 0));
}
