#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(dagger_os::test_runner)]
#![reexport_test_harness_main = "test_main"]

use core::panic::PanicInfo;

use bootloader::{entry_point, BootInfo};
use dagger_os::keyboard::{InputReader, Ps2Controller};
use dagger_os::shell::{commands, Shell};
use dagger_os::vga_buffer::CONSOLE;
use dagger_os::serial_println;

/* Name greeted by the welcome banner. There is no login, everyone is root. */
const USER: &str = "root";

entry_point!(kernel_main);

fn kernel_main(_boot_info: &'static BootInfo) -> ! {
    dagger_os::init();
    serial_println!("[boot] console ready");

    #[cfg(test)]
    test_main();

    let mut console = CONSOLE.lock();
    commands::hello_user(&mut console, USER);

    let mut shell = Shell::new(InputReader::new(Ps2Controller::new()));
    serial_println!("[boot] shell started");
    shell.run(&mut console)
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    dagger_os::report_panic(info);
    dagger_os::hlt_loop();
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    dagger_os::test_panic_handler(info)
}
