#![no_std]
#![cfg_attr(test, no_main)]
#![feature(custom_test_frameworks)]
#![test_runner(crate::test_runner)]
#![reexport_test_harness_main = "test_main"]
#![feature(abi_x86_interrupt)]

use core::panic::PanicInfo;

use x86_64::instructions::hlt;
use x86_64::instructions::port::Port;

pub mod interrupts;
pub mod keyboard;
pub mod line_editor;
pub mod serial;
pub mod shell;
pub mod vga_buffer;

/* Every test prints its name and "[ok]" over serial, so the host sees progress even though the
kernel's screen is hidden (-display none). */
pub trait Testable {
    fn run(&self) -> ();
}

impl<T> Testable for T
where
    T: Fn(),
{
    fn run(&self) {
        serial_print!("{}...\t", core::any::type_name::<T>());
        self();
        serial_println!("[ok]");
    }
}

pub fn test_runner(tests: &[&dyn Testable]) {
    serial_println!("Running {} tests", tests.len());
    for test in tests {
        test.run();
    }
    exit_qemu(QemuExitCode::Success);
}

pub fn test_panic_handler(info: &PanicInfo) -> ! {
    serial_println!("[failed]\n");
    serial_println!("Error: {}\n", info);
    exit_qemu(QemuExitCode::Failed);
    hlt_loop();
}

#[cfg(test)]
use bootloader::{entry_point, BootInfo};

#[cfg(test)]
entry_point!(test_kernel_main);

/// Entry point for `cargo test`
#[cfg(test)]
fn test_kernel_main(_boot_info: &'static BootInfo) -> ! {
    init();
    test_main();
    hlt_loop();
}

#[cfg(test)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    test_panic_handler(info)
}

/* QEMU's isa-debug-exit device (iobase 0xf4, see Cargo.toml) exits with status (value << 1) | 1.
Both codes stay clear of QEMU's own; bootimage maps 33 back to a passing run. */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum QemuExitCode {
    Success = 0x10,
    Failed = 0x11,
}

pub fn exit_qemu(exit_code: QemuExitCode) {
    unsafe {
        let mut port = Port::new(0xf4);
        port.write(exit_code as u32);
    }
}

/* Writing SLP_EN with sleep type 5 to the PM1a control register powers off the emulated machine.
The port differs between emulators, so try each one. */
const POWER_OFF_PORTS: [u16; 3] = [0x604, 0xB004, 0x4004];
const POWER_OFF_VALUE: u16 = 0x2000;

pub fn power_off() -> ! {
    serial_println!("[power] requesting power off");
    for &port in POWER_OFF_PORTS.iter() {
        unsafe { Port::<u16>::new(port).write(POWER_OFF_VALUE) };
    }
    // still running: not an emulator we know, or real hardware
    serial_println!("[power] no power-off port answered, halting");
    hlt_loop();
}

/// Loads the exception handlers and blanks the screen.
pub fn init() {
    interrupts::init_idt();
    vga_buffer::init();
}

/// Prints a panic to serial and, in red, to the screen.
pub fn report_panic(info: &PanicInfo) {
    use core::fmt::Write;
    use vga_buffer::{Color, CONSOLE};

    serial_println!("KERNEL PANIC: {}", info);
    // The shell holds the console while it waits for keys. Nothing runs after a panic, so take it.
    unsafe { CONSOLE.force_unlock() };
    let mut console = CONSOLE.lock();
    console.set_colors(Color::LightRed, Color::Black);
    let _ = write!(console, "\n!!! KERNEL PANIC !!!\n{}\n", info);
}

pub fn hlt_loop() -> ! {
    loop {
        hlt();
    }
}
