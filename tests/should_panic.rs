#![no_std]
#![no_main]

use core::panic::PanicInfo;
use dagger_os::vga_buffer::{Buffer, Console, BUFFER_WIDTH, DEFAULT_COLOR};
use dagger_os::{exit_qemu, serial_print, serial_println, QemuExitCode};

/* Coordinates outside the grid are a caller bug and must never be quietly absorbed. */
#[no_mangle]
pub extern "C" fn _start() -> ! {
    write_cell_outside_grid();
    serial_println!("[test did not panic]");
    exit_qemu(QemuExitCode::Failed);
    loop {}
}

fn write_cell_outside_grid() {
    serial_print!("should_panic::write_cell_outside_grid...\t");
    let mut buffer = Buffer::new();
    let mut console = Console::new(&mut buffer);
    console.write_cell(b'x', DEFAULT_COLOR, BUFFER_WIDTH, 0);
}

#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    serial_println!("[ok]");
    exit_qemu(QemuExitCode::Success);
    loop {}
}
